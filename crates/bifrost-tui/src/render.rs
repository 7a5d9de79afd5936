//! Drawing.
//!
//! Reads `AppState` through `view::screen` and draws one centered card.
//! Never mutates state.

use ratatui::Frame;
use ratatui::layout::{Alignment, Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::common::{truncate_with_ellipsis, width_of_prefix};
use crate::state::AppState;
use crate::view::{LoginView, LookupView, ProfileView, Screen, SignInControl, screen};

const CARD_WIDTH: u16 = 64;
const CARD_HEIGHT: u16 = 14;
const ACCENT: Color = Color::Cyan;
const INPUT_PROMPT: &str = "> ";

struct Hint {
    key: &'static str,
    action: &'static str,
}

const fn hint(key: &'static str, action: &'static str) -> Hint {
    Hint { key, action }
}

pub fn render(app: &AppState, frame: &mut Frame) {
    let card = card_area(frame.area());
    frame.render_widget(Clear, card);
    frame.render_widget(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(ACCENT))
            .title(" Bifrost ")
            .title_style(Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)),
        card,
    );

    let inner = Rect::new(
        card.x + 2,
        card.y + 1,
        card.width.saturating_sub(4),
        card.height.saturating_sub(2),
    );
    let body = Rect::new(inner.x, inner.y, inner.width, inner.height.saturating_sub(1));
    let footer = Rect::new(
        inner.x,
        inner.y + inner.height.saturating_sub(1),
        inner.width,
        1,
    );
    let width = usize::from(body.width);

    match screen(app) {
        Screen::Login(view) => {
            frame.render_widget(Paragraph::new(login_lines(&view, width)), body);
            render_hints(frame, footer, &login_hints(&view));
        }
        Screen::Lookup(view) => {
            let (lines, input_row) = lookup_lines(&view, width);
            frame.render_widget(Paragraph::new(lines), body);
            if !view.loading && input_row < body.height {
                let col = INPUT_PROMPT.len() + width_of_prefix(view.username, view.cursor);
                let x = body.x + (col as u16).min(body.width.saturating_sub(1));
                frame.set_cursor_position(Position::new(x, body.y + input_row));
            }
            render_hints(
                frame,
                footer,
                &[
                    hint("Enter", "look up"),
                    hint("Ctrl+L", "log out"),
                    hint("Ctrl+C", "quit"),
                ],
            );
        }
        Screen::Profile(view) => {
            frame.render_widget(Paragraph::new(profile_lines(&view, width)), body);
            render_hints(
                frame,
                footer,
                &[
                    hint("c", "change username"),
                    hint("o", "open skin"),
                    hint("Ctrl+L", "log out"),
                    hint("q", "quit"),
                ],
            );
        }
    }
}

fn card_area(area: Rect) -> Rect {
    let width = CARD_WIDTH.min(area.width);
    let height = CARD_HEIGHT.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

fn login_lines<'a>(view: &LoginView<'a>, width: usize) -> Vec<Line<'a>> {
    let mut lines = vec![
        Line::from(Span::styled(
            "Sign in to Bifrost",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];
    match &view.control {
        SignInControl::Ready if view.checking_session => {
            lines.push(dim("Checking for an existing session..."));
        }
        SignInControl::Ready => {
            lines.push(Line::from(vec![
                Span::styled("[ Sign in with Google ]", Style::default().fg(ACCENT)),
                Span::raw("  press Enter"),
            ]));
        }
        SignInControl::Awaiting { url } => {
            lines.push(Line::from(Span::styled(
                "Finish signing in with Google in your browser.",
                Style::default().fg(Color::Yellow),
            )));
            if let Some(url) = url {
                lines.push(Line::from(""));
                lines.push(dim("If it did not open, visit:"));
                lines.push(Line::from(Span::styled(
                    truncate_with_ellipsis(url, width),
                    Style::default().fg(Color::Blue),
                )));
            }
        }
        SignInControl::Exchanging { spinner } => {
            lines.push(Line::from(Span::styled(
                format!("{spinner} Signing in..."),
                Style::default().fg(Color::Yellow),
            )));
        }
    }
    if let Some(error) = view.error {
        lines.push(Line::from(""));
        lines.push(error_line(error, width));
    }
    lines
}

fn login_hints(view: &LoginView<'_>) -> Vec<Hint> {
    match view.control {
        SignInControl::Awaiting { .. } => vec![hint("Esc", "cancel"), hint("Ctrl+C", "quit")],
        SignInControl::Exchanging { .. } => vec![hint("Ctrl+C", "quit")],
        SignInControl::Ready => vec![hint("Enter", "sign in"), hint("q", "quit")],
    }
}

/// Returns the lines and the body row the input sits on.
fn lookup_lines<'a>(view: &LookupView<'a>, width: usize) -> (Vec<Line<'a>>, u16) {
    let mut lines = welcome_lines(view.user, width);
    lines.push(Line::from(""));
    lines.push(Line::from("Minecraft username"));
    let input_row = lines.len() as u16;
    let text_style = if view.loading {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default().fg(Color::White)
    };
    lines.push(Line::from(vec![
        Span::styled(INPUT_PROMPT, Style::default().fg(ACCENT)),
        Span::styled(
            truncate_with_ellipsis(view.username, width.saturating_sub(INPUT_PROMPT.len())),
            text_style,
        ),
    ]));
    lines.push(Line::from(""));
    let button_style = if view.loading {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default().fg(ACCENT)
    };
    lines.push(Line::from(Span::styled(
        format!("[ {} ]", view.submit_label),
        button_style,
    )));
    if let Some(error) = view.error {
        lines.push(error_line(error, width));
    }
    (lines, input_row)
}

fn profile_lines<'a>(view: &ProfileView<'a>, width: usize) -> Vec<Line<'a>> {
    let profile = view.profile;
    let mut lines = welcome_lines(view.user, width);
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        truncate_with_ellipsis(&profile.username, width),
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
    )));
    lines.push(field("UUID", &profile.uuid, width));
    lines.push(field("Skin", &profile.skin_url, width));
    lines
}

fn welcome_lines<'a>(user: &'a bifrost_core::User, width: usize) -> Vec<Line<'a>> {
    vec![
        Line::from(Span::styled(
            truncate_with_ellipsis(&format!("Welcome, {}", user.name), width),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        dim(&truncate_with_ellipsis(&user.email, width)),
    ]
}

fn field(label: &'static str, value: &str, width: usize) -> Line<'static> {
    let label_width = label.len() + 2;
    Line::from(vec![
        Span::styled(format!("{label}: "), Style::default().fg(Color::DarkGray)),
        Span::raw(truncate_with_ellipsis(
            value,
            width.saturating_sub(label_width),
        )),
    ])
}

fn error_line(message: &str, width: usize) -> Line<'static> {
    Line::from(Span::styled(
        truncate_with_ellipsis(message, width),
        Style::default().fg(Color::Red),
    ))
}

fn dim(text: &str) -> Line<'static> {
    Line::from(Span::styled(
        text.to_string(),
        Style::default().fg(Color::DarkGray),
    ))
}

fn render_hints(frame: &mut Frame, area: Rect, hints: &[Hint]) {
    let mut spans = Vec::new();
    for (i, hint) in hints.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" • ", Style::default().fg(Color::DarkGray)));
        }
        spans.push(Span::styled(hint.key, Style::default().fg(ACCENT)));
        spans.push(Span::styled(
            format!(" {}", hint.action),
            Style::default().fg(Color::DarkGray),
        ));
    }
    frame.render_widget(
        Paragraph::new(Line::from(spans)).alignment(Alignment::Center),
        area,
    );
}
