//! Reducer.
//!
//! `update` is the only place `AppState` changes. It never performs I/O; it
//! returns `UiEffect`s for the runtime to execute.
//!
//! Keys by screen:
//! - login: `Enter` sign in, `Esc` cancel a pending sign-in, `q` quit
//! - lookup form: type a username, `Enter` look it up
//! - profile card: `Enter`/`c` change username, `o` open the skin
//! - anywhere signed in: `Ctrl+L` log out
//! - anywhere: `Ctrl+C` quit

use bifrost_core::identity::CredentialResponse;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::common::TaskKind;
use crate::effects::UiEffect;
use crate::events::UiEvent;
use crate::state::AppState;

pub const SPINNER_FRAMES: [&str; 4] = ["⠋", "⠙", "⠹", "⠸"];

/// Effects to run once before the first frame.
pub fn startup(app: &mut AppState) -> Vec<UiEffect> {
    let task = app.task_seq.next_id();
    vec![UiEffect::CheckSession { task }]
}

pub fn update(app: &mut AppState, event: UiEvent) -> Vec<UiEffect> {
    match event {
        UiEvent::Tick => {
            if app.tasks.is_any_running() {
                app.spinner_frame = (app.spinner_frame + 1) % SPINNER_FRAMES.len();
            }
            vec![]
        }
        UiEvent::Terminal(event) => handle_terminal_event(app, event),
        UiEvent::TaskStarted { kind, started } => {
            app.tasks.state_mut(kind).on_started(&started);
            vec![]
        }
        UiEvent::TaskCompleted { kind, completed } => {
            if app.tasks.state_mut(kind).finish_if_active(completed.id) {
                update(app, *completed.result)
            } else {
                tracing::debug!(?kind, id = completed.id.0, "dropping stale task result");
                vec![]
            }
        }
        UiEvent::SessionChecked(user) => {
            // A sign-in that finished first wins.
            if app.session.is_none()
                && let Some(user) = user
            {
                app.login.mark_authenticated();
                app.session = Some(user);
                app.sign_in_url = None;
                app.tasks.login_exchange.clear();
                // A sign-in started before the check answered is no longer needed.
                if let Some(token) = app.tasks.sign_in.take_cancel() {
                    return vec![UiEffect::CancelTask {
                        kind: TaskKind::SignIn,
                        token: Some(token),
                    }];
                }
            }
            vec![]
        }
        UiEvent::SignInPrompt { url } => {
            if app.login.is_awaiting() {
                app.sign_in_url = Some(url.clone());
                vec![UiEffect::OpenBrowser { url }]
            } else {
                vec![]
            }
        }
        UiEvent::Credential(response) => handle_credential(app, response),
        UiEvent::SignInClosed => {
            app.sign_in_url = None;
            vec![]
        }
        UiEvent::LoginFinished(result) => {
            if let Some(user) = app.login.finish(result) {
                app.session = Some(user);
            }
            vec![]
        }
        UiEvent::ProfileFinished(result) => {
            if app.session.is_some() {
                app.profile.finish(result);
            }
            vec![]
        }
    }
}

fn handle_terminal_event(app: &mut AppState, event: Event) -> Vec<UiEffect> {
    match event {
        Event::Key(key) if key.kind != KeyEventKind::Release => handle_key(app, key),
        Event::Paste(text) => {
            if form_accepts_input(app) {
                app.username_cursor
                    .insert_str(&mut app.profile.username_input, &text);
            }
            vec![]
        }
        _ => vec![],
    }
}

fn handle_key(app: &mut AppState, key: KeyEvent) -> Vec<UiEffect> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('c') if ctrl => return quit(app),
        KeyCode::Char('l') if ctrl && app.session.is_some() => {
            tracing::info!("logged out");
            app.logout();
            return vec![];
        }
        _ => {}
    }

    if app.session.is_none() {
        return handle_login_key(app, key);
    }
    if app.profile.resolved().is_some() {
        return handle_profile_key(app, key);
    }
    handle_form_key(app, key)
}

fn handle_login_key(app: &mut AppState, key: KeyEvent) -> Vec<UiEffect> {
    match key.code {
        KeyCode::Enter => start_sign_in(app),
        KeyCode::Esc => cancel_sign_in(app),
        KeyCode::Char('q') => quit(app),
        _ => vec![],
    }
}

fn handle_form_key(app: &mut AppState, key: KeyEvent) -> Vec<UiEffect> {
    if key.code == KeyCode::Enter {
        return submit_lookup(app);
    }
    if form_accepts_input(app) {
        app.username_cursor
            .handle_key(&mut app.profile.username_input, key);
    }
    vec![]
}

fn handle_profile_key(app: &mut AppState, key: KeyEvent) -> Vec<UiEffect> {
    match key.code {
        KeyCode::Enter | KeyCode::Char('c') => {
            app.profile.change_username(app.retain_username_on_change);
            app.username_cursor.move_to_end(&app.profile.username_input);
            vec![]
        }
        KeyCode::Char('o') => app
            .profile
            .resolved()
            .map(|p| {
                vec![UiEffect::OpenBrowser {
                    url: p.skin_url.clone(),
                }]
            })
            .unwrap_or_default(),
        KeyCode::Char('q') => quit(app),
        _ => vec![],
    }
}

fn form_accepts_input(app: &AppState) -> bool {
    app.session.is_some() && app.profile.resolved().is_none() && !app.profile.is_loading()
}

fn start_sign_in(app: &mut AppState) -> Vec<UiEffect> {
    if !app.login.begin() {
        return vec![];
    }
    tracing::info!("starting sign-in");
    let task = app.task_seq.next_id();
    vec![UiEffect::StartSignIn { task }]
}

fn cancel_sign_in(app: &mut AppState) -> Vec<UiEffect> {
    if !app.login.is_awaiting() {
        return vec![];
    }
    tracing::info!("sign-in cancelled");
    app.login.cancel();
    app.sign_in_url = None;
    let token = app.tasks.sign_in.take_cancel();
    vec![UiEffect::CancelTask {
        kind: TaskKind::SignIn,
        token,
    }]
}

fn handle_credential(app: &mut AppState, response: CredentialResponse) -> Vec<UiEffect> {
    let credential = match response {
        CredentialResponse::Credential(credential) => app.login.on_credential(credential),
        CredentialResponse::Error => {
            app.login.on_widget_error();
            None
        }
    };
    if !app.login.is_awaiting() {
        app.sign_in_url = None;
    }
    match credential {
        Some(credential) => {
            let task = app.task_seq.next_id();
            vec![UiEffect::ExchangeCredential { task, credential }]
        }
        None => vec![],
    }
}

fn submit_lookup(app: &mut AppState) -> Vec<UiEffect> {
    match app.profile.submit() {
        Some(username) => {
            let task = app.task_seq.next_id();
            vec![UiEffect::LookupProfile { task, username }]
        }
        None => vec![],
    }
}

fn quit(app: &mut AppState) -> Vec<UiEffect> {
    let mut effects = Vec::new();
    if let Some(token) = app.tasks.sign_in.take_cancel() {
        effects.push(UiEffect::CancelTask {
            kind: TaskKind::SignIn,
            token: Some(token),
        });
    }
    effects.push(UiEffect::Quit);
    effects
}
