//! Screen selection.
//!
//! Turns `AppState` into what should be on screen, without touching
//! ratatui. `render.rs` draws whatever this returns.

use bifrost_core::{ResolvedProfile, User};

use crate::state::AppState;
use crate::update::SPINNER_FRAMES;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen<'a> {
    Login(LoginView<'a>),
    Lookup(LookupView<'a>),
    Profile(ProfileView<'a>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginView<'a> {
    pub control: SignInControl<'a>,
    pub error: Option<&'a str>,
    pub checking_session: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignInControl<'a> {
    Ready,
    /// Waiting on the browser. `url` is known once the widget is serving.
    Awaiting { url: Option<&'a str> },
    Exchanging { spinner: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupView<'a> {
    pub user: &'a User,
    pub username: &'a str,
    pub cursor: usize,
    pub loading: bool,
    pub submit_label: String,
    pub error: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileView<'a> {
    pub user: &'a User,
    pub profile: &'a ResolvedProfile,
}

pub fn screen(app: &AppState) -> Screen<'_> {
    let Some(user) = app.session.as_ref() else {
        return Screen::Login(login_view(app));
    };
    if let Some(profile) = app.profile.resolved() {
        return Screen::Profile(ProfileView { user, profile });
    }
    let loading = app.profile.is_loading();
    Screen::Lookup(LookupView {
        user,
        username: &app.profile.username_input,
        cursor: app.username_cursor.col(),
        loading,
        submit_label: if loading {
            format!("{} Loading...", spinner(app))
        } else {
            "Look up".to_string()
        },
        error: app.profile.error(),
    })
}

fn login_view(app: &AppState) -> LoginView<'_> {
    let control = if app.login.is_awaiting() {
        SignInControl::Awaiting {
            url: app.sign_in_url.as_deref(),
        }
    } else if app.login.is_exchanging() {
        SignInControl::Exchanging {
            spinner: spinner(app),
        }
    } else {
        SignInControl::Ready
    };
    LoginView {
        control,
        error: app.login.error(),
        checking_session: app.checking_session(),
    }
}

fn spinner(app: &AppState) -> &'static str {
    SPINNER_FRAMES[app.spinner_frame % SPINNER_FRAMES.len()]
}
