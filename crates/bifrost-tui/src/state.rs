//! Application state.
//!
//! Owned by the runtime, mutated only by the reducer in `update.rs`.

use bifrost_core::User;
use bifrost_core::config::Config;
use bifrost_core::login::LoginFlow;
use bifrost_core::profile::ProfileQuery;

use crate::common::{TaskSeq, Tasks};
use crate::input::LineCursor;

#[derive(Debug, Default)]
pub struct AppState {
    pub should_quit: bool,

    /// Signed-in user. `None` shows the login screen.
    pub session: Option<User>,
    pub login: LoginFlow,
    /// Page the identity widget is serving, while awaiting a credential.
    pub sign_in_url: Option<String>,

    pub profile: ProfileQuery,
    pub username_cursor: LineCursor,

    pub task_seq: TaskSeq,
    pub tasks: Tasks,
    pub spinner_frame: usize,

    /// Keep the typed username when leaving the profile card.
    pub retain_username_on_change: bool,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            retain_username_on_change: config.retain_username_on_change,
            ..Self::default()
        }
    }

    /// True until the startup check answers.
    pub fn checking_session(&self) -> bool {
        self.tasks.session_check.is_running()
    }

    /// Drops the session and every piece of per-user state.
    ///
    /// Local only: the backend is not told, and a running lookup or exchange
    /// is forgotten so its result is ignored.
    pub fn logout(&mut self) {
        self.session = None;
        self.login.reset();
        self.sign_in_url = None;
        self.profile.reset();
        self.username_cursor.reset();
        self.tasks.login_exchange.clear();
        self.tasks.profile_lookup.clear();
    }
}
