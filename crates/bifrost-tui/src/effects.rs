//! UI effect types.
//!
//! Effects are commands returned by the reducer for the runtime to execute.
//! They cover I/O and task spawning only; the reducer never performs either.

use tokio_util::sync::CancellationToken;

use crate::common::{TaskId, TaskKind};

#[derive(Debug)]
pub enum UiEffect {
    Quit,

    /// `GET /api/auth/me` once at startup.
    CheckSession { task: TaskId },

    /// Start the identity widget.
    StartSignIn { task: TaskId },

    /// Exchange a widget credential for a session.
    ExchangeCredential { task: TaskId, credential: String },

    /// Resolve a Minecraft username.
    LookupProfile { task: TaskId, username: String },

    /// Cancel an in-flight task. The token was taken from `TaskState`.
    CancelTask {
        kind: TaskKind,
        token: Option<CancellationToken>,
    },

    OpenBrowser { url: String },
}
