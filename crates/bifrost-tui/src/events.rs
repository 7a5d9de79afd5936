//! UI event types.
//!
//! Every input the reducer sees is a `UiEvent`: terminal input, ticks, and
//! results that async handlers push into the runtime inbox.
//!
//! Async work follows one lifecycle. The runtime emits `TaskStarted` when it
//! spawns a task and `TaskCompleted` wrapping the result event when the task
//! ends. The reducer unwraps a completion only if the task is still the
//! active one for its kind, so late results from abandoned work are dropped.

use bifrost_core::identity::CredentialResponse;
use bifrost_core::{ResolvedProfile, User};
use crossterm::event::Event as CrosstermEvent;

use crate::common::{TaskCompleted, TaskKind, TaskStarted};

#[derive(Debug)]
pub enum UiEvent {
    Tick,
    Terminal(CrosstermEvent),

    TaskStarted {
        kind: TaskKind,
        started: TaskStarted,
    },
    TaskCompleted {
        kind: TaskKind,
        completed: TaskCompleted<Box<UiEvent>>,
    },

    /// Startup check result. `None` means no usable session.
    SessionChecked(Option<User>),

    /// The identity widget is waiting in the browser at `url`.
    SignInPrompt { url: String },
    /// Widget callback. Arrives outside the task lifecycle, while the
    /// sign-in task is still running.
    Credential(CredentialResponse),
    /// The widget stopped serving.
    SignInClosed,

    LoginFinished(Result<User, String>),
    ProfileFinished(Result<ResolvedProfile, String>),
}
