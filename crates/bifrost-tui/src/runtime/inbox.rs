//! Inbox channel: async handlers push `UiEvent`s, the runtime drains them
//! once per frame.

use bifrost_core::identity::{CredentialCallbacks, CredentialResponse};
use tokio::sync::mpsc;

use crate::events::UiEvent;

pub type UiEventSender = mpsc::UnboundedSender<UiEvent>;
pub type UiEventReceiver = mpsc::UnboundedReceiver<UiEvent>;

/// Forwards identity widget callbacks into the inbox.
pub struct InboxCallbacks {
    tx: UiEventSender,
}

impl InboxCallbacks {
    pub fn new(tx: UiEventSender) -> Self {
        Self { tx }
    }

    fn send(&self, event: UiEvent) {
        if self.tx.send(event).is_err() {
            tracing::debug!("inbox closed, dropping widget callback");
        }
    }
}

impl CredentialCallbacks for InboxCallbacks {
    fn on_success(&self, credential: Option<String>) {
        self.send(UiEvent::Credential(CredentialResponse::Credential(
            credential,
        )));
    }

    fn on_error(&self) {
        self.send(UiEvent::Credential(CredentialResponse::Error));
    }

    fn on_prompt(&self, url: &str) {
        self.send(UiEvent::SignInPrompt {
            url: url.to_string(),
        });
    }
}
