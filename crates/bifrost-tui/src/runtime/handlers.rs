//! Effect handlers.
//!
//! Pure async functions that do the I/O and return the result as a
//! `UiEvent`. The runtime spawns them and routes the event to the inbox.

use std::sync::Arc;

use bifrost_core::BackendClient;
use bifrost_core::identity::IdentityWidget;
use bifrost_core::{login, profile, session};
use tokio_util::sync::CancellationToken;

use super::inbox::{InboxCallbacks, UiEventSender};
use crate::events::UiEvent;

pub async fn check_session(client: BackendClient) -> UiEvent {
    UiEvent::SessionChecked(session::check(&client).await)
}

/// Runs the identity widget until it reports or is cancelled. Its callbacks
/// reach the reducer directly through the inbox.
pub async fn sign_in(
    widget: Arc<dyn IdentityWidget>,
    tx: UiEventSender,
    cancel: Option<CancellationToken>,
) -> UiEvent {
    let cancel = cancel.unwrap_or_default();
    widget
        .sign_in(Arc::new(InboxCallbacks::new(tx)), cancel)
        .await;
    UiEvent::SignInClosed
}

pub async fn exchange_credential(client: BackendClient, credential: String) -> UiEvent {
    UiEvent::LoginFinished(login::exchange(&client, &credential).await)
}

pub async fn lookup_profile(client: BackendClient, username: String) -> UiEvent {
    UiEvent::ProfileFinished(profile::lookup(&client, &username).await)
}

#[cfg(test)]
mod tests {
    use bifrost_core::identity::{CredentialCallbacks, SignInFuture};
    use tokio::sync::mpsc;

    use super::*;

    struct InstantWidget;

    impl IdentityWidget for InstantWidget {
        fn sign_in(
            &self,
            callbacks: Arc<dyn CredentialCallbacks>,
            _cancel: CancellationToken,
        ) -> SignInFuture {
            Box::pin(async move {
                callbacks.on_prompt("http://127.0.0.1:1/");
                callbacks.on_success(Some("jwt".to_string()));
            })
        }
    }

    #[tokio::test]
    async fn sign_in_forwards_callbacks_then_closes() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let done = sign_in(Arc::new(InstantWidget), tx, None).await;

        assert!(matches!(done, UiEvent::SignInClosed));
        assert!(matches!(rx.recv().await, Some(UiEvent::SignInPrompt { .. })));
        assert!(matches!(rx.recv().await, Some(UiEvent::Credential(_))));
    }

    #[tokio::test]
    async fn check_without_backend_reports_no_session() {
        let client = BackendClient::new("http://127.0.0.1:9").unwrap();
        assert!(matches!(
            check_session(client).await,
            UiEvent::SessionChecked(None)
        ));
    }
}
