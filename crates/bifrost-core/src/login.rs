//! Login flow.
//!
//! ```text
//! Idle ──begin──▶ AwaitingCredential ──credential──▶ Exchanging ──▶ Authenticated
//!   ▲                    │                              │
//!   └──────cancel────────┤                              └──▶ Failed { message }
//!                        └──widget error / no credential──▶ Failed { message }
//! ```
//!
//! `LoginFlow` only tracks the phase. The exchange itself is the async
//! [`exchange`] function; the caller feeds its result back through
//! [`LoginFlow::finish`].

use crate::backend::{BackendClient, Reply};
use crate::models::User;

pub const NO_CREDENTIAL_MESSAGE: &str = "No credential received from Google";
pub const LOGIN_FAILED_MESSAGE: &str = "Login failed";
pub const WIDGET_ERROR_MESSAGE: &str = "Login Failed";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoginPhase {
    #[default]
    Idle,
    AwaitingCredential,
    Exchanging,
    Authenticated,
    Failed {
        message: String,
    },
}

#[derive(Debug, Clone, Default)]
pub struct LoginFlow {
    phase: LoginPhase,
    /// Last failure message. Survives a retry until it succeeds or fails anew.
    last_error: Option<String>,
}

impl LoginFlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> &LoginPhase {
        &self.phase
    }

    /// Error text to render under the sign-in control.
    pub fn error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn is_awaiting(&self) -> bool {
        self.phase == LoginPhase::AwaitingCredential
    }

    pub fn is_exchanging(&self) -> bool {
        self.phase == LoginPhase::Exchanging
    }

    /// Starts waiting for the widget. Returns false if a sign-in is already
    /// under way, in which case nothing changes.
    pub fn begin(&mut self) -> bool {
        if matches!(
            self.phase,
            LoginPhase::AwaitingCredential | LoginPhase::Exchanging
        ) {
            return false;
        }
        self.phase = LoginPhase::AwaitingCredential;
        true
    }

    /// Abandons a pending sign-in and returns to `Idle`.
    pub fn cancel(&mut self) {
        if matches!(
            self.phase,
            LoginPhase::AwaitingCredential | LoginPhase::Exchanging
        ) {
            self.phase = LoginPhase::Idle;
        }
    }

    /// Widget success callback.
    ///
    /// Returns the credential to exchange, or `None` when the flow moved to
    /// `Failed` (no credential) or was not expecting one.
    pub fn on_credential(&mut self, credential: Option<String>) -> Option<String> {
        if !self.accepts_widget_result() {
            tracing::debug!(phase = ?self.phase, "ignoring unexpected credential");
            return None;
        }
        match credential.filter(|c| !c.is_empty()) {
            Some(credential) => {
                self.phase = LoginPhase::Exchanging;
                Some(credential)
            }
            None => {
                self.fail(NO_CREDENTIAL_MESSAGE);
                None
            }
        }
    }

    /// Widget error callback (popup closed, script blocked, timeout).
    pub fn on_widget_error(&mut self) {
        if self.accepts_widget_result() {
            self.fail(WIDGET_ERROR_MESSAGE);
        }
    }

    /// Applies the exchange result. Returns the user to store as the session.
    pub fn finish(&mut self, result: Result<User, String>) -> Option<User> {
        if self.phase != LoginPhase::Exchanging {
            tracing::debug!(phase = ?self.phase, "ignoring stale login result");
            return None;
        }
        match result {
            Ok(user) => {
                self.phase = LoginPhase::Authenticated;
                self.last_error = None;
                Some(user)
            }
            Err(message) => {
                self.fail(&message);
                None
            }
        }
    }

    /// Back to `Idle` (logout).
    pub fn reset(&mut self) {
        self.phase = LoginPhase::Idle;
        self.last_error = None;
    }

    /// Marks the flow authenticated without an exchange (restored session).
    pub fn mark_authenticated(&mut self) {
        self.phase = LoginPhase::Authenticated;
        self.last_error = None;
    }

    fn accepts_widget_result(&self) -> bool {
        self.phase == LoginPhase::AwaitingCredential
    }

    fn fail(&mut self, message: &str) {
        tracing::info!(message, "login failed");
        self.phase = LoginPhase::Failed {
            message: message.to_string(),
        };
        self.last_error = Some(message.to_string());
    }
}

/// Exchanges a credential for a session.
///
/// Errors are already converted to the text shown under the sign-in control.
pub async fn exchange(client: &BackendClient, credential: &str) -> Result<User, String> {
    match client.login(credential).await {
        Ok(Reply::Ok(user)) => {
            tracing::info!("login succeeded");
            Ok(user)
        }
        Ok(Reply::Rejected { status, message }) => {
            tracing::warn!(%status, "login rejected");
            Err(message
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| LOGIN_FAILED_MESSAGE.to_string()))
        }
        Err(err) => {
            tracing::warn!(error = %format!("{err:#}"), "login request failed");
            Err(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn ada() -> User {
        User {
            email: "ada@example.com".to_string(),
            name: "Ada".to_string(),
            picture: None,
        }
    }

    #[test]
    fn missing_credential_fails_with_google_message() {
        let mut flow = LoginFlow::new();
        flow.begin();

        assert_eq!(flow.on_credential(None), None);
        assert_eq!(flow.error(), Some(NO_CREDENTIAL_MESSAGE));
    }

    #[test]
    fn empty_credential_counts_as_missing() {
        let mut flow = LoginFlow::new();
        flow.begin();

        assert_eq!(flow.on_credential(Some(String::new())), None);
        assert_eq!(flow.error(), Some(NO_CREDENTIAL_MESSAGE));
    }

    #[test]
    fn credential_moves_to_exchanging() {
        let mut flow = LoginFlow::new();
        flow.begin();

        let token = flow.on_credential(Some("jwt".to_string()));
        assert_eq!(token.as_deref(), Some("jwt"));
        assert!(flow.is_exchanging());
        assert_eq!(flow.error(), None);
    }

    #[test]
    fn widget_error_fails_with_widget_message() {
        let mut flow = LoginFlow::new();
        flow.begin();
        flow.on_widget_error();
        assert_eq!(flow.error(), Some(WIDGET_ERROR_MESSAGE));
    }

    #[test]
    fn success_clears_previous_error() {
        let mut flow = LoginFlow::new();
        flow.begin();
        flow.on_widget_error();
        assert!(flow.error().is_some());

        flow.begin();
        assert_eq!(flow.error(), Some(WIDGET_ERROR_MESSAGE));
        flow.on_credential(Some("jwt".to_string()));
        let user = flow.finish(Ok(ada()));

        assert_eq!(user, Some(ada()));
        assert_eq!(flow.phase(), &LoginPhase::Authenticated);
        assert_eq!(flow.error(), None);
    }

    #[test]
    fn rejected_exchange_keeps_server_message() {
        let mut flow = LoginFlow::new();
        flow.begin();
        flow.on_credential(Some("jwt".to_string()));

        let user = flow.finish(Err("Invalid token".to_string()));
        assert_eq!(user, None);
        assert_eq!(flow.error(), Some("Invalid token"));
    }

    #[test]
    fn result_without_exchange_is_ignored() {
        let mut flow = LoginFlow::new();
        assert_eq!(flow.finish(Ok(ada())), None);
        assert_eq!(flow.phase(), &LoginPhase::Idle);
    }

    #[test]
    fn begin_is_refused_while_exchanging() {
        let mut flow = LoginFlow::new();
        flow.begin();
        flow.on_credential(Some("jwt".to_string()));
        assert!(!flow.begin());
        assert!(flow.is_exchanging());
    }

    #[test]
    fn credential_after_cancel_is_ignored() {
        let mut flow = LoginFlow::new();
        flow.begin();
        flow.cancel();

        assert_eq!(flow.on_credential(Some("late".to_string())), None);
        flow.on_widget_error();
        assert_eq!(flow.phase(), &LoginPhase::Idle);
    }

    #[test]
    fn cancel_returns_to_idle() {
        let mut flow = LoginFlow::new();
        flow.begin();
        flow.cancel();
        assert_eq!(flow.phase(), &LoginPhase::Idle);
    }

    #[tokio::test]
    async fn exchange_returns_user_verbatim() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "user": {"email": "ada@example.com", "name": "Ada"}
            })))
            .mount(&server)
            .await;

        let client = BackendClient::new(&server.uri()).unwrap();
        assert_eq!(exchange(&client, "jwt").await, Ok(ada()));
    }

    #[tokio::test]
    async fn exchange_uses_server_message_on_rejection() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({"message": "Invalid token"})),
            )
            .mount(&server)
            .await;

        let client = BackendClient::new(&server.uri()).unwrap();
        assert_eq!(
            exchange(&client, "jwt").await,
            Err("Invalid token".to_string())
        );
    }

    #[tokio::test]
    async fn exchange_reports_transport_errors() {
        let client = BackendClient::new("http://127.0.0.1:9").unwrap();
        assert_eq!(
            exchange(&client, "jwt").await,
            Err("Failed to send login request".to_string())
        );
    }

    #[tokio::test]
    async fn exchange_reports_malformed_success_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"unexpected": true})))
            .mount(&server)
            .await;

        let client = BackendClient::new(&server.uri()).unwrap();
        assert_eq!(
            exchange(&client, "jwt").await,
            Err("Failed to parse response body".to_string())
        );
    }

    #[tokio::test]
    async fn exchange_falls_back_to_generic_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({})))
            .mount(&server)
            .await;

        let client = BackendClient::new(&server.uri()).unwrap();
        assert_eq!(
            exchange(&client, "jwt").await,
            Err(LOGIN_FAILED_MESSAGE.to_string())
        );
    }
}
