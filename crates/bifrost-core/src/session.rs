//! Startup session check.
//!
//! Asks the backend whether the cookie jar already holds a valid session.
//! Every failure means "not logged in": nothing is surfaced to the user.

use crate::backend::{BackendClient, Reply};
use crate::models::User;

/// Returns the current user if the backend reports an active session.
pub async fn check(client: &BackendClient) -> Option<User> {
    match client.current_user().await {
        Ok(Reply::Ok(user)) => {
            tracing::info!("restored existing session");
            Some(user)
        }
        Ok(Reply::Rejected { status, .. }) => {
            tracing::debug!(%status, "no active session");
            None
        }
        Err(err) => {
            tracing::debug!(error = %format!("{err:#}"), "no active session");
            None
        }
    }
}
