//! Profile lookup flow.
//!
//! `ProfileQuery` is the form-side state: the typed username, the last
//! resolved profile, the last error, and whether a request is in flight.
//! `resolved` and `error` are never both set.

use crate::backend::{BackendClient, Reply};
use crate::models::ResolvedProfile;

pub const LOOKUP_FAILED_MESSAGE: &str = "Failed to fetch profile";
pub const UNEXPECTED_ERROR_MESSAGE: &str = "Something went wrong";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileQuery {
    pub username_input: String,
    resolved: Option<ResolvedProfile>,
    error: Option<String>,
    loading: bool,
}

impl ProfileQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolved(&self) -> Option<&ResolvedProfile> {
        self.resolved.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Starts a lookup for the current input.
    ///
    /// Returns the username to request, or `None` when the form is not
    /// accepting input: empty field, a request in flight, or a profile on
    /// screen. The raw input is sent untouched, whitespace included.
    pub fn submit(&mut self) -> Option<String> {
        if self.username_input.is_empty() || self.loading || self.resolved.is_some() {
            return None;
        }
        self.loading = true;
        self.error = None;
        Some(self.username_input.clone())
    }

    /// Applies a lookup result. A failure leaves `resolved` untouched, which
    /// is always `None` here since `submit` only runs from the form.
    pub fn finish(&mut self, result: Result<ResolvedProfile, String>) {
        self.loading = false;
        match result {
            Ok(profile) => {
                self.error = None;
                self.resolved = Some(profile);
            }
            Err(message) => {
                self.error = Some(message);
            }
        }
    }

    /// "Change username": back to the form without contacting the backend.
    pub fn change_username(&mut self, retain_input: bool) {
        self.resolved = None;
        if !retain_input {
            self.username_input.clear();
        }
    }

    /// Clears everything (logout).
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Resolves a username through the backend.
///
/// Errors are already converted to the text shown under the form.
pub async fn lookup(client: &BackendClient, username: &str) -> Result<ResolvedProfile, String> {
    match client.profile(username).await {
        Ok(Reply::Ok(profile)) => {
            tracing::info!(username = %profile.username, uuid = %profile.uuid, "profile resolved");
            Ok(profile)
        }
        Ok(Reply::Rejected { status, message }) => {
            tracing::info!(%status, username, "profile lookup rejected");
            Err(message
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| LOOKUP_FAILED_MESSAGE.to_string()))
        }
        Err(err) => {
            tracing::warn!(error = %format!("{err:#}"), username, "profile lookup failed");
            let message = err.to_string();
            Err(if message.is_empty() {
                UNEXPECTED_ERROR_MESSAGE.to_string()
            } else {
                message
            })
        }
    }
}
