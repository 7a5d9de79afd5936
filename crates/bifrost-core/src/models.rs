//! Wire and domain types shared by the backend client and the UI.

use serde::{Deserialize, Serialize};

/// The signed-in user, as reported by `/api/auth/me` and `/api/auth/login`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub email: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
}

/// A looked-up Minecraft profile.
///
/// Only these three fields are taken from the response; anything else the
/// backend sends is dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedProfile {
    pub username: String,
    pub uuid: String,
    pub skin_url: String,
}

/// Body of a successful session check or login.
#[derive(Debug, Deserialize)]
pub(crate) struct UserEnvelope {
    pub user: User,
}

/// Body the backend sends alongside non-OK statuses.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

/// Request body for `/api/auth/login`.
#[derive(Debug, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub credential: &'a str,
}
