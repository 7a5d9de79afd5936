//! Core library for Bifrost.
//!
//! Holds the data model, the backend HTTP client, the login/session/profile
//! flows, and the identity widget capability. Nothing here touches the
//! terminal; the TUI crate drives these flows from its reducer.

pub mod backend;
pub mod config;
pub mod identity;
pub mod logging;
pub mod login;
pub mod models;
pub mod profile;
pub mod session;

pub use backend::{BackendClient, Reply};
pub use models::{ResolvedProfile, User};
