//! CLI command handlers.

pub mod config;
pub mod profile;
pub mod ui;
