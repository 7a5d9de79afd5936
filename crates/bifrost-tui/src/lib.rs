//! Full-screen terminal UI for Bifrost.
//!
//! Elm-style: `AppState` is changed only by `update::update`, which returns
//! `UiEffect`s; the runtime executes them and feeds results back as
//! `UiEvent`s.

pub mod common;
pub mod effects;
pub mod events;
pub mod input;
pub mod render;
pub mod runtime;
pub mod state;
pub mod terminal;
pub mod update;
pub mod view;

use std::io::{IsTerminal, stdout};

use anyhow::Result;
use bifrost_core::config::Config;
pub use runtime::TuiRuntime;

/// Runs the interactive UI until the user quits.
///
/// # Errors
/// Returns an error if stdout is not a terminal or the runtime fails.
pub async fn run(config: &Config) -> Result<()> {
    if !stdout().is_terminal() {
        anyhow::bail!(
            "The interactive UI requires a terminal.\n\
             Use `bifrost profile <USERNAME>` for non-interactive lookups."
        );
    }

    tracing::info!(backend = %config.backend_url, "starting ui");
    let mut runtime = TuiRuntime::new(config)?;
    // The event loop blocks on terminal input; keep it off the async workers.
    tokio::task::block_in_place(|| runtime.run())
}
