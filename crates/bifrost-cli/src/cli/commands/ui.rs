//! Interactive UI command.

use anyhow::Result;
use bifrost_core::config::Config;

#[cfg(feature = "tui")]
pub async fn run(config: &Config) -> Result<()> {
    bifrost_tui::run(config).await
}

#[cfg(not(feature = "tui"))]
#[allow(clippy::unused_async)]
pub async fn run(_config: &Config) -> Result<()> {
    anyhow::bail!(
        "This build has no interactive UI.\n\
         Use `bifrost profile <USERNAME>` or rebuild with the `tui` feature."
    )
}
