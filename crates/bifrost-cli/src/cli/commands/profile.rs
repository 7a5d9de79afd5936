//! One-shot profile lookup.

use anyhow::Result;
use bifrost_core::BackendClient;
use bifrost_core::config::Config;
use bifrost_core::profile::{self, ProfileQuery};

/// Runs one lookup through the same form state the UI uses.
pub async fn run(config: &Config, username: &str) -> Result<()> {
    let client = BackendClient::new(&config.backend_url)?;

    let mut query = ProfileQuery::new();
    query.username_input = username.to_string();
    let Some(username) = query.submit() else {
        anyhow::bail!("Username must not be empty");
    };
    query.finish(profile::lookup(&client, &username).await);

    if let Some(error) = query.error() {
        tracing::debug!(error, "profile command failed");
        anyhow::bail!("{error}");
    }
    if let Some(resolved) = query.resolved() {
        println!("Username: {}", resolved.username);
        println!("UUID:     {}", resolved.uuid);
        println!("Skin:     {}", resolved.skin_url);
    }
    Ok(())
}
