//! Configuration management for Bifrost.
//!
//! Loads configuration from ${BIFROST_HOME}/config.toml with sensible defaults.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Environment variable that overrides `backend_url`.
pub const BACKEND_URL_ENV: &str = "BIFROST_BACKEND_URL";

/// Environment variable that overrides `google_client_id`.
pub const GOOGLE_CLIENT_ID_ENV: &str = "BIFROST_GOOGLE_CLIENT_ID";

pub mod paths {
    //! Path resolution for Bifrost configuration and data directories.
    //!
    //! BIFROST_HOME resolution order:
    //! 1. BIFROST_HOME environment variable (if set)
    //! 2. ~/.config/bifrost (default)
    //! 3. ./.bifrost when no home directory can be determined

    use std::path::PathBuf;

    /// Returns the Bifrost home directory.
    pub fn bifrost_home() -> PathBuf {
        if let Ok(home) = std::env::var("BIFROST_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir().map_or_else(
            || PathBuf::from(".bifrost"),
            |h| h.join(".config").join("bifrost"),
        )
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        bifrost_home().join("config.toml")
    }

    /// Returns the directory rolling log files are written to.
    pub fn logs_dir() -> PathBuf {
        bifrost_home().join("logs")
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the backend proxy (session, login and profile endpoints).
    pub backend_url: String,

    /// OAuth client id handed to the Google sign-in widget. Empty when unset.
    pub google_client_id: String,

    /// Loopback port for the sign-in page (0 picks a free port).
    pub callback_port: u16,

    /// Keep the typed username when going back from a resolved profile.
    pub retain_username_on_change: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: Self::DEFAULT_BACKEND_URL.to_string(),
            google_client_id: String::new(),
            callback_port: 0,
            retain_username_on_change: true,
        }
    }
}

impl Config {
    pub const DEFAULT_BACKEND_URL: &str = "http://localhost:3000";

    /// Loads configuration from the default config path and applies
    /// environment overrides.
    ///
    /// # Errors
    /// Returns an error if the config file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&paths::config_path())?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// Applies environment overrides using the given lookup.
    ///
    /// Empty values are ignored so an exported-but-blank variable does not
    /// wipe out the file value.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(BACKEND_URL_ENV).filter(|v| !v.trim().is_empty()) {
            self.backend_url = url;
        }
        if let Some(client_id) = lookup(GOOGLE_CLIENT_ID_ENV).filter(|v| !v.trim().is_empty()) {
            self.google_client_id = client_id;
        }
    }

    /// Creates a new config file with the default template.
    ///
    /// # Errors
    /// Returns an error if the file already exists or cannot be written.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("Config file already exists at {}", path.display());
        }
        Self::write_config(path, default_config_template())
    }

    fn write_config(path: &Path, contents: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory {}", parent.display()))?;
        }
        fs::write(path, contents)
            .with_context(|| format!("Failed to write config to {}", path.display()))
    }
}

/// Returns the commented template written by `bifrost config init`.
pub fn default_config_template() -> &'static str {
    r#"# Bifrost configuration

# Backend proxy serving /api/auth/* and /api/minecraft/profile/*
backend_url = "http://localhost:3000"

# OAuth client id for the Google sign-in button
# google_client_id = "1234567890-abc.apps.googleusercontent.com"

# Loopback port for the sign-in page (0 picks a free port)
callback_port = 0

# Keep the typed username after pressing "change username"
retain_username_on_change = true
"#
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_load_missing_file_returns_defaults() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("nonexistent.toml");

        let config = Config::load_from(&config_path).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.backend_url, "http://localhost:3000");
        assert_eq!(config.google_client_id, "");
    }

    #[test]
    fn test_load_partial_config_merges_defaults() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");

        fs::write(&config_path, "backend_url = \"http://10.0.0.2:4000\"\n").unwrap();

        let config = Config::load_from(&config_path).unwrap();
        assert_eq!(config.backend_url, "http://10.0.0.2:4000");
        assert_eq!(config.callback_port, 0);
        assert!(config.retain_username_on_change);
    }

    #[test]
    fn test_load_invalid_toml_reports_path() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");
        fs::write(&config_path, "backend_url = [").unwrap();

        let err = Config::load_from(&config_path).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to parse config"));
    }

    #[test]
    fn test_init_creates_config_with_defaults() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("subdir").join("config.toml");

        Config::init(&config_path).unwrap();

        assert!(config_path.exists());
        let config = Config::load_from(&config_path).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_init_fails_if_exists() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");
        fs::write(&config_path, "# existing").unwrap();

        let err = Config::init(&config_path).unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }

    #[test]
    fn test_env_overrides_replace_file_values() {
        let env: HashMap<&str, &str> = [
            (BACKEND_URL_ENV, "http://127.0.0.1:9999"),
            (GOOGLE_CLIENT_ID_ENV, "client-123"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_env_overrides(|key| env.get(key).map(|v| (*v).to_string()));

        assert_eq!(config.backend_url, "http://127.0.0.1:9999");
        assert_eq!(config.google_client_id, "client-123");
    }

    #[test]
    fn test_blank_env_override_is_ignored() {
        let mut config = Config::default();
        config.apply_env_overrides(|_| Some("  ".to_string()));
        assert_eq!(config, Config::default());
    }
}
