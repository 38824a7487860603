//! Configuration management for Switchboard.
//!
//! Loads configuration from ${SWITCHBOARD_HOME}/config.toml with sensible defaults.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

/// Environment variable that overrides `api_base_url`.
pub const API_URL_ENV: &str = "SWITCHBOARD_API_URL";

/// Returns the default config template with comments.
///
/// Embedded from default_config.toml at compile time.
fn default_config_template() -> &'static str {
    include_str!("../default_config.toml")
}

pub mod paths {
    //! Path resolution for Switchboard configuration and data.
    //!
    //! SWITCHBOARD_HOME resolution order:
    //! 1. SWITCHBOARD_HOME environment variable (if set)
    //! 2. ~/.config/switchboard (default)
    //! 3. ./.switchboard when no home directory can be determined

    use std::path::PathBuf;

    /// Returns the Switchboard home directory.
    pub fn home() -> PathBuf {
        if let Ok(home) = std::env::var("SWITCHBOARD_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir().map_or_else(
            || PathBuf::from(".switchboard"),
            |h| h.join(".config").join("switchboard"),
        )
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        home().join("config.toml")
    }

    /// Returns the default path of the session storage file.
    pub fn storage_path() -> PathBuf {
        home().join("storage.json")
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the console backend
    pub api_base_url: String,

    /// Timeout for backend requests in seconds (0 disables)
    pub request_timeout_secs: u32,

    /// Optional override for the session storage file
    pub storage_file: Option<String>,
}

impl Config {
    pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080";
    const DEFAULT_REQUEST_TIMEOUT_SECS: u32 = 0;

    /// Loads configuration from the default config path.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
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

    /// Writes the commented default config to `path`.
    ///
    /// # Errors
    /// Fails if the file already exists or cannot be written.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("Config file already exists at {}", path.display());
        }

        Self::write_config(path, default_config_template())
    }

    /// Resolves the backend base URL with precedence: env > config > default.
    ///
    /// # Errors
    /// Returns an error if the resolved URL is not a valid absolute URL.
    pub fn resolve_api_base_url(&self) -> Result<String> {
        if let Ok(env_url) = std::env::var(API_URL_ENV) {
            let trimmed = env_url.trim();
            if !trimmed.is_empty() {
                validate_url(trimmed)?;
                return Ok(trimmed.trim_end_matches('/').to_string());
            }
        }

        let trimmed = self.api_base_url.trim();
        if trimmed.is_empty() {
            return Ok(Self::DEFAULT_API_BASE_URL.to_string());
        }
        validate_url(trimmed)?;
        Ok(trimmed.trim_end_matches('/').to_string())
    }

    /// Request timeout, or `None` when disabled.
    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0)
            .then(|| Duration::from_secs(u64::from(self.request_timeout_secs)))
    }

    /// Path of the session storage file.
    pub fn storage_path(&self) -> PathBuf {
        self.storage_file
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map_or_else(paths::storage_path, PathBuf::from)
    }

    fn write_config(path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let tmp_path = path.with_extension("toml.tmp");
        fs::write(&tmp_path, content)
            .with_context(|| format!("Failed to write config to {}", tmp_path.display()))?;
        fs::rename(&tmp_path, path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                tmp_path.display(),
                path.display()
            )
        })?;

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: Self::DEFAULT_API_BASE_URL.to_string(),
            request_timeout_secs: Self::DEFAULT_REQUEST_TIMEOUT_SECS,
            storage_file: None,
        }
    }
}

/// Validates that a URL is well-formed.
fn validate_url(url: &str) -> Result<()> {
    let parsed = url::Url::parse(url).with_context(|| format!("Invalid API base URL: {url}"))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => bail!("Invalid API base URL: {url} (unsupported scheme '{other}')"),
    }
}
