//! Client configuration.
//!
//! Settings are layered file → environment → CLI, last one wins:
//!
//! ```toml
//! # ~/.config/bugtracker/bugtracker.toml
//! [api]
//! url = "http://localhost:8080/api"
//!
//! [session]
//! dir = "/home/me/.local/share/bugtracker"
//!
//! [logging]
//! level = "warn"
//! json = false
//! ```
//!
//! Environment overrides: `BUGTRACKER_API_URL`, `BUGTRACKER_SESSION_DIR`.
//! The config file location itself can be moved with `BUGTRACKER_CONFIG`.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::api::DEFAULT_BASE_URL;

pub const ENV_API_URL: &str = "BUGTRACKER_API_URL";
pub const ENV_SESSION_DIR: &str = "BUGTRACKER_SESSION_DIR";
pub const ENV_CONFIG: &str = "BUGTRACKER_CONFIG";
pub const CONFIG_FILE_NAME: &str = "bugtracker.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiSection {
    /// Backend base URL including the `/api` prefix
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionSection {
    /// Directory holding the persisted token and user profile
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSection {
    /// Default log filter when `BUGTRACKER_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Emit JSON log lines instead of human-readable ones
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

/// On-disk shape of `bugtracker.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub api: ApiSection,
    #[serde(default)]
    pub session: SessionSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

impl ConfigFile {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse bugtracker.toml")
    }

    /// Returns the default configuration if the file doesn't exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize bugtracker.toml")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// `$BUGTRACKER_CONFIG`, else `<config dir>/bugtracker/bugtracker.toml`.
    pub fn default_path() -> Option<PathBuf> {
        std::env::var_os(ENV_CONFIG)
            .map(PathBuf::from)
            .or_else(|| dirs::config_dir().map(|d| d.join("bugtracker").join(CONFIG_FILE_NAME)))
    }
}

/// Values given on the command line; `None` means "not given".
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub api_url: Option<String>,
    pub session_dir: Option<PathBuf>,
}

/// Effective runtime configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub api_url: String,
    pub session_dir: PathBuf,
    pub log_level: String,
    pub log_json: bool,
    /// File the settings were read from, if it existed
    pub config_path: Option<PathBuf>,
}

impl ClientConfig {
    /// Resolve configuration from the default file, the process environment
    /// and `cli`.
    pub fn load(cli: &CliOverrides) -> Result<Self> {
        let path = ConfigFile::default_path();
        let file = match &path {
            Some(p) => ConfigFile::load_or_default(p)?,
            None => ConfigFile::default(),
        };
        let config_path = path.filter(|p| p.exists());
        Self::from_layers(&file, |key| std::env::var(key).ok(), cli, config_path)
    }

    /// Merge the layers. `env` is injected so the precedence rules can be
    /// tested without touching the process environment.
    pub fn from_layers(
        file: &ConfigFile,
        env: impl Fn(&str) -> Option<String>,
        cli: &CliOverrides,
        config_path: Option<PathBuf>,
    ) -> Result<Self> {
        let api_url = cli
            .api_url
            .clone()
            .or_else(|| env(ENV_API_URL).filter(|v| !v.trim().is_empty()))
            .or_else(|| file.api.url.clone())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        validate_api_url(&api_url)?;

        let session_dir = match cli
            .session_dir
            .clone()
            .or_else(|| env(ENV_SESSION_DIR).filter(|v| !v.trim().is_empty()).map(PathBuf::from))
            .or_else(|| file.session.dir.clone())
        {
            Some(dir) => dir,
            None => default_session_dir()?,
        };

        Ok(Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            session_dir,
            log_level: file.logging.level.clone(),
            log_json: file.logging.json,
            config_path,
        })
    }
}

fn validate_api_url(url: &str) -> Result<()> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        anyhow::bail!(
            "Invalid API URL '{}': must start with http:// or https://",
            url
        )
    }
}

fn default_session_dir() -> Result<PathBuf> {
    dirs::data_dir()
        .map(|d| d.join("bugtracker"))
        .with_context(|| {
            format!(
                "Could not determine a data directory; set {} or --session-dir",
                ENV_SESSION_DIR
            )
        })
}
