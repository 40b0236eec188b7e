use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Environment variable that overrides the configured answering service endpoint.
pub const API_URL_ENV: &str = "POCKETALK_API_URL";

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the answering service. The user's input is appended as the
    /// final path segment.
    pub api_url: Option<String>,

    /// Seconds before an outstanding request is treated as failed
    pub request_timeout_secs: u64,

    /// Milliseconds between two typewriter steps of a bot reply
    pub reveal_interval_ms: u64,

    /// Log filter used when `RUST_LOG` is not set
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_url: None,
            request_timeout_secs: 30,
            reveal_interval_ms: 20,
            log_level: "info".to_string(),
        }
    }
}

/// Overrides collected from the command line.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub config_path: Option<PathBuf>,
    pub api_url: Option<String>,
    pub log_level: Option<String>,
}

impl Config {
    /// Directory holding the config file and logs (`~/.pocketalk`)
    pub fn home_dir() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Could not find home directory")?;
        Ok(home.join(".pocketalk"))
    }

    /// Default location of the config file
    pub fn default_path() -> Result<PathBuf> {
        Ok(Self::home_dir()?.join("config.toml"))
    }

    /// Load configuration from file, then apply environment and CLI overrides.
    ///
    /// Precedence is CLI flag > environment > file > default. A missing file
    /// is not an error.
    pub fn load(overrides: &ConfigOverrides) -> Result<Self> {
        let path = match &overrides.config_path {
            Some(path) => path.clone(),
            None => Self::default_path()?,
        };

        let mut config = Self::load_file(&path)?;

        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                config.api_url = Some(url);
            }
        }
        if let Some(url) = &overrides.api_url {
            config.api_url = Some(url.clone());
        }
        if let Some(level) = &overrides.log_level {
            config.log_level = level.clone();
        }

        Ok(config)
    }

    /// Read a config file, falling back to defaults when it does not exist
    pub fn load_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Resolve the answering service endpoint, validating it as an absolute
    /// http(s) URL.
    pub fn endpoint(&self) -> Result<Url> {
        let Some(raw) = self.api_url.as_deref().map(str::trim).filter(|s| !s.is_empty()) else {
            bail!(
                "No answering service configured. Set `api_url` in the config file, \
                 export {API_URL_ENV}, or pass --api-url"
            );
        };

        let url = Url::parse(raw).with_context(|| format!("Invalid api_url `{raw}`"))?;
        if !matches!(url.scheme(), "http" | "https") {
            bail!("api_url must be an http or https URL, got `{raw}`");
        }
        if url.cannot_be_a_base() {
            bail!("api_url `{raw}` cannot be used as a base URL");
        }

        Ok(url)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn reveal_interval(&self) -> Duration {
        Duration::from_millis(self.reveal_interval_ms.max(1))
    }

    /// Render the effective configuration as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }
}
