//! Configuration management for the mdsurface CLI.
//!
//! Parses `mdsurface.toml` with serde, discovered in the current directory
//! and its parents unless an explicit path is given. CLI flags are applied
//! after loading and take precedence; they can only enable options, never
//! switch a file-enabled option back off.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "mdsurface.toml";

/// Upper bound for the fetch timeout.
const MAX_TIMEOUT_SECS: u64 = 300;

/// CLI flags that override configuration file values.
#[derive(Debug, Default)]
pub(crate) struct CliSettings {
    pub(crate) breaks: bool,
    pub(crate) pedantic: bool,
    pub(crate) smartypants: bool,
    pub(crate) sanitize: bool,
    pub(crate) disable_remote_sanitization: bool,
}

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct Config {
    /// Render options applied to the surface.
    pub(crate) render: RenderConfig,
    /// Remote fetch behavior.
    pub(crate) fetch: FetchConfig,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub(crate) config_path: Option<PathBuf>,
}

/// Render options.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RenderConfig {
    pub(crate) breaks: bool,
    pub(crate) pedantic: bool,
    pub(crate) smartypants: bool,
    pub(crate) sanitize: bool,
}

/// Remote fetch behavior.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub(crate) struct FetchConfig {
    /// Per-request timeout in seconds.
    pub(crate) timeout_secs: u64,
    /// Let fetched markdown render unsanitized.
    pub(crate) disable_remote_sanitization: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            disable_remote_sanitization: false,
        }
    }
}

impl FetchConfig {
    /// Timeout as a [`Duration`].
    pub(crate) fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub(crate) enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
}

impl Config {
    /// Load configuration with CLI settings applied.
    ///
    /// If `config_path` is provided, loads from that file. Otherwise
    /// searches for `mdsurface.toml` in the current directory and parents,
    /// falling back to defaults when none exists.
    pub(crate) fn load(
        config_path: Option<&Path>,
        settings: &CliSettings,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default()
        };

        config.apply_cli_settings(settings);
        Ok(config)
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;
        config.config_path = Some(path.to_path_buf());
        config.validate()?;
        Ok(config)
    }

    /// Search for a config file in the current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Apply CLI settings; flags only enable options.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        self.render.breaks |= settings.breaks;
        self.render.pedantic |= settings.pedantic;
        self.render.smartypants |= settings.smartypants;
        self.render.sanitize |= settings.sanitize;
        self.fetch.disable_remote_sanitization |= settings.disable_remote_sanitization;
    }

    /// Validate configuration values.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.fetch.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "fetch.timeout_secs cannot be 0".to_owned(),
            ));
        }
        if self.fetch.timeout_secs > MAX_TIMEOUT_SECS {
            return Err(ConfigError::Validation(format!(
                "fetch.timeout_secs cannot exceed {MAX_TIMEOUT_SECS}"
            )));
        }
        Ok(())
    }
}
