//! Configuration file parser for ~/.config/stocknews/config.toml.
//!
//! The config file is optional. A missing or empty file yields
//! `Config::default()`. Unknown keys are accepted by serde but logged, since
//! they are usually typos.
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::extract::ExtractConfig;
use crate::store::DEFAULT_STORE_FILE;

/// Environment variable that overrides the dataset location.
pub const STORE_ENV_VAR: &str = "STOCKNEWS_STORE";

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file too large: {0}")]
    TooLarge(String),

    #[error("Invalid [extract] layout: {0}")]
    InvalidLayout(String),
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Top-level application configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Dataset file. Relative paths resolve against the working directory.
    pub store_path: Option<PathBuf>,

    /// Row/column layout of uploaded workbooks.
    pub extract: ExtractConfig,

    /// Seconds a status message stays on screen.
    pub status_timeout_secs: u64,

    /// Custom keybinding overrides. Keys are action names, values are key strings.
    pub keybindings: HashMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_path: None,
            extract: ExtractConfig::default(),
            status_timeout_secs: 4,
            keybindings: HashMap::new(),
        }
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const KNOWN_KEYS: [&'static str; 4] =
        ["store_path", "extract", "status_timeout_secs", "keybindings"];

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unusable `[extract]` layout → `Err(ConfigError::InvalidLayout)`
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        Self::parse(&content)
    }

    /// Parse configuration from TOML text.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            tracing::debug!("Config file is empty, using defaults");
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !Self::KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(content)?;
        config
            .extract
            .validate()
            .map_err(ConfigError::InvalidLayout)?;

        tracing::info!(
            store_path = ?config.store_path,
            header_rows = config.extract.header_rows,
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Pick the dataset location.
    ///
    /// Precedence: command-line flag, then the `STOCKNEWS_STORE` environment
    /// variable, then `store_path` from the config file, then
    /// `fundamental.csv` in the working directory.
    pub fn resolve_store_path(&self, flag: Option<&Path>, env: Option<&str>) -> PathBuf {
        if let Some(path) = flag {
            return path.to_path_buf();
        }
        if let Some(value) = env.map(str::trim).filter(|v| !v.is_empty()) {
            return PathBuf::from(value);
        }
        self.store_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_FILE))
    }

    pub fn status_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.status_timeout_secs.max(1))
    }
}

// ============================================================================
// Tests
// ============================================================================
