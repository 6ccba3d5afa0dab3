//! Optional user settings.
//!
//! # Storage layout
//!
//! ```text
//! ~/.tether/
//!   config.yaml   (optional; every key has a default)
//! ```
//!
//! ```yaml
//! debounce_ms: 1000
//! retry_delay_ms: 1000
//! default_key: /home/me/.ssh/deploy_ed25519
//! include: ["*.cpp", "*.h"]
//! exclude: [".git", "moc_*"]
//! ```
//!
//! Every loader has two forms, as elsewhere in the workspace:
//! - `fn_at(home: &Path)`: explicit home; used in tests with `TempDir`
//! - `fn()`: derives home from `dirs::home_dir()`, delegates to `_at`

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::address::default_key_path;
use crate::error::ConfigError;

pub const DEFAULT_DEBOUNCE_MS: u64 = 1000;
pub const DEFAULT_RETRY_DELAY_MS: u64 = 1000;

/// Values read from `config.yaml`. CLI flags take precedence over these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Idle time after the last change to a file before it is synced.
    pub debounce_ms: u64,
    /// Fixed delay before a failed task is tried again.
    pub retry_delay_ms: u64,
    /// Key used for remote destinations when neither `--password` nor
    /// `--key` is given. Defaults to `~/.ssh/id_rsa`.
    pub default_key: Option<PathBuf>,
    /// Globs always added to `--include`.
    pub include: Vec<String>,
    /// Globs always added to `--exclude`.
    pub exclude: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
            default_key: None,
            include: vec![],
            exclude: vec![],
        }
    }
}

impl Settings {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    /// Configured default key, else `~/.ssh/id_rsa` under `home`.
    pub fn default_key_at(&self, home: &Path) -> PathBuf {
        self.default_key
            .clone()
            .unwrap_or_else(|| default_key_path(home))
    }
}

/// `<home>/.tether/`
pub fn tether_root(home: &Path) -> PathBuf {
    home.join(".tether")
}

/// `<home>/.tether/config.yaml`. Pure, no I/O.
pub fn settings_path_at(home: &Path) -> PathBuf {
    tether_root(home).join("config.yaml")
}

/// Load settings from `<home>/.tether/config.yaml`.
///
/// A missing file yields [`Settings::default`]; malformed YAML yields
/// [`ConfigError::Parse`] with the file path.
pub fn load_at(home: &Path) -> Result<Settings, ConfigError> {
    let path = settings_path_at(home);
    if !path.exists() {
        return Ok(Settings::default());
    }
    let contents = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
        path: path.clone(),
        source,
    })?;
    if contents.trim().is_empty() {
        return Ok(Settings::default());
    }
    serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse { path, source })
}

/// `load_at` convenience wrapper.
pub fn load() -> Result<Settings, ConfigError> {
    load_at(&home()?)
}

fn home() -> Result<PathBuf, ConfigError> {
    dirs::home_dir().ok_or(ConfigError::HomeNotFound)
}
