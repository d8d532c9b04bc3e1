//! Persistent user defaults.
//!
//! Settings live in `settings.json` under the XDG config directory
//! (`~/.config/portsweep` on Linux) or at a path given with `--config`.
//! Every field is optional; CLI flags always win over the file.

use super::scan::{OutputFormat, DEFAULT_CONCURRENCY, DEFAULT_TIMEOUT};
use crate::error::{ScanError, ScanResult};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Application-wide defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Default per-probe timeout in seconds.
    pub default_timeout_secs: f64,
    /// Default concurrency level.
    pub default_concurrency: usize,
    /// Default output format when neither `--format` nor the output
    /// file extension decides it.
    pub default_format: OutputFormat,
    /// List closed ports in text output.
    pub show_closed: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            default_timeout_secs: DEFAULT_TIMEOUT.as_secs_f64(),
            default_concurrency: DEFAULT_CONCURRENCY,
            default_format: OutputFormat::Text,
            show_closed: false,
        }
    }
}

impl AppSettings {
    /// Location of the default settings file, if a home directory exists.
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "portsweep", "portsweep")
            .map(|dirs| dirs.config_dir().join("settings.json"))
    }

    /// Load settings.
    ///
    /// An explicit path must exist and parse. Without one, the default
    /// location is read if present, otherwise built-in defaults are used.
    pub fn load(explicit: Option<&Path>) -> ScanResult<Self> {
        if let Some(path) = explicit {
            return Self::load_from(path);
        }

        match Self::default_path() {
            Some(path) if path.is_file() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load settings from a specific file.
    pub fn load_from(path: &Path) -> ScanResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| ScanError::Settings {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let settings: Self = serde_json::from_str(&content).map_err(|e| ScanError::Settings {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        debug!(path = %path.display(), ?settings, "loaded settings");
        Ok(settings)
    }
}
