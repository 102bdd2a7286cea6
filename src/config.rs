//! Configuration Module
//!
//! Handles cache store configuration with environment variable support.

use std::env;
use std::path::PathBuf;

use serde::Deserialize;

/// Default file location for persistent stores, relative to the working directory.
pub const DEFAULT_PATH: &str = "cache.sqlite";

/// Cache store configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Whether the backing table is file-backed (true) or transient (false)
    pub persistent: bool,
    /// File location of the backing database, used only when `persistent` is true
    pub path: PathBuf,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_PERSISTENT` - Enable file-backed storage (default: false)
    /// - `CACHE_PATH` - Backing file location (default: "cache.sqlite")
    pub fn from_env() -> Self {
        Self {
            persistent: env::var("CACHE_PERSISTENT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            path: env::var("CACHE_PATH")
                .ok()
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_PATH)),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            persistent: false,
            path: PathBuf::from(DEFAULT_PATH),
        }
    }
}
