//! Configuration loading from environment variables.

use crate::constants::{CACHE_FILE_NAME, DEFAULT_REMOTE_URL, DEFAULT_TIMEOUT_SECS, TENANT_ID_FILE};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;

/// Runtime configuration for Packtrack.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Directory holding the tenant id file and the redb cache.
    pub data_dir: String,
    /// Base URL of the hosted record collection.
    pub remote_url: String,
    /// Request timeout for remote calls, in seconds.
    pub timeout_secs: u64,
    /// Start sessions in degraded mode and never issue remote calls.
    pub offline: bool,
}

/// Expand tilde (~) in paths to the user's home directory
fn expand_tilde(path: String) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = resolve_home_dir() {
            return home.join(rest).to_string_lossy().to_string();
        }
    }
    path
}

fn resolve_home_dir() -> Option<PathBuf> {
    // Prefer explicit HOME if set (Unix, some Windows shells)
    if let Ok(home) = env::var("HOME") {
        if !home.trim().is_empty() {
            return Some(PathBuf::from(home));
        }
    }

    // Windows USERPROFILE (standard)
    if let Ok(profile) = env::var("USERPROFILE") {
        if !profile.trim().is_empty() {
            return Some(PathBuf::from(profile));
        }
    }

    // Fallback to current directory if available
    std::env::current_dir().ok()
}

/// Parse a boolean-like environment flag value.
///
/// Truthy: `1`, `true`, `yes`, `on`. Falsy: `0`, `false`, `no`, `off`, empty.
/// Matching is case-insensitive and ignores surrounding whitespace.
///
/// # Returns
/// `Some(bool)` when the value is recognized, otherwise `None`.
pub fn parse_env_flag(value: &str) -> Option<bool> {
    let normalized = value.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "" | "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Read a boolean flag from the environment.
///
/// Missing or unrecognized values are treated as `false`.
pub fn env_flag_enabled(name: &str) -> bool {
    env::var(name)
        .ok()
        .and_then(|value| parse_env_flag(&value))
        .unwrap_or(false)
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Returns
    /// A populated [`Config`] with defaults applied when env vars are missing.
    pub fn from_env() -> Self {
        Self {
            data_dir: env::var("PACKTRACK_DATA_DIR")
                .map(expand_tilde)
                .unwrap_or_else(|_| {
                    let home = resolve_home_dir().unwrap_or_else(|| PathBuf::from("."));
                    home.join(".local")
                        .join("share")
                        .join("packtrack")
                        .to_string_lossy()
                        .to_string()
                }),
            remote_url: env::var("PACKTRACK_REMOTE_URL")
                .ok()
                .filter(|value| !value.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_REMOTE_URL.to_string()),
            timeout_secs: env::var("PACKTRACK_TIMEOUT_SECS")
                .ok()
                .and_then(|value| value.parse().ok())
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
            offline: env_flag_enabled("PACKTRACK_OFFLINE"),
        }
    }

    /// Path of the persisted tenant id file.
    pub fn tenant_id_path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join(TENANT_ID_FILE)
    }

    /// Path of the redb cache file.
    pub fn cache_path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join(CACHE_FILE_NAME)
    }
}
