//! Bridge configuration from the environment.

use std::path::PathBuf;
use std::time::Duration;

use tracing::warn;

use crate::platform;

pub const DATA_DIR_VAR: &str = "SPLIT_TAB_PLUS_DATA_DIR";
pub const SEND_TIMEOUT_VAR: &str = "SPLIT_TAB_PLUS_SEND_TIMEOUT_MS";
pub const HOST_TIMEOUT_VAR: &str = "SPLIT_TAB_PLUS_HOST_TIMEOUT_MS";

const DEFAULT_SEND_TIMEOUT_MS: u64 = 2000;
const DEFAULT_HOST_TIMEOUT_MS: u64 = 5000;

#[derive(Debug, Clone, PartialEq)]
pub struct BridgeConfig {
    /// Directory holding `settings.json`.
    pub data_dir: PathBuf,
    /// Per-message delivery timeout for coordinator → overlay sends.
    pub send_timeout: Duration,
    /// Timeout for a single host call over the bridge.
    pub host_timeout: Duration,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            data_dir: platform::get_config_dir(),
            send_timeout: Duration::from_millis(DEFAULT_SEND_TIMEOUT_MS),
            host_timeout: Duration::from_millis(DEFAULT_HOST_TIMEOUT_MS),
        }
    }
}

impl BridgeConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let data_dir = lookup(DATA_DIR_VAR)
            .filter(|d| !d.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(platform::get_config_dir);
        Self {
            data_dir,
            send_timeout: millis(&lookup, SEND_TIMEOUT_VAR, DEFAULT_SEND_TIMEOUT_MS),
            host_timeout: millis(&lookup, HOST_TIMEOUT_VAR, DEFAULT_HOST_TIMEOUT_MS),
        }
    }

    pub fn settings_path(&self) -> PathBuf {
        self.data_dir.join("settings.json")
    }
}

fn millis(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: u64) -> Duration {
    let ms = match lookup(key) {
        None => default,
        Some(raw) => match raw.trim().parse::<u64>() {
            Ok(ms) if ms > 0 => ms,
            _ => {
                warn!(var = key, value = %raw, default, "Invalid timeout, using default");
                default
            }
        },
    };
    Duration::from_millis(ms)
}
