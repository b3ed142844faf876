//! Environment-driven configuration with documented defaults.
//!
//! Everything is read once at startup and handed to the core as plain
//! values. The `from_lookup` constructors exist so tests can feed a
//! map instead of mutating the process environment.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub(crate) fn str_var(get: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> String {
    get(key).filter(|v| !v.is_empty()).unwrap_or_else(|| default.to_string())
}

pub(crate) fn parse_var<T: FromStr>(get: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    get(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

pub(crate) fn bool_var(get: &impl Fn(&str) -> Option<String>, key: &str, default: bool) -> bool {
    get(key)
        .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
        .unwrap_or(default)
}

/// Publisher HTTP surface settings.
///
/// `PUBLISHER_HOST` (localhost), `PUBLISHER_PORT` (8002),
/// `DISK_MOUNT_POINT` (/).
#[derive(Debug, Clone)]
pub struct PublisherConfig {
    pub host: String,
    pub port: u16,
    pub disk_mount_point: PathBuf,
}

impl PublisherConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            host: str_var(&get, "PUBLISHER_HOST", "localhost"),
            port: parse_var(&get, "PUBLISHER_PORT", 8002),
            disk_mount_point: PathBuf::from(str_var(&get, "DISK_MOUNT_POINT", "/")),
        }
    }
}

/// Consumer viewer surface settings.
///
/// `WEBSOCKET_HOST` (localhost), `WEBSOCKET_PORT` (8003),
/// `PUSH_INTERVAL_MS` (1000).
#[derive(Debug, Clone)]
pub struct ConsumerConfig {
    pub host: String,
    pub port: u16,
    pub push_interval: Duration,
}

impl ConsumerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            host: str_var(&get, "WEBSOCKET_HOST", "localhost"),
            port: parse_var(&get, "WEBSOCKET_PORT", 8003),
            push_interval: Duration::from_millis(parse_var(&get, "PUSH_INTERVAL_MS", 1_000)),
        }
    }
}
