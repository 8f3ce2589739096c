//! Runtime configuration read from the environment

use crate::feedback::DEFAULT_COMMENT_MAX_CHARS;
use crate::provider::DEFAULT_DISPATCH_TIMEOUT;
use chrono::Duration as RetentionWindow;
use std::time::Duration;
use thiserror::Error;

/// Retention window for ephemeral results, per the product's privacy policy
pub const DEFAULT_RETENTION_HOURS: u32 = 48;

/// Longest retention accepted from the environment (one year)
pub const MAX_RETENTION_HOURS: u32 = 24 * 365;

pub const DEFAULT_PORT: u16 = 8000;

/// How long an idle, unwatched session runtime lingers before it is retired
pub const DEFAULT_SESSION_IDLE: Duration = Duration::from_secs(15 * 60);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be {expected}, got {value:?}")]
    Invalid {
        var: &'static str,
        expected: &'static str,
        value: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssistantConfig {
    pub port: u16,
    pub retention_hours: u32,
    pub dispatch_timeout: Duration,
    pub comment_max_chars: usize,
    pub session_idle_timeout: Duration,
    /// Remote transformation endpoint; canned providers are used when unset
    pub provider_url: Option<String>,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            retention_hours: DEFAULT_RETENTION_HOURS,
            dispatch_timeout: DEFAULT_DISPATCH_TIMEOUT,
            comment_max_chars: DEFAULT_COMMENT_MAX_CHARS,
            session_idle_timeout: DEFAULT_SESSION_IDLE,
            provider_url: None,
        }
    }
}

impl AssistantConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source; unset or blank values fall
    /// back to defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let port = parse_var(get("SMA_PORT"), "SMA_PORT", "a port number")?
            .unwrap_or(defaults.port);
        let retention_hours = parse_var(
            get("SMA_RETENTION_HOURS"),
            "SMA_RETENTION_HOURS",
            "a positive number of hours",
        )?
        .filter(|h| *h > 0)
        .unwrap_or(defaults.retention_hours);
        if retention_hours > MAX_RETENTION_HOURS {
            return Err(ConfigError::Invalid {
                var: "SMA_RETENTION_HOURS",
                expected: "at most 8760 hours",
                value: retention_hours.to_string(),
            });
        }
        let dispatch_timeout = parse_var::<u64>(
            get("SMA_PROVIDER_TIMEOUT_SECS"),
            "SMA_PROVIDER_TIMEOUT_SECS",
            "a number of seconds",
        )?
        .map_or(defaults.dispatch_timeout, Duration::from_secs);
        let comment_max_chars = parse_var(
            get("SMA_COMMENT_MAX_CHARS"),
            "SMA_COMMENT_MAX_CHARS",
            "a character count",
        )?
        .unwrap_or(defaults.comment_max_chars);
        let session_idle_timeout = parse_var::<u64>(
            get("SMA_SESSION_IDLE_SECS"),
            "SMA_SESSION_IDLE_SECS",
            "a number of seconds",
        )?
        .filter(|s| *s > 0)
        .map_or(defaults.session_idle_timeout, Duration::from_secs);

        Ok(Self {
            port,
            retention_hours,
            dispatch_timeout,
            comment_max_chars,
            session_idle_timeout,
            provider_url: get("SMA_PROVIDER_URL"),
        })
    }

    pub fn retention(&self) -> RetentionWindow {
        RetentionWindow::hours(i64::from(self.retention_hours))
    }

    /// The retention window as a timer period
    pub fn retention_period(&self) -> Duration {
        Duration::from_secs(u64::from(self.retention_hours) * 3600)
    }
}

fn parse_var<T: std::str::FromStr>(
    value: Option<String>,
    var: &'static str,
    expected: &'static str,
) -> Result<Option<T>, ConfigError> {
    value
        .map(|v| {
            v.trim().parse::<T>().map_err(|_| ConfigError::Invalid {
                var,
                expected,
                value: v.clone(),
            })
        })
        .transpose()
}
