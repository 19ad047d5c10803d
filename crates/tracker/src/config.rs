//! Tracker timing configuration.

use std::time::Duration;

use briefcast_client::config::env_or;

/// Delay before the first scheduled status check.
pub const DEFAULT_POLL_INITIAL_DELAY_MS: u64 = 2_000;

/// Interval between recurring status checks.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 5_000;

/// Lifetime of an error notice.
pub const DEFAULT_ERROR_NOTICE_SECS: u64 = 5;

/// Lifetime of an info notice (copy confirmation).
pub const DEFAULT_INFO_NOTICE_SECS: u64 = 3;

/// When the scheduler fires.
#[derive(Debug, Clone)]
pub struct PollingConfig {
    /// Delay before the one-shot first check.
    pub initial_delay: Duration,
    /// Period of the recurring checks, measured from session start.
    pub interval: Duration,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(DEFAULT_POLL_INITIAL_DELAY_MS),
            interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        }
    }
}

impl PollingConfig {
    /// | Env Var                           | Default |
    /// |-----------------------------------|---------|
    /// | `BRIEFCAST_POLL_INITIAL_DELAY_MS` | `2000`  |
    /// | `BRIEFCAST_POLL_INTERVAL_MS`      | `5000`  |
    pub fn from_env() -> Self {
        let initial_ms = env_or("BRIEFCAST_POLL_INITIAL_DELAY_MS", DEFAULT_POLL_INITIAL_DELAY_MS);
        let interval_ms = env_or("BRIEFCAST_POLL_INTERVAL_MS", DEFAULT_POLL_INTERVAL_MS);

        Self {
            initial_delay: Duration::from_millis(initial_ms),
            // A zero period would make `tokio::time::interval` panic.
            interval: Duration::from_millis(interval_ms.max(1)),
        }
    }
}

/// How long notices stay visible.
#[derive(Debug, Clone)]
pub struct NoticeConfig {
    pub error_ttl: Duration,
    pub info_ttl: Duration,
}

impl Default for NoticeConfig {
    fn default() -> Self {
        Self {
            error_ttl: Duration::from_secs(DEFAULT_ERROR_NOTICE_SECS),
            info_ttl: Duration::from_secs(DEFAULT_INFO_NOTICE_SECS),
        }
    }
}

impl NoticeConfig {
    /// | Env Var                       | Default |
    /// |-------------------------------|---------|
    /// | `BRIEFCAST_ERROR_NOTICE_SECS` | `5`     |
    /// | `BRIEFCAST_INFO_NOTICE_SECS`  | `3`     |
    pub fn from_env() -> Self {
        Self {
            error_ttl: Duration::from_secs(env_or(
                "BRIEFCAST_ERROR_NOTICE_SECS",
                DEFAULT_ERROR_NOTICE_SECS,
            )),
            info_ttl: Duration::from_secs(env_or(
                "BRIEFCAST_INFO_NOTICE_SECS",
                DEFAULT_INFO_NOTICE_SECS,
            )),
        }
    }
}

/// Everything the tracker needs besides its collaborators.
#[derive(Debug, Clone, Default)]
pub struct TrackerConfig {
    pub polling: PollingConfig,
    pub notices: NoticeConfig,
}

impl TrackerConfig {
    pub fn from_env() -> Self {
        Self {
            polling: PollingConfig::from_env(),
            notices: NoticeConfig::from_env(),
        }
    }
}
