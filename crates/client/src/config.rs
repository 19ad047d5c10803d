use std::str::FromStr;
use std::time::Duration;

/// Default base URL of the job service.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Default per-request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// HTTP client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL, e.g. `http://localhost:8000`.
    pub api_url: String,
    /// Timeout applied to every request.
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                          | Default                 |
    /// |----------------------------------|-------------------------|
    /// | `BRIEFCAST_API_URL`              | `http://localhost:8000` |
    /// | `BRIEFCAST_REQUEST_TIMEOUT_SECS` | `30`                    |
    pub fn from_env() -> Self {
        let api_url = std::env::var("BRIEFCAST_API_URL")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let timeout_secs = env_or("BRIEFCAST_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS);

        Self {
            api_url,
            request_timeout: Duration::from_secs(timeout_secs),
        }
    }
}

/// Read and parse an environment variable, falling back to `default`
/// when it is unset. An unparseable value is logged and ignored.
pub fn env_or<T>(name: &str, default: T) -> T
where
    T: FromStr + std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => parse_or(name, &raw, default),
        Err(_) => default,
    }
}

fn parse_or<T>(name: &str, raw: &str, default: T) -> T
where
    T: FromStr + std::fmt::Display,
{
    raw.trim().parse().unwrap_or_else(|_| {
        tracing::warn!(
            variable = name,
            value = raw,
            default = %default,
            "Invalid configuration value, using default",
        );
        default
    })
}
