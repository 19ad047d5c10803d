use briefcast_client::ClientConfig;
use briefcast_tracker::TrackerConfig;

/// Default log filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "briefcast_cli=info,briefcast_tracker=info,briefcast_client=info";

/// Application configuration loaded from environment variables.
///
/// See the binary's module docs for the full variable table.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub client: ClientConfig,
    pub tracker: TrackerConfig,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            client: ClientConfig::from_env(),
            tracker: TrackerConfig::from_env(),
        }
    }
}
