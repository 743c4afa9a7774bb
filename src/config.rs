use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::sync::DEFAULT_SYNC_TTL;

#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the category API, without a trailing `/categories`.
    pub api_url: String,
    /// Bearer token sent with every API request, if any.
    pub api_token: Option<String>,
    pub request_timeout: Duration,
    /// SQLite file holding the device-local sync state.
    pub state_path: PathBuf,
    /// SQLite file backing the development category server.
    pub server_database_path: PathBuf,
    pub sync_ttl: Duration,
    /// Bind address of the development category server.
    pub host: String,
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: "http://127.0.0.1:7070".into(),
            api_token: None,
            request_timeout: Duration::from_secs(30),
            state_path: PathBuf::from("data/finsight.db"),
            server_database_path: PathBuf::from("data/finsight-server.db"),
            sync_ttl: DEFAULT_SYNC_TTL,
            host: "127.0.0.1".into(),
            port: 7070,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        Self {
            api_url: env::var("FINSIGHT_API_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or(defaults.api_url),
            api_token: env::var("FINSIGHT_API_TOKEN")
                .ok()
                .filter(|t| !t.is_empty()),
            request_timeout: env::var("FINSIGHT_REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
            state_path: env::var("FINSIGHT_STATE_PATH")
                .map(|v| {
                    PathBuf::from(
                        v.strip_prefix("sqlite://")
                            .or_else(|| v.strip_prefix("sqlite:"))
                            .unwrap_or(&v),
                    )
                })
                .unwrap_or(defaults.state_path),
            server_database_path: env::var("FINSIGHT_SERVER_DATABASE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.server_database_path),
            sync_ttl: env::var("FINSIGHT_SYNC_TTL_HOURS")
                .ok()
                .and_then(|s| parse_ttl_hours(&s))
                .unwrap_or(defaults.sync_ttl),
            host: env::var("FINSIGHT_HOST").unwrap_or(defaults.host),
            port: env::var("FINSIGHT_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
        }
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Whole hours to a TTL. Values that do not parse or overflow are rejected.
fn parse_ttl_hours(raw: &str) -> Option<Duration> {
    let hours: u64 = raw.trim().parse().ok()?;
    hours.checked_mul(60 * 60).map(Duration::from_secs)
}
