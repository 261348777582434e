//! Runtime configuration, read from environment variables.
//!
//! Both binaries load a `.env` file first (if present), then read their
//! settings through [`BoardConfig::from_env`] / [`CliConfig::from_env`].
//! Parsing goes through a lookup function so it can be tested without
//! touching the process environment.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use tracing::warn;

use crate::domain::StopId;
use crate::ztm::{DEFAULT_BASE_URL, ZtmConfig};

/// Default seconds between upstream polls.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 60;

/// Default and minimum seconds between terminal client refreshes.
pub const MIN_CLIENT_REFRESH_SECS: u64 = 20;

/// Default address the HTTP server binds to.
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8000";

/// Default directory for static assets.
const DEFAULT_STATIC_DIR: &str = "board-server/static";

/// Default JSON endpoint polled by the terminal client.
const DEFAULT_BOARD_URL: &str = "http://127.0.0.1:8000/departures";

/// Configuration errors. These are the only fatal errors at startup.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A required variable is missing or empty
    #[error("{0} is not set")]
    Missing(&'static str),

    /// A variable is set but unusable
    #[error("invalid {var}: {message}")]
    Invalid { var: &'static str, message: String },
}

/// The two stops shown on the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedStops {
    /// Left-hand side of the board (`STOP_A`).
    pub side_a: StopId,
    /// Right-hand side of the board (`STOP_B`).
    pub side_b: StopId,
}

impl TrackedStops {
    /// Both stops, A first. Duplicates are collapsed so a stop shown on
    /// both sides is fetched once per tick.
    pub fn all(&self) -> Vec<StopId> {
        if self.side_a == self.side_b {
            vec![self.side_a.clone()]
        } else {
            vec![self.side_a.clone(), self.side_b.clone()]
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct BoardConfig {
    /// Upstream client settings (`API_URL`, `FETCH_TIMEOUT`)
    pub ztm: ZtmConfig,
    /// Stops to poll (`STOP_A`, `STOP_B`)
    pub stops: TrackedStops,
    /// Time between poll ticks (`POLL_INTERVAL`, seconds)
    pub poll_interval: Duration,
    /// HTTP listen address (`BIND_ADDR`)
    pub bind_addr: SocketAddr,
    /// Static asset directory (`STATIC_DIR`)
    pub static_dir: PathBuf,
    /// Serve `<stopId>.json` files from here instead of the upstream
    /// (`MOCK_DATA_DIR`)
    pub mock_data_dir: Option<PathBuf>,
}

impl BoardConfig {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the configuration through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let base_url = get("API_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let mut ztm = ZtmConfig::new(base_url);
        if let Some(raw) = get("FETCH_TIMEOUT") {
            ztm = ztm.with_timeout(Duration::from_secs(parse_positive_secs(
                "FETCH_TIMEOUT",
                &raw,
            )?));
        }

        let stops = TrackedStops {
            side_a: parse_stop("STOP_A", get("STOP_A"))?,
            side_b: parse_stop("STOP_B", get("STOP_B"))?,
        };

        let poll_interval = match get("POLL_INTERVAL") {
            Some(raw) => parse_positive_secs("POLL_INTERVAL", &raw)?,
            None => DEFAULT_POLL_INTERVAL_SECS,
        };

        let bind_addr: SocketAddr = get("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .trim()
            .parse()
            .map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
                var: "BIND_ADDR",
                message: e.to_string(),
            })?;

        Ok(Self {
            ztm,
            stops,
            poll_interval: Duration::from_secs(poll_interval),
            bind_addr,
            static_dir: get("STATIC_DIR")
                .unwrap_or_else(|| DEFAULT_STATIC_DIR.to_string())
                .into(),
            mock_data_dir: get("MOCK_DATA_DIR").map(PathBuf::from),
        })
    }
}

/// Terminal client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliConfig {
    /// JSON endpoint of the board server (`BOARD_URL`)
    pub board_url: String,
    /// Time between refreshes (`REFRESH_INTERVAL`, seconds, at least 20)
    pub refresh_interval: Duration,
    /// Per-request timeout
    pub request_timeout: Duration,
}

impl CliConfig {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the configuration through `lookup`.
    ///
    /// A refresh interval below the minimum is raised to it rather than
    /// rejected.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let requested = match get("REFRESH_INTERVAL") {
            Some(raw) => parse_positive_secs("REFRESH_INTERVAL", &raw)?,
            None => MIN_CLIENT_REFRESH_SECS,
        };
        if requested < MIN_CLIENT_REFRESH_SECS {
            warn!(
                requested,
                minimum = MIN_CLIENT_REFRESH_SECS,
                "REFRESH_INTERVAL below minimum; using minimum"
            );
        }

        Ok(Self {
            board_url: get("BOARD_URL").unwrap_or_else(|| DEFAULT_BOARD_URL.to_string()),
            refresh_interval: Duration::from_secs(requested.max(MIN_CLIENT_REFRESH_SECS)),
            request_timeout: crate::ztm::DEFAULT_TIMEOUT,
        })
    }
}

fn parse_stop(var: &'static str, value: Option<String>) -> Result<StopId, ConfigError> {
    let value = value.ok_or(ConfigError::Missing(var))?;
    StopId::parse(&value).map_err(|e| ConfigError::Invalid {
        var,
        message: e.to_string(),
    })
}

fn parse_positive_secs(var: &'static str, raw: &str) -> Result<u64, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(0) => Err(ConfigError::Invalid {
            var,
            message: "must be at least 1 second".to_string(),
        }),
        Ok(secs) => Ok(secs),
        Err(e) => Err(ConfigError::Invalid {
            var,
            message: format!("{raw:?}: {e}"),
        }),
    }
}
