//! Upstream fetch error types.

use crate::domain::StopId;

/// Errors from fetching a stop's departures.
///
/// Any of these is recorded against the stop and never stops the poller.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Upstream answered with a non-success status
    #[error("upstream returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Response body was not the expected JSON shape
    #[error("JSON parse error: {message}")]
    Decode {
        message: String,
        body: Option<String>,
    },

    /// No data available for this stop (mock sources only)
    #[error("no departures source for stop {0}")]
    NotFound(StopId),

    /// Mock data could not be loaded
    #[error("mock data error: {0}")]
    MockData(String),
}
