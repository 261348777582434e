//! Data transfer objects for web responses.

use std::sync::Arc;

use axum::http::StatusCode;
use chrono::SecondsFormat;
use serde::Serialize;

use crate::domain::{DepartureRecord, StopId};
use crate::snapshot::StopSnapshot;

/// One stop as served by the JSON API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StopView {
    /// Upstream stop id
    pub stop_id: StopId,

    /// Whether the latest fetch failed (data below is stale)
    pub error: bool,

    /// Upstream freshness stamp, RFC 3339 in Warsaw time
    pub last_update: Option<String>,

    /// When the server last fetched this stop successfully, RFC 3339 UTC
    pub fetched_at: String,

    /// Departures from the last successful fetch
    pub data: Vec<DepartureRecord>,
}

impl StopView {
    /// Create from a cached snapshot.
    pub fn from_snapshot(snapshot: &StopSnapshot) -> Self {
        Self {
            stop_id: snapshot.stop_id.clone(),
            error: snapshot.fetch_error,
            last_update: snapshot
                .last_update
                .map(|t| t.to_rfc3339_opts(SecondsFormat::AutoSi, false)),
            fetched_at: snapshot
                .fetched_at
                .to_rfc3339_opts(SecondsFormat::Secs, true),
            data: snapshot.departures.to_vec(),
        }
    }
}

/// Response for `GET /departures`.
#[derive(Debug, Serialize)]
pub struct BoardResponse {
    /// Set when at least one side is stale
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Stop A
    pub side_a: StopView,

    /// Stop B
    pub side_b: StopView,
}

/// Plain message body, used for errors and "not loaded yet".
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Health of the board as a whole, derived from the stop snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardStatus {
    /// Some stop has never been fetched successfully.
    NotLoaded,
    /// Every stop is loaded but at least one latest fetch failed.
    Stale,
    /// Every stop is loaded and fresh.
    Healthy,
}

impl BoardStatus {
    /// Classify a set of snapshots.
    pub fn of(snapshots: &[Option<Arc<StopSnapshot>>]) -> Self {
        if snapshots.iter().any(Option::is_none) {
            BoardStatus::NotLoaded
        } else if snapshots.iter().flatten().any(|s| s.fetch_error) {
            BoardStatus::Stale
        } else {
            BoardStatus::Healthy
        }
    }

    /// HTTP status the JSON API answers with.
    pub fn status_code(self) -> StatusCode {
        match self {
            BoardStatus::NotLoaded => StatusCode::SERVICE_UNAVAILABLE,
            BoardStatus::Stale => StatusCode::BAD_GATEWAY,
            BoardStatus::Healthy => StatusCode::OK,
        }
    }
}
