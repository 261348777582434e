//! Mock departures source for running without upstream access.
//!
//! Loads sample payloads from JSON files and serves them as if they were
//! live API responses. Tests can also script payloads and failures per
//! stop.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::domain::{StopDepartures, StopId};

use super::convert::convert_response;
use super::error::FetchError;
use super::source::DepartureSource;
use super::types::DeparturesResponse;

/// What the mock answers for a stop.
#[derive(Debug, Clone)]
enum MockResponse {
    Payload(DeparturesResponse),
    Failure { status: u16, message: String },
}

/// Mock source that serves canned payloads.
#[derive(Clone, Default)]
pub struct MockZtmClient {
    responses: Arc<RwLock<HashMap<StopId, MockResponse>>>,
}

impl MockZtmClient {
    /// Create a mock with no stops configured.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock by loading JSON files from a directory.
    ///
    /// Expects files named `{stopId}.json` (e.g. `1752.json`), each shaped
    /// like an upstream response.
    pub fn from_dir(data_dir: impl AsRef<Path>) -> Result<Self, FetchError> {
        let data_dir = data_dir.as_ref();
        let mut responses = HashMap::new();

        let entries = std::fs::read_dir(data_dir).map_err(|e| {
            FetchError::MockData(format!("failed to read {}: {e}", data_dir.display()))
        })?;

        for entry in entries {
            let entry = entry
                .map_err(|e| FetchError::MockData(format!("failed to read directory entry: {e}")))?;

            let path = entry.path();
            if !path.is_file() || path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }

            let stem = path
                .file_stem()
                .and_then(|s| s.to_str())
                .ok_or_else(|| FetchError::MockData(format!("invalid filename: {}", path.display())))?;

            let stop = StopId::parse(stem)
                .map_err(|e| FetchError::MockData(format!("{}: {e}", path.display())))?;

            let json = std::fs::read_to_string(&path)
                .map_err(|e| FetchError::MockData(format!("failed to read {}: {e}", path.display())))?;

            let payload: DeparturesResponse = serde_json::from_str(&json).map_err(|e| {
                FetchError::MockData(format!("failed to parse {}: {e}", path.display()))
            })?;

            responses.insert(stop, MockResponse::Payload(payload));
        }

        if responses.is_empty() {
            return Err(FetchError::MockData(format!(
                "no mock departure files found in {}",
                data_dir.display()
            )));
        }

        Ok(Self {
            responses: Arc::new(RwLock::new(responses)),
        })
    }

    /// Serve `payload` for `stop` from now on.
    pub async fn set_payload(&self, stop: StopId, payload: DeparturesResponse) {
        let mut responses = self.responses.write().await;
        responses.insert(stop, MockResponse::Payload(payload));
    }

    /// Make every fetch for `stop` fail with an upstream status error.
    pub async fn fail_stop(&self, stop: StopId, status: u16, message: impl Into<String>) {
        let mut responses = self.responses.write().await;
        responses.insert(
            stop,
            MockResponse::Failure {
                status,
                message: message.into(),
            },
        );
    }

    /// List stops that have mock data configured.
    pub async fn available_stops(&self) -> Vec<StopId> {
        let responses = self.responses.read().await;
        let mut stops: Vec<StopId> = responses.keys().cloned().collect();
        stops.sort();
        stops
    }
}

impl DepartureSource for MockZtmClient {
    async fn fetch_departures(&self, stop: &StopId) -> Result<StopDepartures, FetchError> {
        let responses = self.responses.read().await;

        match responses.get(stop) {
            Some(MockResponse::Payload(payload)) => Ok(convert_response(payload)),
            Some(MockResponse::Failure { status, message }) => Err(FetchError::Status {
                status: *status,
                body: message.clone(),
            }),
            None => Err(FetchError::NotFound(stop.clone())),
        }
    }
}
