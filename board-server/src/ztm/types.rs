//! Upstream response DTOs.
//!
//! Departure items are kept as raw JSON: their field names vary between
//! API versions and the normalizer picks whichever one is present.

use serde::{Deserialize, Serialize};

/// Response body of `GET /departures?stopId=<id>`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeparturesResponse {
    /// Departure items, in upstream order. Missing or null means none.
    #[serde(default)]
    pub departures: Option<Vec<serde_json::Value>>,

    /// When the upstream last refreshed this stop.
    #[serde(default)]
    pub last_update: Option<serde_json::Value>,
}

impl DeparturesResponse {
    /// The departure items, empty if the upstream omitted them.
    pub fn items(&self) -> &[serde_json::Value] {
        self.departures.as_deref().unwrap_or(&[])
    }

    /// `lastUpdate` as text, if it was sent as a string.
    pub fn last_update_str(&self) -> Option<&str> {
        self.last_update.as_ref().and_then(|v| v.as_str())
    }
}
