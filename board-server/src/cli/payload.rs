//! Loose view of the board server's JSON, as read by the terminal client.
//!
//! Every field has a default so an older or newer server still renders.

use serde::Deserialize;

/// Body of `GET /departures`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BoardPayload {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub side_a: Option<SidePayload>,
    #[serde(default)]
    pub side_b: Option<SidePayload>,
}

/// One stop.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SidePayload {
    #[serde(default)]
    pub stop_id: String,
    #[serde(default)]
    pub error: bool,
    #[serde(default)]
    pub last_update: Option<String>,
    #[serde(default)]
    pub data: Vec<RowPayload>,
}

/// One departure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RowPayload {
    #[serde(default)]
    pub line: String,
    #[serde(default)]
    pub direction: String,
    #[serde(default)]
    pub time_warsaw: Option<String>,
    #[serde(default)]
    pub delay_seconds: u32,
}
