//! Normalized departure records.

use chrono::{DateTime, SecondsFormat};
use chrono_tz::Tz;
use serde::{Serialize, Serializer};

/// One departure at a stop, normalized for display.
///
/// Produced by the upstream normalizer and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepartureRecord {
    /// Route short name, e.g. "10" or "N1". Empty when unknown.
    pub line: String,

    /// Headsign / destination. Empty when unknown.
    pub direction: String,

    /// Estimated (or theoretical) departure time in Warsaw time.
    #[serde(serialize_with = "serialize_optional_time")]
    pub time_warsaw: Option<DateTime<Tz>>,

    /// Delay in seconds; 0 when on time, early or unknown.
    pub delay_seconds: u32,

    /// The upstream item this record was built from.
    pub raw: serde_json::Value,
}

impl DepartureRecord {
    /// Departure time as "HH:MM", or an empty string if unknown.
    pub fn display_time(&self) -> String {
        self.time_warsaw
            .map(|t| t.format("%H:%M").to_string())
            .unwrap_or_default()
    }

    /// Whether the vehicle is running late.
    pub fn is_delayed(&self) -> bool {
        self.delay_seconds > 0
    }

    /// Delay rounded down to whole minutes.
    pub fn delay_minutes(&self) -> u32 {
        self.delay_seconds / 60
    }
}

/// The normalized result of one successful upstream fetch for a stop.
#[derive(Debug, Clone, PartialEq)]
pub struct StopDepartures {
    /// Departures in upstream order.
    pub departures: Vec<DepartureRecord>,

    /// Upstream's own freshness stamp, when it sent one.
    pub last_update: Option<DateTime<Tz>>,
}

/// Serialize a zoned time as RFC 3339 (e.g. `2025-08-13T14:00:00+02:00`).
pub(crate) fn serialize_optional_time<S>(
    value: &Option<DateTime<Tz>>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(t) => serializer.serialize_str(&t.to_rfc3339_opts(SecondsFormat::AutoSi, false)),
        None => serializer.serialize_none(),
    }
}
