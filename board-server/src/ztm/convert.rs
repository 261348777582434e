//! Conversion from upstream departure items to domain types.
//!
//! Each field is normalized independently: a bad timestamp or delay on one
//! item falls back to its default and never affects the other fields or
//! the other items.

use serde_json::Value;
use tracing::debug;

use crate::domain::{DepartureRecord, FieldParseError, StopDepartures, parse_time_to_warsaw};

use super::types::DeparturesResponse;

/// Keys holding the route short name, most specific first.
const LINE_KEYS: &[&str] = &["routeShortName", "route_short_name", "route"];

/// Keys holding the headsign.
const DIRECTION_KEYS: &[&str] = &["headsign", "destination"];

/// Keys holding the departure time, estimated before theoretical.
const TIME_KEYS: &[&str] = &["estimatedTime", "estimated_time", "theoreticalTime"];

/// Key holding the delay in seconds.
const DELAY_KEY: &str = "delayInSeconds";

/// Convert a whole upstream response into the departures for one stop.
pub fn convert_response(response: &DeparturesResponse) -> StopDepartures {
    StopDepartures {
        departures: response.items().iter().map(normalize_departure).collect(),
        last_update: parse_time_to_warsaw(response.last_update_str()),
    }
}

/// Normalize one raw departure item.
///
/// Missing fields become empty strings, an absent or unparseable time
/// becomes `None` and an unusable delay becomes 0. The original item is
/// kept in `raw`.
pub fn normalize_departure(item: &Value) -> DepartureRecord {
    let time_source = first_non_empty(item, TIME_KEYS);

    let delay_seconds = parse_delay(item.get(DELAY_KEY)).unwrap_or_else(|e| {
        debug!(error = %e, "defaulting delay to 0");
        0
    });

    DepartureRecord {
        line: first_non_empty(item, LINE_KEYS).unwrap_or_default(),
        direction: first_non_empty(item, DIRECTION_KEYS).unwrap_or_default(),
        time_warsaw: parse_time_to_warsaw(time_source.as_deref()),
        delay_seconds,
        raw: item.clone(),
    }
}

/// Parse `delayInSeconds`.
///
/// Accepts JSON integers, floats (truncated toward zero) and numeric
/// strings. Null or missing is 0; negative delays (running early) clamp
/// to 0.
///
/// # Examples
///
/// ```
/// use board_server::ztm::parse_delay;
/// use serde_json::json;
///
/// assert_eq!(parse_delay(Some(&json!("120"))).unwrap(), 120);
/// assert_eq!(parse_delay(Some(&json!(-30))).unwrap(), 0);
/// assert_eq!(parse_delay(None).unwrap(), 0);
/// assert!(parse_delay(Some(&json!("soon"))).is_err());
/// ```
pub fn parse_delay(value: Option<&Value>) -> Result<u32, FieldParseError> {
    let invalid = |v: &Value| FieldParseError::Delay {
        input: v.to_string(),
    };

    let Some(v) = value else {
        return Ok(0);
    };

    let seconds: i64 = match v {
        Value::Null => return Ok(0),
        Value::Number(n) => match n.as_i64() {
            Some(i) => i,
            None => {
                let f = n.as_f64().ok_or_else(|| invalid(v))?;
                if !f.is_finite() || f.abs() >= i64::MAX as f64 {
                    return Err(invalid(v));
                }
                f.trunc() as i64
            }
        },
        Value::String(s) => s.trim().parse::<i64>().map_err(|_| invalid(v))?,
        _ => return Err(invalid(v)),
    };

    if seconds <= 0 {
        return Ok(0);
    }

    u32::try_from(seconds).map_err(|_| FieldParseError::Delay {
        input: seconds.to_string(),
    })
}

/// The first key whose value is a non-empty string or a non-zero number.
fn first_non_empty(item: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match item.get(*key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        _ => None,
    })
}
