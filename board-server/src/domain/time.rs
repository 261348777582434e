//! Timestamp handling for upstream departure times.
//!
//! The upstream sends ISO-8601 strings in several flavours: UTC with a
//! trailing `Z`, explicit offsets, and occasionally no offset at all (which
//! is treated as UTC). All departure times are shown in the fixed
//! `Europe/Warsaw` zone.

use std::borrow::Cow;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use chrono_tz::Tz;
use tracing::debug;

use super::error::FieldParseError;

/// The zone every departure time is displayed in.
pub const WARSAW: Tz = chrono_tz::Europe::Warsaw;

/// Formats carrying an explicit UTC offset, tried in order.
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%d %H:%M%:z",
];

/// Formats without an offset; interpreted as UTC.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse an ISO-8601 timestamp into an offset-aware datetime.
///
/// A trailing `Z` is read as `+00:00` and a missing offset as UTC. A bare
/// date is midnight UTC. Besides the extended form, the basic form
/// (`20250813T120000Z`), reduced times (`T12`, `T1200`) and hour-only
/// offsets (`+02`) are accepted; a comma may stand in for the decimal point.
///
/// # Examples
///
/// ```
/// use board_server::domain::parse_iso_timestamp;
///
/// let dt = parse_iso_timestamp("2025-08-13T12:00:00Z").unwrap();
/// assert_eq!(dt.offset().local_minus_utc(), 0);
///
/// assert!(parse_iso_timestamp("invalid").is_err());
/// ```
pub fn parse_iso_timestamp(input: &str) -> Result<DateTime<FixedOffset>, FieldParseError> {
    let invalid = || FieldParseError::Time {
        input: input.to_string(),
    };

    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(invalid());
    }

    let zoned: Cow<'_, str> = match trimmed.strip_suffix('Z') {
        Some(rest) => Cow::Owned(format!("{rest}+00:00")),
        None => Cow::Borrowed(trimmed),
    };
    let normalized = to_extended(&zoned);

    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(&normalized, format) {
            return Ok(dt);
        }
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(&normalized, format) {
            return Ok(naive.and_utc().fixed_offset());
        }
    }

    NaiveDate::parse_from_str(&normalized, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc().fixed_offset())
        .ok_or_else(invalid)
}

/// Rewrite basic and reduced ISO-8601 pieces into the extended form the
/// format lists expect. Anything unrecognized is passed through untouched.
fn to_extended(input: &str) -> String {
    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());

    let (date, rest) = match input.find(['T', ' ']) {
        Some(i) => (&input[..i], Some((&input[i..=i], &input[i + 1..]))),
        None => (input, None),
    };

    let mut out = if date.len() == 8 && all_digits(date) {
        format!("{}-{}-{}", &date[..4], &date[4..6], &date[6..])
    } else {
        date.to_string()
    };

    let Some((separator, rest)) = rest else {
        return out;
    };
    out.push_str(separator);

    let (clock, offset) = match rest.find(['+', '-']) {
        Some(i) => rest.split_at(i),
        None => (rest, ""),
    };
    let (whole, fraction) = match clock.find(['.', ',']) {
        Some(i) => (&clock[..i], Some(&clock[i + 1..])),
        None => (clock, None),
    };

    if all_digits(whole) && matches!(whole.len(), 2 | 4 | 6) {
        let pieces: Vec<&str> = (0..whole.len()).step_by(2).map(|i| &whole[i..i + 2]).collect();
        out.push_str(&pieces.join(":"));
        if pieces.len() == 1 {
            out.push_str(":00");
        }
    } else {
        out.push_str(whole);
    }
    if let Some(fraction) = fraction {
        out.push('.');
        out.push_str(fraction);
    }

    match offset.split_at_checked(1) {
        Some((sign, body)) if all_digits(body) && body.len() == 2 => {
            out.push_str(&format!("{sign}{body}:00"));
        }
        Some((sign, body)) if all_digits(body) && body.len() == 4 => {
            out.push_str(&format!("{sign}{}:{}", &body[..2], &body[2..]));
        }
        _ => out.push_str(offset),
    }

    out
}

/// Parse an optional timestamp and convert it to Warsaw time.
///
/// Returns `None` for absent, empty or unparseable input; never fails.
///
/// # Examples
///
/// ```
/// use board_server::domain::parse_time_to_warsaw;
/// use chrono::Timelike;
///
/// // Summer time: UTC+2
/// let dt = parse_time_to_warsaw(Some("2025-08-13T12:00:00Z")).unwrap();
/// assert_eq!(dt.hour(), 14);
///
/// assert!(parse_time_to_warsaw(None).is_none());
/// assert!(parse_time_to_warsaw(Some("")).is_none());
/// ```
pub fn parse_time_to_warsaw(input: Option<&str>) -> Option<DateTime<Tz>> {
    match parse_iso_timestamp(input?) {
        Ok(dt) => Some(dt.with_timezone(&WARSAW)),
        Err(e) => {
            debug!(error = %e, "dropping departure time");
            None
        }
    }
}
