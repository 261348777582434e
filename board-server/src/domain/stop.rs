//! Stop identifier type.

use std::fmt;

use serde::Serialize;

/// Error returned when parsing an invalid stop identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid stop id: {reason}")]
pub struct InvalidStopId {
    reason: &'static str,
}

/// An upstream stop identifier, e.g. `"1752"`.
///
/// The upstream uses numeric ids but accepts them as strings in the query,
/// so the id is kept as text. Surrounding whitespace is trimmed; an empty
/// id or one containing whitespace or control characters is rejected.
///
/// # Examples
///
/// ```
/// use board_server::domain::StopId;
///
/// let stop = StopId::parse(" 1752 ").unwrap();
/// assert_eq!(stop.as_str(), "1752");
///
/// assert!(StopId::parse("").is_err());
/// assert!(StopId::parse("17 52").is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct StopId(String);

impl StopId {
    /// Parse a stop id from a string.
    pub fn parse(s: &str) -> Result<Self, InvalidStopId> {
        let trimmed = s.trim();

        if trimmed.is_empty() {
            return Err(InvalidStopId {
                reason: "must not be empty",
            });
        }

        if trimmed
            .chars()
            .any(|c| c.is_whitespace() || c.is_control())
        {
            return Err(InvalidStopId {
                reason: "must not contain whitespace or control characters",
            });
        }

        Ok(StopId(trimmed.to_string()))
    }

    /// Returns the stop id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for StopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StopId({})", self.0)
    }
}

impl fmt::Display for StopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
