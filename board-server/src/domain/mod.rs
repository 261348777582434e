//! Domain types for the departure board.
//!
//! These are the normalized, display-ready shapes that the rest of the
//! crate passes around. Everything here is independent of the upstream
//! wire format.

mod departure;
mod error;
mod stop;
mod time;

pub use departure::{DepartureRecord, StopDepartures};
pub use error::FieldParseError;
pub use stop::{InvalidStopId, StopId};
pub use time::{WARSAW, parse_iso_timestamp, parse_time_to_warsaw};
