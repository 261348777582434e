//! ZTM departures API client.
//!
//! This module fetches live departures for a stop from the public transit
//! open-data API and normalizes them into [`DepartureRecord`]s.
//!
//! Key characteristics of the upstream:
//! - One request per stop: `GET <base>/departures?stopId=<id>`
//! - Field names drift between API versions (`routeShortName` vs
//!   `route_short_name`, `headsign` vs `destination`, ...), so items are
//!   decoded loosely and normalized field by field
//! - Times are ISO-8601, mostly UTC with a trailing `Z`
//!
//! [`DepartureRecord`]: crate::domain::DepartureRecord

mod client;
mod convert;
mod error;
mod mock;
mod source;
mod types;

pub use client::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT, ZtmClient, ZtmConfig};
pub use convert::{convert_response, normalize_departure, parse_delay};
pub use error::FetchError;
pub use mock::MockZtmClient;
pub use source::DepartureSource;
pub use types::DeparturesResponse;
