//! The fetch capability the poller depends on.

use std::future::Future;

use crate::domain::{StopDepartures, StopId};

use super::error::FetchError;

/// Something that can fetch the current departures for a stop.
///
/// Implemented by the live [`ZtmClient`](super::ZtmClient) and by
/// [`MockZtmClient`](super::MockZtmClient) for offline runs and tests.
/// Implementations report failures as [`FetchError`] and must not panic on
/// bad upstream data.
pub trait DepartureSource: Send + Sync + 'static {
    /// Fetch and normalize the departures for one stop.
    fn fetch_departures(
        &self,
        stop: &StopId,
    ) -> impl Future<Output = Result<StopDepartures, FetchError>> + Send;
}
