//! Application state for the web layer.

use std::sync::Arc;

use crate::config::{MIN_CLIENT_REFRESH_SECS, TrackedStops};
use crate::snapshot::{SnapshotStore, StopSnapshot};

/// Shared application state.
///
/// Handlers only read from the store; the poller is the only writer.
#[derive(Clone)]
pub struct AppState {
    /// Latest snapshot per stop
    pub store: SnapshotStore,

    /// Which stop is shown on which side
    pub stops: Arc<TrackedStops>,

    /// Auto-refresh period of the HTML page, in seconds
    pub page_refresh_secs: u64,
}

impl AppState {
    /// Create a new app state.
    pub fn new(store: SnapshotStore, stops: TrackedStops) -> Self {
        Self {
            store,
            stops: Arc::new(stops),
            page_refresh_secs: MIN_CLIENT_REFRESH_SECS,
        }
    }

    /// Snapshots for side A and side B, read under one lock.
    pub async fn board(&self) -> [Option<Arc<StopSnapshot>>; 2] {
        let ids = [self.stops.side_a.clone(), self.stops.side_b.clone()];
        let mut read = self.store.read_many(&ids).await.into_iter();
        [read.next().flatten(), read.next().flatten()]
    }
}
