//! In-memory snapshot store for the latest departures per stop.
//!
//! The poller is the only writer; HTTP handlers read concurrently. Each
//! stop's snapshot is an immutable `Arc<StopSnapshot>` that is swapped
//! whole under the write lock, so a reader holds either the old or the new
//! snapshot and never a mix of the two.
//!
//! A failed fetch keeps the previous departures and only raises the
//! `fetch_error` flag: stale data is more useful on a departure board than
//! an empty one. Before the first successful fetch a stop has no snapshot
//! at all, which callers report as "not loaded yet".

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tokio::sync::RwLock;

use crate::domain::{DepartureRecord, StopDepartures, StopId};
use crate::ztm::FetchError;

/// Outcome of one fetch for one stop, as fed into the store.
pub type FetchResult = Result<StopDepartures, FetchError>;

/// The latest cached view of one stop.
#[derive(Debug, Clone, PartialEq)]
pub struct StopSnapshot {
    /// The stop this snapshot belongs to.
    pub stop_id: StopId,

    /// Whether the most recent fetch for this stop failed.
    pub fetch_error: bool,

    /// Upstream's freshness stamp from the last successful fetch.
    pub last_update: Option<DateTime<Tz>>,

    /// When the last successful fetch completed.
    pub fetched_at: DateTime<Utc>,

    /// Departures from the last successful fetch, in upstream order.
    pub departures: Arc<[DepartureRecord]>,
}

impl StopSnapshot {
    /// Build a healthy snapshot from a successful fetch.
    pub fn fresh(stop_id: StopId, result: StopDepartures, fetched_at: DateTime<Utc>) -> Self {
        Self {
            stop_id,
            fetch_error: false,
            last_update: result.last_update,
            fetched_at,
            departures: result.departures.into(),
        }
    }

    /// A copy of this snapshot flagged as stale. Departures are shared.
    pub fn marked_failed(&self) -> Self {
        Self {
            fetch_error: true,
            ..self.clone()
        }
    }
}

/// What applying a fetch result did to a stop's entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// New departures replaced the entry.
    Refreshed,
    /// Fetch failed; previous departures kept and flagged.
    MarkedStale,
    /// Fetch failed and there was nothing cached yet.
    StillMissing,
}

type SnapshotMap = HashMap<StopId, Arc<StopSnapshot>>;

/// Shared store of the latest snapshot per stop.
///
/// Cloning is cheap and every clone sees the same data, so the poller and
/// the web layer each hold their own handle.
#[derive(Clone, Default)]
pub struct SnapshotStore {
    inner: Arc<RwLock<SnapshotMap>>,
}

impl SnapshotStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one fetch result for one stop under the write lock.
    pub async fn update(&self, stop_id: StopId, result: FetchResult) -> UpdateOutcome {
        let now = Utc::now();
        let mut guard = self.inner.write().await;
        apply(&mut guard, stop_id, result, now)
    }

    /// Apply all results of one poll tick under a single write lock.
    ///
    /// Readers see either none or all of the tick's updates.
    pub async fn apply_tick(
        &self,
        results: impl IntoIterator<Item = (StopId, FetchResult)>,
    ) -> Vec<(StopId, UpdateOutcome)> {
        let now = Utc::now();
        let mut guard = self.inner.write().await;
        results
            .into_iter()
            .map(|(stop_id, result)| {
                let outcome = apply(&mut guard, stop_id.clone(), result, now);
                (stop_id, outcome)
            })
            .collect()
    }

    /// The current snapshot for a stop, or `None` if not loaded yet.
    pub async fn read(&self, stop_id: &StopId) -> Option<Arc<StopSnapshot>> {
        let guard = self.inner.read().await;
        guard.get(stop_id).cloned()
    }

    /// Snapshots for several stops taken under one read lock, in order.
    pub async fn read_many(&self, stop_ids: &[StopId]) -> Vec<Option<Arc<StopSnapshot>>> {
        let guard = self.inner.read().await;
        stop_ids.iter().map(|id| guard.get(id).cloned()).collect()
    }

    /// Number of stops with a snapshot.
    pub async fn len(&self) -> usize {
        let guard = self.inner.read().await;
        guard.len()
    }

    /// Check if no stop has been loaded yet.
    pub async fn is_empty(&self) -> bool {
        let guard = self.inner.read().await;
        guard.is_empty()
    }
}

fn apply(
    map: &mut SnapshotMap,
    stop_id: StopId,
    result: FetchResult,
    now: DateTime<Utc>,
) -> UpdateOutcome {
    match result {
        Ok(departures) => {
            let snapshot = StopSnapshot::fresh(stop_id.clone(), departures, now);
            map.insert(stop_id, Arc::new(snapshot));
            UpdateOutcome::Refreshed
        }
        Err(_) => match map.get_mut(&stop_id) {
            Some(existing) => {
                *existing = Arc::new(existing.marked_failed());
                UpdateOutcome::MarkedStale
            }
            None => UpdateOutcome::StillMissing,
        },
    }
}
