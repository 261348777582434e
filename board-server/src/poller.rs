//! Background poller that keeps the snapshot store fresh.
//!
//! One long-lived task fetches every tracked stop concurrently, applies the
//! results to the [`SnapshotStore`] in one write, then sleeps for a fixed
//! interval. Fetch failures and panics inside a tick are logged and the
//! loop carries on with the next tick.
//!
//! The task is owned through a [`PollerHandle`]: `cancel` signals it,
//! `join` waits for it, and `shutdown` does both. A tick that is in flight
//! when cancellation arrives is dropped at its next await point.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use futures::future::join_all;
use tokio::sync::watch;
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, error, info, warn};

use crate::domain::StopId;
use crate::snapshot::{SnapshotStore, UpdateOutcome};
use crate::ztm::DepartureSource;

/// Where the poll loop currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollerState {
    /// Sleeping between ticks.
    Idle,
    /// Waiting for the upstream fetches of a tick.
    Fetching,
    /// Writing a tick's results into the store.
    Updating,
    /// Cancelled; terminal.
    Stopped,
}

/// Per-tick counts, for logging and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickSummary {
    /// Stops whose fetch succeeded.
    pub succeeded: usize,
    /// Stops whose fetch failed.
    pub failed: usize,
}

/// Periodically fetches departures for a fixed set of stops.
pub struct Poller<S> {
    source: Arc<S>,
    store: SnapshotStore,
    stops: Arc<[StopId]>,
    interval: Duration,
}

impl<S: DepartureSource> Poller<S> {
    /// Create a poller writing into `store`.
    pub fn new(source: S, store: SnapshotStore, stops: Vec<StopId>, interval: Duration) -> Self {
        Self {
            source: Arc::new(source),
            store,
            stops: stops.into(),
            interval,
        }
    }

    /// The stops this poller tracks.
    pub fn stops(&self) -> &[StopId] {
        &self.stops
    }

    /// Run a single tick now, outside the background loop.
    pub async fn tick_once(&self) -> TickSummary {
        let (state, _) = watch::channel(PollerState::Idle);
        self.tick(&state).await
    }

    /// Start the background loop. The first tick runs immediately.
    ///
    /// The loop also stops if the returned handle is dropped.
    pub fn spawn(self) -> PollerHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (state_tx, state_rx) = watch::channel(PollerState::Idle);

        let task = tokio::spawn(self.run(shutdown_rx, state_tx));

        PollerHandle {
            shutdown: shutdown_tx,
            state: state_rx,
            task,
        }
    }

    async fn run(self, mut shutdown: watch::Receiver<bool>, state: watch::Sender<PollerState>) {
        info!(
            stops = self.stops.len(),
            interval_secs = self.interval.as_secs(),
            "poller started"
        );

        loop {
            let cancelled = *shutdown.borrow();
            if cancelled {
                break;
            }

            let tick = AssertUnwindSafe(self.tick(&state)).catch_unwind();

            tokio::select! {
                outcome = tick => match outcome {
                    Ok(summary) => debug!(
                        succeeded = summary.succeeded,
                        failed = summary.failed,
                        "poll tick finished"
                    ),
                    Err(panic) => error!(
                        reason = %panic_message(panic.as_ref()),
                        "poll tick panicked; continuing on schedule"
                    ),
                },
                _ = shutdown.changed() => {
                    info!("poller cancelled during a tick");
                    break;
                }
            }

            state.send_replace(PollerState::Idle);

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = shutdown.changed() => break,
            }
        }

        state.send_replace(PollerState::Stopped);
        info!("poller stopped");
    }

    async fn tick(&self, state: &watch::Sender<PollerState>) -> TickSummary {
        state.send_replace(PollerState::Fetching);

        let fetches = self.stops.iter().map(|stop| {
            let source = Arc::clone(&self.source);
            async move {
                let result = source.fetch_departures(stop).await;
                (stop.clone(), result)
            }
        });
        let results = join_all(fetches).await;

        let mut summary = TickSummary::default();
        for (stop, result) in &results {
            match result {
                Ok(departures) => {
                    summary.succeeded += 1;
                    debug!(stop = %stop, departures = departures.departures.len(), "stop refreshed");
                }
                Err(e) => {
                    summary.failed += 1;
                    warn!(stop = %stop, error = %e, "departure fetch failed");
                }
            }
        }

        state.send_replace(PollerState::Updating);

        for (stop, outcome) in self.store.apply_tick(results).await {
            match outcome {
                UpdateOutcome::MarkedStale => {
                    info!(stop = %stop, "keeping stale departures after failed fetch")
                }
                UpdateOutcome::StillMissing => {
                    info!(stop = %stop, "no departures loaded yet for stop")
                }
                UpdateOutcome::Refreshed => {}
            }
        }

        summary
    }
}

/// Owner of a running poll loop.
#[derive(Debug)]
pub struct PollerHandle {
    shutdown: watch::Sender<bool>,
    state: watch::Receiver<PollerState>,
    task: JoinHandle<()>,
}

impl PollerHandle {
    /// The loop's current state.
    pub fn state(&self) -> PollerState {
        *self.state.borrow()
    }

    /// A receiver that is notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<PollerState> {
        self.state.clone()
    }

    /// Ask the loop to stop. No new tick starts after this.
    pub fn cancel(&self) {
        self.shutdown.send_replace(true);
    }

    /// Whether the background task has exited.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the loop to exit without cancelling it.
    pub async fn join(self) -> Result<(), JoinError> {
        let PollerHandle { shutdown, task, .. } = self;
        let result = task.await;
        drop(shutdown);
        result
    }

    /// Cancel the loop and wait for it to exit.
    pub async fn shutdown(self) -> Result<(), JoinError> {
        self.cancel();
        self.join().await
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
