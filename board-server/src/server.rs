//! Server wiring: listener, poller and router with an orderly shutdown.

use std::future::Future;

use tracing::{info, warn};

use crate::config::BoardConfig;
use crate::poller::Poller;
use crate::snapshot::SnapshotStore;
use crate::web::{AppState, create_router};
use crate::ztm::DepartureSource;

/// Fatal errors while running the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// The listen address could not be bound
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: std::net::SocketAddr,
        source: std::io::Error,
    },

    /// The HTTP server stopped with an I/O error
    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),
}

/// Bind the listener, start polling `source` and serve until `shutdown`
/// resolves, then stop the poller.
///
/// Nothing is polled unless the listener was bound.
pub async fn serve<S, F>(config: &BoardConfig, source: S, shutdown: F) -> Result<(), ServerError>
where
    S: DepartureSource,
    F: Future<Output = ()> + Send + 'static,
{
    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .map_err(|source| ServerError::Bind {
            addr: config.bind_addr,
            source,
        })?;
    let local_addr = listener.local_addr()?;

    let store = SnapshotStore::new();
    let poller = Poller::new(source, store.clone(), config.stops.all(), config.poll_interval).spawn();

    let state = AppState::new(store, config.stops.clone());
    let app = create_router(state, &config.static_dir);

    info!(
        addr = %local_addr,
        stop_a = %config.stops.side_a,
        stop_b = %config.stops.side_b,
        interval_secs = config.poll_interval.as_secs(),
        "departure board listening"
    );

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await;

    info!("shutting down poller");
    if let Err(e) = poller.shutdown().await {
        warn!(error = %e, "poller task ended abnormally");
    }

    served.map_err(ServerError::from)
}
