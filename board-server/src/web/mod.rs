//! Web layer for the departure board.
//!
//! Serves the cached snapshots as JSON and as an HTML page.

mod dto;
mod routes;
mod state;
mod templates;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
pub use templates::*;
