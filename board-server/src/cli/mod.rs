//! Terminal client for the board server.
//!
//! Polls `GET /departures` on a fixed interval and prints both sides as
//! text tables. Errors are shown on screen and the loop keeps going; only
//! Ctrl-C ends it.

mod payload;
mod render;

use std::io::Write;

use reqwest::StatusCode;
use tracing::{info, warn};

use crate::config::CliConfig;

pub use payload::{BoardPayload, RowPayload, SidePayload};
pub use render::{PollOutcome, format_delay, render_board, render_outcome, render_side};

/// ANSI clear screen and move the cursor home.
const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Errors from one poll of the board server.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Request failed or the body was not JSON
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a status the client does not understand
    #[error("server returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Writing to the terminal failed
    #[error("terminal error: {0}")]
    Io(#[from] std::io::Error),
}

/// Fetch the board once and classify the answer.
pub async fn poll_once(http: &reqwest::Client, url: &str) -> Result<PollOutcome, CliError> {
    let response = http.get(url).send().await?;

    match response.status() {
        StatusCode::OK => Ok(PollOutcome::Fresh(response.json().await?)),
        StatusCode::BAD_GATEWAY => Ok(PollOutcome::Stale(response.json().await?)),
        StatusCode::SERVICE_UNAVAILABLE => Ok(PollOutcome::NotLoaded),
        status => {
            let body = response.text().await.unwrap_or_default();
            Err(CliError::Status {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            })
        }
    }
}

/// Poll and redraw until Ctrl-C.
pub async fn run(config: CliConfig) -> Result<(), CliError> {
    let http = reqwest::Client::builder()
        .timeout(config.request_timeout)
        .build()?;

    info!(
        url = %config.board_url,
        refresh_secs = config.refresh_interval.as_secs(),
        "starting terminal board"
    );

    loop {
        let screen = match poll_once(&http, &config.board_url).await {
            Ok(outcome) => render_outcome(&outcome),
            Err(e) => {
                warn!(error = %e, "poll failed");
                format!("Error fetching departures: {e}\n")
            }
        };

        draw(&screen)?;

        tokio::select! {
            _ = tokio::time::sleep(config.refresh_interval) => {}
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted, exiting");
                return Ok(());
            }
        }
    }
}

fn draw(screen: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout().lock();
    write!(stdout, "{CLEAR_SCREEN}{screen}")?;
    stdout.flush()
}
