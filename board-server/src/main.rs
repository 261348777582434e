use std::error::Error;

use tracing::{info, warn};

use board_server::config::BoardConfig;
use board_server::server;
use board_server::ztm::{MockZtmClient, ZtmClient};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenvy::dotenv().ok();
    board_server::logging::init();

    let config = BoardConfig::from_env()?;

    match &config.mock_data_dir {
        Some(dir) => {
            let mock = MockZtmClient::from_dir(dir)?;
            info!(
                dir = %dir.display(),
                stops = ?mock.available_stops().await,
                "serving mock departures"
            );
            server::serve(&config, mock, shutdown_signal()).await?;
        }
        None => {
            info!(api = %config.ztm.base_url, "polling ZTM API");
            let client = ZtmClient::new(config.ztm.clone())?;
            server::serve(&config, client, shutdown_signal()).await?;
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
