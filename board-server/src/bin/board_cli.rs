use std::error::Error;

use board_server::cli;
use board_server::config::CliConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenvy::dotenv().ok();
    board_server::logging::init();

    let config = CliConfig::from_env()?;
    cli::run(config).await?;

    Ok(())
}
