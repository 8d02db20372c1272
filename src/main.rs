//! Split Tab Plus bridge binary: serves the Coordinator on stdin/stdout.
//!
//! Logs go to stderr; filter with `RUST_LOG`.

use anyhow::Result;
use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use split_tab_plus::bridge::serve;
use split_tab_plus::config::BridgeConfig;

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let config = BridgeConfig::from_env();
    info!(data_dir = %config.data_dir.display(), "Starting Split Tab Plus bridge");

    serve(
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
        &config,
    )
    .await?;
    info!("Bridge stopped");
    Ok(())
}
