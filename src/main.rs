//! Festival Organizer - list music festivals grouped by record label and band
//!
//! Fetches the festival list once at startup, restructures it and writes an
//! indented listing to a text file.

use std::sync::Arc;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use festival_organizer::cache::FestivalCache;
use festival_organizer::cli::{Cli, StartupConfig};
use festival_organizer::data::{FestivalsClient, ReqwestExchange};
use festival_organizer::output::write_hierarchy;
use festival_organizer::service::{CachedFestivalService, FestivalService};

/// Sets up logging to stderr, filtered by `RUST_LOG`
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "festival_organizer=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Cancels `token` when Ctrl-C is received
fn cancel_on_ctrl_c(token: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, abandoning retries");
            token.cancel();
        }
    });
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let cli = Cli::parse();
    let config = StartupConfig::from_cli(&cli).inspect_err(|e| error!("{}", e))?;

    if !config.list_on_start {
        info!("Listing festivals on start is disabled");
        return Ok(());
    }

    let cancel = CancellationToken::new();
    cancel_on_ctrl_c(cancel.clone());

    let exchange = ReqwestExchange::new(config.request_timeout)?;
    let client = FestivalsClient::with_exchange(exchange, &config.rest_uri, config.backoff.clone())?
        .with_cancellation(cancel);
    info!(url = %client.url(), "Using festivals API");

    let cache = Arc::new(FestivalCache::new(client));
    let service = CachedFestivalService::new(cache);

    let hierarchy = service
        .get_all_festivals()
        .await
        .inspect_err(|e| error!("Failed to get festivals: {}", e))?;

    write_hierarchy(&config.output, &hierarchy)?;
    info!(
        record_labels = hierarchy.len(),
        output = %config.output.display(),
        "Wrote restructured festival data"
    );

    Ok(())
}
