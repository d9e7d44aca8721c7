//! Urban flood vulnerability pipeline CLI

use anyhow::Result;
use clap::Parser;
use flood_cli::cli::{self, Cli};
use flood_cli::config::AppConfig;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    let args = Cli::parse();

    // Initialize tracing
    init_tracing()?;

    // Load configuration
    let app = args.apply(AppConfig::load()?);
    info!("Loaded configuration: {:?}", app);

    cli::run(args.command, app)
}

/// Initialize tracing subscriber
fn init_tracing() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "flood_cli=info,flood_sdk=info,flood_runtime=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {}", e))?;

    Ok(())
}
