//! Organ bank console
//!
//! Terminal front end for the organ bank backend: live reconciliation
//! dashboard, availability board, donor registration and hospital requests.

mod app;
mod commands;
mod config;
mod render;
mod shutdown;

use app::App;
use clap::Parser;
use commands::Command;
use config::ConfigLoader;
use organbank_core::gateway::GatewayError;
use organbank_sdk::client::ClientError;
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;

/// Organ bank console - donors, hospital requests and organ availability
#[derive(Parser, Debug)]
#[command(name = "organbank-console")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, default_value = "./organbank.toml")]
    config: PathBuf,

    /// Override the backend base URL
    #[arg(long, env = "ORGANBANK_BASE_URL")]
    base_url: Option<Url>,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    init_tracing(args.log_json);

    tracing::debug!("Starting organbank-console v{}", env!("CARGO_PKG_VERSION"));

    let settings = ConfigLoader::new(&args.config, args.base_url)
        .load()
        .map_err(|e| {
            tracing::error!("Failed to load configuration: {}", e);
            e
        })?;
    tracing::debug!(base_url = %settings.base_url, "Configuration loaded from {:?}", args.config);

    let app = App::new(settings)?;
    let result = args.command.run(&app).await;
    if let Err(e) = &result {
        if backend_unreachable(e) {
            tracing::error!(base_url = %app.settings.base_url, "Backend unreachable");
        }
    }
    result
}

fn backend_unreachable(error: &anyhow::Error) -> bool {
    match error.downcast_ref::<GatewayError>() {
        Some(GatewayError::Client(e)) => e.is_connect(),
        Some(GatewayError::Unavailable(_)) => false,
        None => error
            .downcast_ref::<ClientError>()
            .is_some_and(ClientError::is_connect),
    }
}

/// Initialize the tracing subscriber with environment-based filtering.
///
/// Logs go to stderr so they never interleave with rendered output.
fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,reqwest=warn,hyper=warn"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
