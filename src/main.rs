//! product-api server binary.

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

use product_api::config::{load_config, ServiceConfig};
use product_api::lifecycle::{self, signals, Shutdown};
use product_api::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "product-api")]
#[command(about = "In-memory product catalogue over HTTP", long_about = None)]
struct Cli {
    /// Optional TOML config file; defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => match load_config(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load config {}: {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        },
        None => ServiceConfig::default(),
    };

    logging::init(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "product-api starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        read_timeout_secs = config.timeouts.read_secs,
        write_timeout_secs = config.timeouts.write_secs,
        idle_timeout_secs = config.timeouts.idle_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => {
                if let Err(e) = metrics::init_metrics(addr) {
                    tracing::error!(error = %e, "Failed to start metrics endpoint");
                }
            }
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let prepared = match lifecycle::prepare(config).await {
        Ok(prepared) => prepared,
        Err(e) => {
            tracing::error!(error = %e, "Error starting server");
            return ExitCode::FAILURE;
        }
    };

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(signals::trigger_on_termination(shutdown.clone()));

    match prepared.server.run(prepared.listener, server_shutdown).await {
        Ok(()) => {
            tracing::info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Error shutting down server");
            ExitCode::FAILURE
        }
    }
}
