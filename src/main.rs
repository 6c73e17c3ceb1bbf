mod analyzer;
mod browser;
mod categorize;
mod config;
mod error;
mod html_validator;
mod page;
mod report;
mod routes;
mod server;
mod state;
mod storage;

use clap::Parser;
use std::sync::Arc;
use tracing::{info, warn};

use config::{AuditorConfig, CliArgs};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wcag_auditor=info,tower_http=info".into()),
        )
        .init();

    let args = CliArgs::parse();
    info!("Starting wcag-auditor v{}", env!("CARGO_PKG_VERSION"));
    info!("Chrome endpoint: {}", args.chrome_endpoint);
    info!("Validator endpoint: {}", args.validator_url);
    info!("Database: {:?}", args.db_path);

    let config = AuditorConfig::from_args(args);

    if !config.axe_script.exists() {
        warn!(
            "axe-core bundle not found at {:?}; analyses will fail until it is provided (see assets/README.md)",
            config.axe_script
        );
    }

    let port = config.port;
    let state = Arc::new(AppState::new(config)?);

    let router = server::build_router(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
    info!("Auditor listening on http://0.0.0.0:{}", port);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Auditor shutting down");
    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    info!("Received shutdown signal");
}
