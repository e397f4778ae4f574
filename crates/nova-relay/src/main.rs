//! # Nova Relay
//!
//! Relays text and image questions from browser clients to Gemini and
//! returns normalized answers. Also issues one-time verification codes and
//! keeps a flat append log of submitted text.
//!
//! ## Architecture
//! ```text
//! Browser client → Nova Relay → Gemini API
//!                      ↓
//!              data.json (append log)
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod auth;
mod codes;
mod config;
mod delegate;
mod error;
mod routes;
mod session;
mod state;
mod store;

use config::{AppConfig, Secrets};
use state::AppState;

/// Nova Relay - Gemini query relay
#[derive(Parser, Debug)]
#[command(name = "nova-relay")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config/nova.toml")]
    config: String,

    /// Listen address (overrides config)
    #[arg(short, long, env = "LISTEN_ADDR")]
    listen: Option<String>,

    /// Data file for the append log (overrides config)
    #[arg(long, env = "DATA_FILE")]
    data_file: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "LOG_LEVEL")]
    log_level: String,

    /// Enable JSON logging output
    #[arg(long, default_value = "false")]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Pick up a local .env before reading the environment
    let _ = dotenvy::dotenv();

    // Parse CLI arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(&args.log_level, args.json_logs)?;

    info!("Starting Nova Relay v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = AppConfig::load(&args.config, &args).context("Invalid configuration")?;
    let secrets = Secrets::from_env().context("Missing required secrets")?;
    info!(
        listen = %config.listen_addr,
        data_file = %config.data_file,
        model = %config.gemini.model,
        "Configuration loaded"
    );

    // Initialize application state
    let listen_addr = config.listen_addr.clone();
    let state = AppState::new(config, secrets)?;

    // Build router
    let app = routes::create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&listen_addr)
        .await
        .with_context(|| format!("Failed to bind {}", listen_addr))?;
    info!("Nova Relay listening on {}", listen_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Nova Relay shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

/// Initialize structured logging with tracing
fn init_logging(level: &str, json: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_thread_ids(true))
            .init();
    }

    Ok(())
}
