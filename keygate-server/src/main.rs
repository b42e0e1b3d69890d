//! Keygate key validation server.
//!
//! Serves the key check and usage logging endpoints over HTTP, backed by a
//! single SQLite key store opened at startup.
//!
//! Usage:
//!   keygate-server --port 8080 --database keygate.db

use std::{net::IpAddr, path::PathBuf, sync::Arc};
use anyhow::{Context, Result};
use clap::Parser;
use keygate_db::SqliteKeyStore;
use keygate_server::{build_router, AppState};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(name = "keygate-server")]
#[command(about = "Keygate key validation service")]
struct Args {
    /// HTTP port to listen on
    #[arg(short, long, env = "KEYGATE_PORT", default_value = "8080")]
    port: u16,

    /// Address to bind
    #[arg(long, env = "KEYGATE_BIND", default_value = "0.0.0.0")]
    bind: IpAddr,

    /// Path to the SQLite key store
    #[arg(short, long, env = "KEYGATE_DATABASE", default_value = "keygate.db")]
    database: PathBuf,

    /// Enable verbose debug logging (ignored when RUST_LOG is set)
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if args.verbose { "debug" } else { "info" }));
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    info!("Keygate server starting...");
    let store = SqliteKeyStore::open(&args.database)
        .with_context(|| format!("Failed to open key store {}", args.database.display()))?;
    let app = build_router(AppState::new(Arc::new(store)));

    let listener = tokio::net::TcpListener::bind((args.bind, args.port))
        .await
        .with_context(|| format!("Failed to bind {}:{}", args.bind, args.port))?;
    info!("HTTP API listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("Keygate server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
