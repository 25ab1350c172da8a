//! SyncScript entity store server
//!
//! Serves the domain façades (calls, threats, metrics, search, webhooks)
//! over a JSON HTTP API, persisting every collection to a data directory.
//!
//! Usage:
//!   syncscript-server --port 8080 --data-dir ./data
//!
//! Without `--data-dir` (or when the directory is unusable) all data is kept
//! in memory and lost on exit.

use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use syncscript_domains::Workspace;
use syncscript_server::build_router;
use syncscript_storage::{AdapterConfig, open_adapter};
use syncscript_store::StoreConfig;
use syncscript_types::Namespace;
use tracing::{Level, info, warn};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "syncscript-server")]
#[command(about = "SyncScript entity store HTTP server")]
struct Args {
    /// HTTP port
    #[arg(short, long, default_value = "8080", env = "SYNCSCRIPT_PORT")]
    port: u16,

    /// Address to bind
    #[arg(long, default_value = "127.0.0.1", env = "SYNCSCRIPT_BIND")]
    bind: std::net::IpAddr,

    /// Directory for persisted collections
    #[arg(short, long, env = "SYNCSCRIPT_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Largest value a single collection may occupy, in bytes
    #[arg(long, env = "SYNCSCRIPT_MAX_VALUE_BYTES")]
    max_value_bytes: Option<usize>,

    /// Root namespace for all storage keys
    #[arg(long, default_value = "syncscript", env = "SYNCSCRIPT_NAMESPACE")]
    namespace: String,

    /// Start with empty collections instead of demo data
    #[arg(long)]
    no_seed: bool,

    /// Telemetry simulation period in milliseconds (0 disables it)
    #[arg(long, default_value = "5000")]
    tick_ms: u64,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .compact()
        .init();

    info!("SyncScript server starting...");
    let namespace = Namespace::new(&args.namespace).context("Invalid namespace")?;
    let adapter = open_adapter(&AdapterConfig {
        data_dir: args.data_dir.clone(),
        max_value_bytes: args.max_value_bytes,
    });
    let config = StoreConfig {
        seed_defaults: !args.no_seed,
        tick_interval_ms: args.tick_ms,
        ..StoreConfig::default()
    };

    let workspace = Arc::new(Workspace::new(adapter, namespace, config).context("Failed to build workspace")?);
    workspace.init().await;
    if args.tick_ms > 0 {
        workspace
            .start_telemetry()
            .context("Failed to start telemetry simulation")?;
    }

    let addr = SocketAddr::new(args.bind, args.port);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("HTTP API listening on http://{}/api/v1", addr);

    axum::serve(listener, build_router(workspace.clone()))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("Shutting down...");
    workspace.destroy();
    if !workspace.flush().await {
        warn!("Some collections could not be saved before exit");
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
