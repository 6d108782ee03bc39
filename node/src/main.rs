// Copyright (c) 2026 Bookchain Contributors. MIT License.
// See LICENSE for details.

//! # Bookchain Node
//!
//! Entry point for the `bookchain-node` binary. Parses CLI arguments,
//! initializes logging and metrics, bootstraps the ledger, starts the
//! background audit, and serves the HTTP API.
//!
//! Subcommands:
//!
//! - `run`     - start the node
//! - `version` - print build version information

mod api;
mod audit;
mod cli;
mod logging;
mod metrics;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;

use bookchain_ledger::config::{HASH_ALGORITHM, LEDGER_FORMAT_VERSION, TIMESTAMP_FORMAT};
use bookchain_ledger::Ledger;

use cli::{BookchainCli, Commands};
use metrics::NodeMetrics;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = BookchainCli::parse();

    match cli.command {
        Commands::Run(args) => run_node(args).await,
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

/// Starts the node: ledger, API server, metrics endpoint, and audit loop.
async fn run_node(args: cli::RunArgs) -> Result<()> {
    logging::init_logging(logging::DEFAULT_FILTER, args.log_format);

    tracing::info!(
        host = %args.host,
        port = args.port,
        metrics_port = args.metrics_port,
        audit_interval_secs = args.audit_interval_secs,
        "starting bookchain-node"
    );

    // --- Ledger ---
    let ledger = Ledger::new();
    let genesis = ledger.tip();
    tracing::info!(
        position = genesis.position,
        hash = %genesis.hash,
        created_at = %genesis.created_at,
        hash_algorithm = HASH_ALGORITHM,
        "ledger bootstrapped"
    );

    // --- Metrics ---
    let node_metrics = Arc::new(NodeMetrics::new());
    node_metrics.chain_length.set(ledger.len() as i64);

    // --- Application state ---
    let app_state = api::AppState {
        version: format!(
            "{} (ledger format {})",
            env!("CARGO_PKG_VERSION"),
            LEDGER_FORMAT_VERSION,
        ),
        ledger: ledger.clone(),
        metrics: Arc::clone(&node_metrics),
    };

    // --- API server ---
    let api_router = api::create_router(app_state);
    let api_addr = format!("{}:{}", args.host, args.port);
    let api_listener = tokio::net::TcpListener::bind(&api_addr)
        .await
        .with_context(|| format!("failed to bind API listener on {}", api_addr))?;
    tracing::info!("API server listening on {}", api_addr);

    // --- Metrics server ---
    let metrics_router = axum::Router::new()
        .route("/metrics", axum::routing::get(metrics::metrics_handler))
        .with_state(Arc::clone(&node_metrics));
    let metrics_addr = format!("{}:{}", args.host, args.metrics_port);
    let metrics_listener = tokio::net::TcpListener::bind(&metrics_addr)
        .await
        .with_context(|| format!("failed to bind metrics listener on {}", metrics_addr))?;
    tracing::info!("Metrics server listening on {}", metrics_addr);

    // --- Audit ---
    let audit_task = if args.audit_interval_secs > 0 {
        Some(audit::spawn_audit(
            ledger.clone(),
            Arc::clone(&node_metrics),
            Duration::from_secs(args.audit_interval_secs),
        ))
    } else {
        tracing::info!("background audit disabled");
        None
    };

    // --- Serve ---
    tokio::select! {
        res = axum::serve(api_listener, api_router) => {
            if let Err(e) = res {
                tracing::error!("API server error: {}", e);
            }
        }
        res = axum::serve(metrics_listener, metrics_router) => {
            if let Err(e) = res {
                tracing::error!("Metrics server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            tracing::info!("shutdown signal received");
        }
    }

    if let Some(task) = audit_task {
        task.abort();
    }
    tracing::info!(length = ledger.len(), "bookchain-node stopped");
    Ok(())
}

/// Prints version information to stdout.
fn print_version() {
    println!("bookchain-node {}", env!("CARGO_PKG_VERSION"));
    println!("ledger format  {}", LEDGER_FORMAT_VERSION);
    println!("block hash     {}", HASH_ALGORITHM);
    println!("timestamps     {}", TIMESTAMP_FORMAT);
}

/// Waits for SIGINT (Ctrl+C) or SIGTERM, whichever comes first.
///
/// On non-Unix platforms, only Ctrl+C is supported.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
