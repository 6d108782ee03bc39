//! # CLI Interface
//!
//! Command-line arguments for `bookchain-node`, via `clap` derive. Every
//! `run` flag can also come from a `BOOKCHAIN_*` environment variable.

use clap::{Parser, Subcommand};

use bookchain_ledger::config::{
    DEFAULT_API_PORT, DEFAULT_AUDIT_INTERVAL_SECS, DEFAULT_HOST, DEFAULT_METRICS_PORT,
};

use crate::logging::LogFormat;

/// Bookchain node.
///
/// Serves a single in-memory, hash-chained ledger of book checkouts over
/// HTTP and exposes Prometheus metrics.
#[derive(Parser, Debug)]
#[command(
    name = "bookchain-node",
    about = "Hash-chained book checkout ledger",
    version,
    propagate_version = true
)]
pub struct BookchainCli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the node.
    Run(RunArgs),
    /// Print version information and exit.
    Version,
}

/// Arguments for the `run` subcommand.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Address to bind the API and metrics listeners on.
    #[arg(long, env = "BOOKCHAIN_HOST", default_value = DEFAULT_HOST)]
    pub host: String,

    /// Port for the REST API.
    #[arg(long, short = 'p', env = "BOOKCHAIN_PORT", default_value_t = DEFAULT_API_PORT)]
    pub port: u16,

    /// Port for the Prometheus metrics endpoint.
    #[arg(long, env = "BOOKCHAIN_METRICS_PORT", default_value_t = DEFAULT_METRICS_PORT)]
    pub metrics_port: u16,

    /// Seconds between background integrity audits of the whole chain.
    /// Zero disables the audit.
    #[arg(long, env = "BOOKCHAIN_AUDIT_INTERVAL", default_value_t = DEFAULT_AUDIT_INTERVAL_SECS)]
    pub audit_interval_secs: u64,

    /// Log output format.
    #[arg(long, env = "BOOKCHAIN_LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,
}
