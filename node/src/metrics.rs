//! # Prometheus Metrics
//!
//! Operational metrics for the node, scraped at `/metrics` on the metrics
//! port. Everything is registered in a dedicated [`prometheus::Registry`]
//! under the `bookchain` namespace.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};
use std::sync::Arc;

/// Holds all Prometheus metric handles for the node.
#[derive(Clone)]
pub struct NodeMetrics {
    /// Prometheus registry that owns all metrics below.
    registry: Registry,
    /// Blocks committed through the API.
    pub blocks_appended_total: IntCounter,
    /// Appends refused, labelled by rejection reason.
    pub appends_rejected_total: IntCounterVec,
    /// Number of committed blocks, genesis included.
    pub chain_length: IntGauge,
    /// Time spent inside a single append, lock wait included.
    pub append_latency_seconds: Histogram,
    /// Background audits run.
    pub audits_total: IntCounter,
    /// Background audits that found a violation.
    pub audit_failures_total: IntCounter,
}

impl NodeMetrics {
    /// Creates and registers all metrics. Call once at startup.
    pub fn new() -> Self {
        let registry = Registry::new_custom(Some("bookchain".into()), None)
            .expect("failed to create prometheus registry");

        let blocks_appended_total = IntCounter::new(
            "blocks_appended_total",
            "Total number of blocks committed to the ledger",
        )
        .expect("metric creation");
        registry
            .register(Box::new(blocks_appended_total.clone()))
            .expect("metric registration");

        let appends_rejected_total = IntCounterVec::new(
            Opts::new(
                "appends_rejected_total",
                "Total number of appends refused, by reason",
            ),
            &["reason"],
        )
        .expect("metric creation");
        registry
            .register(Box::new(appends_rejected_total.clone()))
            .expect("metric registration");

        let chain_length = IntGauge::new("chain_length", "Number of committed blocks")
            .expect("metric creation");
        registry
            .register(Box::new(chain_length.clone()))
            .expect("metric registration");

        let append_latency_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "append_latency_seconds",
                "Time to validate and commit one block, in seconds",
            )
            .buckets(vec![
                0.000_01, 0.000_05, 0.000_1, 0.000_5, 0.001, 0.005, 0.01, 0.05, 0.1,
            ]),
        )
        .expect("metric creation");
        registry
            .register(Box::new(append_latency_seconds.clone()))
            .expect("metric registration");

        let audits_total = IntCounter::new("audits_total", "Total number of full-chain audits run")
            .expect("metric creation");
        registry
            .register(Box::new(audits_total.clone()))
            .expect("metric registration");

        let audit_failures_total = IntCounter::new(
            "audit_failures_total",
            "Total number of full-chain audits that found a violation",
        )
        .expect("metric creation");
        registry
            .register(Box::new(audit_failures_total.clone()))
            .expect("metric registration");

        Self {
            registry,
            blocks_appended_total,
            appends_rejected_total,
            chain_length,
            append_latency_seconds,
            audits_total,
            audit_failures_total,
        }
    }

    /// Count a rejected append under its reason label.
    pub fn record_rejection(&self, reason: &str) {
        self.appends_rejected_total
            .with_label_values(&[reason])
            .inc();
    }

    /// Encodes all registered metrics into the Prometheus text exposition format.
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

impl Default for NodeMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared metrics handle passed to axum handlers and background tasks.
pub type SharedMetrics = Arc<NodeMetrics>;

/// Axum handler that renders `/metrics` in Prometheus text format.
pub async fn metrics_handler(
    axum::extract::State(metrics): axum::extract::State<SharedMetrics>,
) -> impl IntoResponse {
    match metrics.encode() {
        Ok(body) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!("failed to encode metrics: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "metrics encoding failed").into_response()
        }
    }
}
