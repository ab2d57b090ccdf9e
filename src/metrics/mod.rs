//! Prometheus metrics for monitoring
//!
//! Exposes metrics for:
//! - Path status checks and the stage they reached
//! - Failed chain queries per stage
//! - Signatures produced and refused

use crate::error::{RelayerError, RelayerResult};
use crate::path::status::Stage;

use axum::{http::StatusCode, routing::get, Router};
use lazy_static::lazy_static;
use prometheus::{register_counter_vec, CounterVec, Encoder, TextEncoder};
use std::net::SocketAddr;
use tracing::info;

lazy_static! {
    // Path status metrics
    pub static ref PATH_STATUS_CHECKS: CounterVec = register_counter_vec!(
        "handshake_path_status_checks_total",
        "Total path status checks by furthest stage reached",
        &["stage"]
    ).unwrap();

    pub static ref PATH_QUERIES_FAILED: CounterVec = register_counter_vec!(
        "handshake_path_queries_failed_total",
        "Total failed chain queries during status checks",
        &["chain_id", "stage"]
    ).unwrap();

    // Signing metrics
    pub static ref SIGNATURES: CounterVec = register_counter_vec!(
        "handshake_signatures_total",
        "Total transactions signed",
        &["chain_id"]
    ).unwrap();

    pub static ref SIGNING_FAILURES: CounterVec = register_counter_vec!(
        "handshake_signing_failures_total",
        "Total signing attempts refused or failed",
        &["chain_id", "reason"]
    ).unwrap();
}

/// Prometheus metrics server
pub struct MetricsServer {
    port: u16,
}

impl MetricsServer {
    pub fn new(port: u16) -> Self {
        Self { port }
    }

    pub async fn run(&self) -> RelayerResult<()> {
        let app = Router::new().route("/metrics", get(metrics_handler));

        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));
        info!("Starting metrics server on {}", addr);

        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| RelayerError::Internal(format!("metrics bind failed: {}", e)))?;
        axum::serve(listener, app)
            .await
            .map_err(|e| RelayerError::Internal(format!("metrics server failed: {}", e)))?;

        Ok(())
    }
}

async fn metrics_handler() -> Result<String, (StatusCode, String)> {
    encode_metrics().map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
}

/// Render all registered metrics in the Prometheus text format
pub fn encode_metrics() -> RelayerResult<String> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| RelayerError::Internal(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| RelayerError::Internal(e.to_string()))
}

// Helper functions to record metrics

pub fn record_path_status(stage: Stage) {
    PATH_STATUS_CHECKS
        .with_label_values(&[stage.as_str()])
        .inc();
}

pub fn record_query_failure(chain_id: &str, stage: Stage) {
    PATH_QUERIES_FAILED
        .with_label_values(&[chain_id, stage.as_str()])
        .inc();
}

pub fn record_signature(chain_id: &str) {
    SIGNATURES.with_label_values(&[chain_id]).inc();
}

pub fn record_signing_failure(chain_id: &str, reason: &str) {
    SIGNING_FAILURES
        .with_label_values(&[chain_id, reason])
        .inc();
}
