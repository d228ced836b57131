//! Prometheus metrics for the gateway
//!
//! Labels carry only mode and outcome, never handles, addresses or values.

use std::time::Duration;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

pub const MODE_USER: &str = "user";
pub const MODE_PUBLIC: &str = "public";

pub const OUTCOME_OK: &str = "ok";
pub const OUTCOME_DENIED: &str = "denied";
pub const OUTCOME_CLIENT_ERROR: &str = "client_error";
pub const OUTCOME_SERVER_ERROR: &str = "server_error";

pub fn record_decrypt(mode: &'static str, outcome: &'static str, duration: Duration) {
    counter!("gateway_decrypt_requests_total", "mode" => mode, "outcome" => outcome).increment(1);
    histogram!("gateway_decrypt_duration_seconds", "mode" => mode).record(duration.as_secs_f64());
}

pub fn record_ingest(handles: usize) {
    counter!("gateway_inputs_ingested_total").increment(1);
    counter!("gateway_handles_registered_total").increment(handles as u64);
}

pub fn init_prometheus_recorder() -> anyhow::Result<PrometheusHandle> {
    PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install Prometheus recorder: {}", e))
}
