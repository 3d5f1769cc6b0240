//! Metrics collection and Prometheus export.
//!
//! Installs the Prometheus recorder and names the assistant-specific counters.

use metrics::counter;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;

/// Global handle to the Prometheus recorder.
pub static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Initialize the metrics recorder.
///
/// Safe to call more than once; later calls return the first handle. If a
/// global recorder is already installed elsewhere, a detached recorder is
/// used so `/metrics` still renders.
pub fn init_metrics() -> &'static PrometheusHandle {
    METRICS_HANDLE.get_or_init(|| match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => handle,
        Err(e) => {
            tracing::warn!(error = %e, "Prometheus recorder not installed globally");
            PrometheusBuilder::new().build_recorder().handle()
        }
    })
}

/// Current metrics in Prometheus text format.
pub fn get_metrics() -> String {
    METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_else(|| "# Metrics recorder not initialized".to_string())
}

pub fn record_generator_error(provider: &'static str, kind: &'static str) {
    counter!(
        "assistant_generator_errors_total",
        "provider" => provider,
        "error_type" => kind
    )
    .increment(1);
}

/// `operation` is `insert` or `list`.
pub fn record_store_error(operation: &'static str) {
    counter!("assistant_history_store_errors_total", "operation" => operation).increment(1);
}

pub fn record_exchange_saved() {
    counter!("assistant_exchanges_saved_total").increment(1);
}
