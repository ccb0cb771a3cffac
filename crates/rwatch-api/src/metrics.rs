//! Prometheus metrics for the collector.

use metrics::counter;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Initialize the Prometheus metrics recorder.
/// Returns a handle that can be used to render metrics.
pub fn init_metrics() -> PrometheusHandle {
    PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus recorder")
}

/// Metric names as constants for consistency.
pub mod names {
    pub const REPORTS_INGESTED_TOTAL: &str = "rwatch_reports_ingested_total";
    pub const INGEST_FAILURES_TOTAL: &str = "rwatch_ingest_failures_total";
    pub const STORE_CLEARS_TOTAL: &str = "rwatch_store_clears_total";
}

/// Record an accepted report.
pub fn record_ingest(severity: &str) {
    let labels = [("severity", severity.to_string())];
    counter!(names::REPORTS_INGESTED_TOTAL, &labels).increment(1);
}

/// Record a failed ingestion.
pub fn record_ingest_failure() {
    counter!(names::INGEST_FAILURES_TOTAL).increment(1);
}

/// Record a clear-all operation.
pub fn record_store_clear() {
    counter!(names::STORE_CLEARS_TOTAL).increment(1);
}
