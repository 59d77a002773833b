//! Metrics collection and Prometheus export.
//!
//! Installs the exporter used by the `/metrics` endpoint and names the
//! domain counters recorded by the document service.

use crate::models::DocumentType;
use metrics::counter;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;

/// Global handle to the Prometheus recorder.
pub static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Initialize the metrics recorder.
///
/// This must be called once at startup before any metrics are recorded.
/// Panics if called more than once.
pub fn init_metrics() {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .expect("failed to install Prometheus recorder");

    if METRICS_HANDLE.set(handle).is_err() {
        panic!("failed to set metrics handle: already initialized");
    }
}

/// Current metrics in Prometheus text format.
pub fn get_metrics() -> String {
    METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_else(|| "# Metrics recorder not initialized".to_string())
}

pub fn record_upload(doc_type: DocumentType) {
    counter!("documents_uploaded_total", "type" => doc_type.as_str()).increment(1);
}

pub fn record_upload_rejected(reason: &'static str) {
    counter!("documents_upload_rejected_total", "reason" => reason).increment(1);
}

pub fn record_delete() {
    counter!("documents_deleted_total").increment(1);
}
