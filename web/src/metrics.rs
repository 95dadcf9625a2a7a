//! Prometheus metrics for the REST server.
//!
//! - `todo_server_requests_total{op, outcome}`: handled API requests
//! - `todo_server_todos`: number of stored todos after the last mutation

use metrics::{counter, describe_counter, describe_gauge, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Counter of API requests, labelled by operation and outcome.
pub const REQUESTS: &str = "todo_server_requests_total";

/// Gauge of stored todos.
pub const TODOS: &str = "todo_server_todos";

/// Register metric descriptions with the installed recorder.
pub fn describe() {
    describe_counter!(REQUESTS, "Total number of todo API requests handled");
    describe_gauge!(TODOS, "Number of todos currently stored");
}

/// Install a global Prometheus recorder and return its render handle.
///
/// # Errors
///
/// Fails if a global recorder is already installed.
pub fn install_prometheus() -> anyhow::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install Prometheus recorder: {e}"))?;
    describe();
    Ok(handle)
}

/// Count one handled request.
pub(crate) fn record_request(op: &'static str, ok: bool) {
    let outcome = if ok { "ok" } else { "error" };
    counter!(REQUESTS, "op" => op, "outcome" => outcome).increment(1);
}

/// Publish the current number of stored todos.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn record_todo_count(count: usize) {
    gauge!(TODOS).set(count as f64);
}
