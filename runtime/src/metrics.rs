//! Prometheus metrics for remote persistence calls.
//!
//! Every call the engine makes to its [`RemoteStore`](todo_sync_core::RemoteStore) goes
//! through [`observe`], which records:
//!
//! - `todo_sync_persistence_calls_total{op, outcome}`
//! - `todo_sync_persistence_duration_seconds{op}`
//!
//! and logs the outcome. Without an installed recorder the macros are no-ops, so tests
//! and embedders that do not care about metrics pay nothing.
//!
//! # Example
//!
//! ```rust,no_run
//! use todo_sync_runtime::metrics::install_prometheus;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let handle = install_prometheus()?;
//! println!("{}", handle.render());
//! # Ok(())
//! # }
//! ```

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::time::Instant;
use thiserror::Error;
use todo_sync_core::{PersistenceError, RemoteFuture};

/// Counter of remote calls, labelled by operation and outcome.
pub const PERSISTENCE_CALLS: &str = "todo_sync_persistence_calls_total";

/// Histogram of remote call latency, labelled by operation.
pub const PERSISTENCE_DURATION: &str = "todo_sync_persistence_duration_seconds";

/// Errors from metrics setup.
#[derive(Error, Debug)]
pub enum MetricsError {
    /// Failed to build the exporter
    #[error("Failed to build metrics exporter: {0}")]
    Build(String),
    /// Failed to install the recorder
    #[error("Failed to install metrics exporter: {0}")]
    Install(String),
}

/// Remote operation being measured.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    /// `GET base`
    Fetch,
    /// `POST base`
    Create,
    /// `PATCH base/id`
    Update,
    /// `DELETE base/id`
    Delete,
}

impl Operation {
    /// Label value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fetch => "fetch",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

/// Register metric descriptions with the installed recorder.
pub fn describe() {
    describe_counter!(
        PERSISTENCE_CALLS,
        "Total number of calls made to the remote todo store"
    );
    describe_histogram!(
        PERSISTENCE_DURATION,
        "Time taken by calls to the remote todo store"
    );
}

/// Install a global Prometheus recorder and return its render handle.
///
/// # Errors
///
/// Returns [`MetricsError`] if the exporter cannot be built or a recorder is already
/// installed.
pub fn install_prometheus() -> Result<PrometheusHandle, MetricsError> {
    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Suffix("duration_seconds".to_string()),
            &[0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0],
        )
        .map_err(|e| MetricsError::Build(e.to_string()))?
        .install_recorder()
        .map_err(|e| MetricsError::Install(e.to_string()))?;

    describe();
    Ok(handle)
}

/// Await a remote call, recording its latency and outcome.
pub(crate) async fn observe<T>(
    op: Operation,
    url: &str,
    call: RemoteFuture<'_, T>,
) -> Result<T, PersistenceError> {
    let started = Instant::now();
    let result = call.await;
    let elapsed = started.elapsed();

    histogram!(PERSISTENCE_DURATION, "op" => op.as_str()).record(elapsed.as_secs_f64());

    match &result {
        Ok(_) => {
            counter!(PERSISTENCE_CALLS, "op" => op.as_str(), "outcome" => "ok").increment(1);
            tracing::debug!(op = op.as_str(), url, elapsed = ?elapsed, "remote call succeeded");
        }
        Err(error) => {
            counter!(PERSISTENCE_CALLS, "op" => op.as_str(), "outcome" => "error").increment(1);
            tracing::warn!(op = op.as_str(), url, error = %error, "remote call failed");
        }
    }

    result
}
