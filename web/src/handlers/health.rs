//! Health and metrics endpoints.

use crate::state::AppState;
use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;

/// Body of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthReport {
    /// `ok` or `degraded`
    pub status: &'static str,
    /// Server version
    pub version: &'static str,
    /// Stored todos, when the repository answered
    pub todos: Option<usize>,
}

/// Liveness plus a repository probe.
///
/// # Endpoint
///
/// ```text
/// GET /health
/// ```
///
/// # Status Codes
///
/// - 200 OK: the repository answered
/// - 503 Service Unavailable: the repository failed
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthReport>) {
    let version = env!("CARGO_PKG_VERSION");
    match state.repository.count().await {
        Ok(todos) => (
            StatusCode::OK,
            Json(HealthReport {
                status: "ok",
                version,
                todos: Some(todos),
            }),
        ),
        Err(error) => {
            tracing::warn!(%error, "health probe failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthReport {
                    status: "degraded",
                    version,
                    todos: None,
                }),
            )
        }
    }
}

/// Prometheus exposition, or 404 when no recorder is installed.
///
/// ```text
/// GET /metrics
/// ```
#[allow(clippy::unused_async)]
pub async fn render_metrics(State(state): State<AppState>) -> (StatusCode, String) {
    match &state.metrics {
        Some(handle) => (StatusCode::OK, handle.render()),
        None => (StatusCode::NOT_FOUND, String::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_reports_todo_count() {
        let (status, Json(report)) = health_check(State(AppState::default())).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(report.status, "ok");
        assert_eq!(report.todos, Some(0));
    }

    #[tokio::test]
    async fn test_metrics_without_recorder_is_not_found() {
        let (status, body) = render_metrics(State(AppState::default())).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.is_empty());
    }
}
