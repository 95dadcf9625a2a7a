//! REST server for todo-sync.
//!
//! Serves the remote persistence contract the sync engine talks to, plus the static
//! front-end:
//!
//! ```text
//! /api/todo        GET list · POST create · DELETE clear
//! /api/todo/:id    GET · PATCH · PUT · DELETE
//! /health          liveness and repository probe
//! /metrics         Prometheus exposition
//! /*               files from the static directory
//! ```
//!
//! # Example
//!
//! ```no_run
//! use todo_sync_web::{AppState, ServerConfig, build_router, serve};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = ServerConfig::from_env()?;
//! let router = build_router(AppState::default(), &config);
//! let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
//! serve(listener, router, async {
//!     let _ = tokio::signal::ctrl_c().await;
//! })
//! .await?;
//! # Ok(())
//! # }
//! ```

#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod repository;
pub mod router;
pub mod state;

pub use config::{ConfigError, ServerConfig};
pub use error::AppError;
pub use middleware::{REQUEST_ID_HEADER, RequestId, with_request_tracing};
pub use repository::{InMemoryTodoRepository, RepositoryError, TodoRepository};
pub use router::build_router;
pub use state::AppState;

use std::future::Future;
use tokio::net::TcpListener;

/// Result type alias for web handlers.
pub type WebResult<T> = Result<T, AppError>;

/// Serve `router` on `listener` until `shutdown` completes.
///
/// # Errors
///
/// Returns an error if the server fails while accepting connections.
pub async fn serve(
    listener: TcpListener,
    router: axum::Router,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!(%addr, "todo server listening");
    }
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
}
