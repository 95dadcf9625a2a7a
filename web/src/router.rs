//! Route table.

use crate::config::ServerConfig;
use crate::handlers;
use crate::middleware::with_request_tracing;
use crate::state::AppState;
use axum::{Router, routing::get};
use tower_http::{cors::CorsLayer, services::ServeDir};

/// Build the application router.
///
/// The todo API is mounted at `config.api_base`; `/health` and `/metrics` sit at the
/// root and every other path is served from `config.static_dir`.
#[must_use]
pub fn build_router(state: AppState, config: &ServerConfig) -> Router {
    let collection = config.api_base.as_str();
    let member = format!("{collection}/:id");

    let router = Router::new()
        .route(
            collection,
            get(handlers::list_todos)
                .post(handlers::create_todo)
                .delete(handlers::clear_todos),
        )
        .route(
            &member,
            get(handlers::get_todo)
                .patch(handlers::update_todo)
                .put(handlers::replace_todo)
                .delete(handlers::delete_todo),
        )
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::render_metrics))
        .fallback_service(ServeDir::new(&config.static_dir))
        .with_state(state)
        .layer(CorsLayer::permissive());

    with_request_tracing(router)
}
