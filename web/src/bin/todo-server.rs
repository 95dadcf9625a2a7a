//! Todo REST server.
//!
//! Run with: `cargo run --bin todo-server`
//!
//! Configuration comes from the environment (see `ServerConfig`); a `.env` file in
//! the working directory is loaded first.

use std::sync::Arc;
use todo_sync_web::{AppState, InMemoryTodoRepository, ServerConfig, build_router, serve};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "todo_server=info,todo_sync_web=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let config = ServerConfig::from_env()?;
    let metrics = todo_sync_web::metrics::install_prometheus()?;

    let state = AppState::new(Arc::new(InMemoryTodoRepository::new())).with_metrics(metrics);
    let router = build_router(state, &config);

    info!(
        api_base = %config.api_base,
        static_dir = %config.static_dir.display(),
        "starting todo server"
    );
    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;

    serve(listener, router, async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            tracing::error!(%error, "unable to listen for shutdown signal");
        }
        info!("shutdown signal received");
    })
    .await?;

    Ok(())
}
