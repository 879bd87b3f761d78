use std::net::SocketAddr;

use anyhow::Context;
use dotenvy::dotenv;
use embryotech::embryotech_config::AppConfig;
use embryotech::embryotech_db::{init_db_pool, run_migrations};
use embryotech::logging::{init_tracing, shutdown_tracer};
use embryotech::metrics::{init_metrics, metrics_app};
use embryotech::router::init_router;
use embryotech::state::AppState;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    init_tracing()?;

    let config = AppConfig::try_from_env().context("invalid configuration")?;

    let pool = init_db_pool(&config.database).await?;
    run_migrations(&pool).await?;

    let state = AppState::from_pool(pool, &config);
    let mut app = init_router(state);

    if let Some(handle) = init_metrics()? {
        app = app.merge(metrics_app(handle));
        info!("Prometheus metrics exposed at /metrics");
    }

    let addr = config.server.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("🚀 Server running on http://{}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    shutdown_tracer().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        return;
    }
    info!("shutdown signal received");
}
