//! Shipguard Server - Main entry point

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use shipguard_common::logging::{init_logging, LogConfig};
use sqlx::postgres::PgPoolOptions;
use tokio::signal;
use tracing::info;

use shipguard_server::{
    api, config::Config, remote::ApiClient, store, sync::scheduler::SyncScheduler,
    sync::SyncContext, tracking,
};

#[tokio::main]
async fn main() -> Result<()> {
    let log_config = LogConfig::for_service("shipguard-server");
    init_logging(&log_config)?;

    info!("Starting Shipguard server");

    let config = Config::load()?;
    info!(
        "Configuration loaded - server will bind to {}:{}",
        config.server.host, config.server.port
    );

    let db_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .acquire_timeout(Duration::from_secs(config.database.connect_timeout_secs))
        .connect(&config.database.url)
        .await?;
    info!("Database connection pool established");

    // Pick the storage shape once; the engine never branches on it again.
    let order_store = store::open(db_pool).await?;

    let client = ApiClient::new(&config.remote)?;
    let ctx = Arc::new(SyncContext::new(
        order_store,
        client,
        tracking::default_providers(),
    ));

    let _scheduler_handle = if config.scheduler.enabled {
        Some(SyncScheduler::new(config.scheduler.clone(), ctx.clone()).start().await?)
    } else {
        info!("Scheduler disabled, periodic workers will not run");
        None
    };

    let app = api::app_router(ctx);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutdown signal received");
}
