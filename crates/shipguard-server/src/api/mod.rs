//! HTTP API assembly

use std::sync::Arc;

use axum::{routing::get, Json, Router};
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::features::{recovery::recovery_routes, tracking_refresh::tracking_refresh_routes};
use crate::sync::SyncContext;

/// Build the full application router over the shared sync context.
pub fn app_router(ctx: Arc<SyncContext>) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api/v1/recovery", recovery_routes())
        .nest("/api/v1/orders", tracking_refresh_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}
