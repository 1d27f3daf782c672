//! Tracking refresh endpoint
//!
//! Called by the host platform when an order's tracking data changes
//! (fulfillment fields edited, a tracking note added or removed). Hands
//! the order to the active tracking provider's update path, which diffs
//! against what was previously mirrored and cancels or creates remote
//! shipments accordingly.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::json;

use crate::error::AppError;
use crate::sync::SyncContext;
use crate::tracking::active_provider;

pub fn tracking_refresh_routes() -> Router<Arc<SyncContext>> {
    Router::new().route("/:order_id/tracking/refresh", post(refresh_tracking))
}

#[tracing::instrument(skip(ctx), fields(order_id = order_id))]
async fn refresh_tracking(
    State(ctx): State<Arc<SyncContext>>,
    Path(order_id): Path<i64>,
) -> Result<Response, AppError> {
    if ctx.store.get_order(order_id).await?.is_none() {
        return Err(AppError::NotFound(format!("order {order_id} not found")));
    }

    let Some(provider) = active_provider(&ctx.providers, ctx.store.as_ref()).await? else {
        return Ok((
            StatusCode::OK,
            Json(json!({ "refreshed": false, "reason": "no active tracking integration" })),
        )
            .into_response());
    };

    provider.apply_update(&ctx, order_id).await?;

    Ok((StatusCode::OK, Json(json!({ "refreshed": true }))).into_response())
}
