//! Recovery HTTP routes

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::json;

use super::commands::{self, InitiateRecoveryCommand, ProcessBatchCommand, RecoveryError};
use crate::sync::SyncContext;

pub fn recovery_routes() -> Router<Arc<SyncContext>> {
    Router::new()
        .route("/", post(initiate_recovery))
        .route("/batches", post(process_batch))
}

#[tracing::instrument(skip(ctx, command))]
async fn initiate_recovery(
    State(ctx): State<Arc<SyncContext>>,
    Json(command): Json<InitiateRecoveryCommand>,
) -> Result<Response, RecoveryError> {
    let response = commands::initiate::handle(ctx.store.as_ref(), command).await?;
    Ok((StatusCode::OK, Json(response)).into_response())
}

#[tracing::instrument(skip(ctx, command))]
async fn process_batch(
    State(ctx): State<Arc<SyncContext>>,
    Json(command): Json<ProcessBatchCommand>,
) -> Result<Response, RecoveryError> {
    let response = commands::process_batch::handle(&ctx, command).await?;
    Ok((StatusCode::OK, Json(response)).into_response())
}

impl IntoResponse for RecoveryError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            RecoveryError::Validation(ref message) => (StatusCode::BAD_REQUEST, message.clone()),
            RecoveryError::NoMoreOrders => {
                (StatusCode::NOT_FOUND, "No more orders to process".to_string())
            }
            RecoveryError::Sync(ref e) => {
                tracing::error!("recovery error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
        };

        let body = Json(json!({
            "error": {
                "message": message,
                "status": status.as_u16(),
            }
        }));

        (status, body).into_response()
    }
}
