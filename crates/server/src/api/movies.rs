//! Bulk movie reconciliation.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tracing::{debug, info};

use super::{BulkRequest, MessageResponse};
use crate::state::AppState;

/// Reconcile every requested movie against Radarr.
///
/// Answers 200 with one result per item, in request order, even when
/// individual items fail.
pub async fn add_movies(
    State(state): State<Arc<AppState>>,
    body: Result<Json<BulkRequest>, JsonRejection>,
) -> Response {
    let items = match body {
        Ok(Json(request)) if !request.items.is_empty() => request.items,
        Ok(_) => {
            return (StatusCode::BAD_REQUEST, Json(MessageResponse::invalid_request()))
                .into_response();
        }
        Err(rejection) => {
            debug!("Rejected movie request body: {}", rejection);
            return (StatusCode::BAD_REQUEST, Json(MessageResponse::invalid_request()))
                .into_response();
        }
    };

    let Some(engine) = state.movies() else {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(MessageResponse::new("Radarr is not configured")),
        )
            .into_response();
    };

    info!(count = items.len(), "Received movie request");
    let results = engine.bulk_add(&items).await;
    Json(results).into_response()
}
