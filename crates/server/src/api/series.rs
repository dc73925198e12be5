//! Bulk series reconciliation.

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

/// Reconcile every requested series against Sonarr.
///
/// Items may use `seriesName`/`seriesYear` in place of `title`/`year`.
pub async fn add_series(
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
            debug!("Rejected series request body: {}", rejection);
            return (StatusCode::BAD_REQUEST, Json(MessageResponse::invalid_request()))
                .into_response();
        }
    };

    let Some(engine) = state.series() else {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(MessageResponse::new("Sonarr is not configured")),
        )
            .into_response();
    };

    info!(count = items.len(), "Received series request");
    Json(engine.bulk_add(&items).await).into_response()
}
