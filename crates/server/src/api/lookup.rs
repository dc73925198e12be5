//! Catalog lookup across both target services.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::warn;

use darrlink_core::LookupSummary;

use super::MessageResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LookupParams {
    pub title: Option<String>,
    pub year: Option<String>,
}

/// Search Sonarr and Radarr at once and return trimmed summaries.
///
/// A service that is not configured contributes an empty list.
pub async fn lookup(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LookupParams>,
) -> Response {
    let Some(title) = params.title.filter(|t| !t.trim().is_empty()) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(MessageResponse::new("title is required")),
        )
            .into_response();
    };
    let year = params.year.as_deref();

    let shows = async {
        match state.series() {
            Some(engine) => engine.lookup(&title, year).await,
            None => Ok(Vec::new()),
        }
    };
    let movies = async {
        match state.movies() {
            Some(engine) => engine.lookup(&title, year).await,
            None => Ok(Vec::new()),
        }
    };

    match futures::try_join!(shows, movies) {
        Ok((shows, movies)) => Json(LookupSummary::new(&shows, &movies)).into_response(),
        Err(e) => {
            warn!(title = %title, "Lookup failed: {}", e);
            (StatusCode::BAD_GATEWAY, Json(MessageResponse::new(e.to_string()))).into_response()
        }
    }
}
