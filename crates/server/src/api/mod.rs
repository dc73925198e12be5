pub mod audit;
pub mod handlers;
pub mod lookup;
pub mod middleware;
pub mod movies;
pub mod routes;
pub mod series;

pub use routes::create_router;

use darrlink_core::TitleQuery;
use serde::{Deserialize, Serialize};

/// Body of `POST /movies` and `POST /series`
#[derive(Debug, Deserialize)]
pub struct BulkRequest {
    #[serde(default)]
    pub items: Vec<TitleQuery>,
}

/// Error body of the reconciliation endpoints
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn invalid_request() -> Self {
        Self::new("Invalid request")
    }
}
