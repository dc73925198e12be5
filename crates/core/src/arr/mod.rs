//! Clients for the Radarr and Sonarr v3 APIs.
//!
//! The reconciliation engines only see the role traits defined here, so
//! the real clients and the in-memory mocks are interchangeable.

mod http;
mod radarr;
mod registration;
mod sonarr;
mod summary;
mod types;

pub use radarr::RadarrClient;
pub use registration::*;
pub use sonarr::SonarrClient;
pub use summary::*;
pub use types::*;

use async_trait::async_trait;
use thiserror::Error;

/// Errors from talking to a target service.
#[derive(Debug, Error)]
pub enum ArrError {
    /// Transport failure (connection refused, timeout, TLS).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The service rejected the API key.
    #[error("Unauthorized: check the {0} API key")]
    Unauthorized(String),

    /// Non-2xx reply on a read endpoint.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    Parse(String),
}

impl ArrError {
    /// HTTP status carried by the error, if the service answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            Self::Unauthorized(_) => Some(401),
            Self::Api { status, .. } => Some(*status),
            Self::Parse(_) => None,
        }
    }
}

/// Catalog search: resolves a title query to candidate matches.
#[async_trait]
pub trait LookupClient<M: Send>: Send + Sync {
    async fn lookup(&self, query: &TitleQuery) -> Result<Vec<M>, ArrError>;
}

/// Download queue inspection (movie domain only).
#[async_trait]
pub trait QueueInspector: Send + Sync {
    /// Queue entries for a tracked title, most relevant first.
    async fn queue_details(&self, id: u32) -> Result<Vec<QueueRecord>, ArrError>;
}

/// Mutating calls: registering a title and triggering a search for it.
///
/// Both return the raw status and body so the caller can classify them.
#[async_trait]
pub trait AcquisitionClient<R: Sync>: Send + Sync {
    async fn create(&self, request: &R) -> Result<ArrResponse, ArrError>;

    async fn trigger_search(&self, id: u32) -> Result<ArrResponse, ArrError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status() {
        assert_eq!(ArrError::Unauthorized("radarr".into()).status(), Some(401));
        assert_eq!(
            ArrError::Api {
                status: 503,
                message: "down".into()
            }
            .status(),
            Some(503)
        );
        assert_eq!(ArrError::Parse("bad".into()).status(), None);
    }

    #[test]
    fn test_error_display() {
        let err = ArrError::Unauthorized("sonarr".into());
        assert_eq!(err.to_string(), "Unauthorized: check the sonarr API key");
    }
}
