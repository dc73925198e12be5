//! Radarr v3 client.

use async_trait::async_trait;
use serde_json::json;

use super::http::ArrHttp;
use super::{
    AcquisitionClient, ArrError, ArrResponse, LookupClient, MovieMatch, MovieRegistration,
    QueueInspector, QueueRecord, SystemStatus, TitleQuery,
};
use crate::config::RadarrConfig;

/// HTTP client for a single Radarr instance.
pub struct RadarrClient {
    http: ArrHttp,
}

impl RadarrClient {
    pub fn new(config: &RadarrConfig) -> Result<Self, ArrError> {
        Ok(Self {
            http: ArrHttp::new("radarr", &config.url, &config.api_key, config.timeout_secs)?,
        })
    }

    pub fn base_url(&self) -> &str {
        self.http.base_url()
    }

    /// Connectivity and credential check.
    pub async fn system_status(&self) -> Result<SystemStatus, ArrError> {
        self.http.system_status().await
    }
}

#[async_trait]
impl LookupClient<MovieMatch> for RadarrClient {
    async fn lookup(&self, query: &TitleQuery) -> Result<Vec<MovieMatch>, ArrError> {
        let path = format!(
            "movie/lookup?term={}",
            urlencoding::encode(&query.search_term())
        );
        self.http.get_json(&path).await
    }
}

#[async_trait]
impl QueueInspector for RadarrClient {
    async fn queue_details(&self, id: u32) -> Result<Vec<QueueRecord>, ArrError> {
        self.http
            .get_json(&format!("queue/details?movieId={}", id))
            .await
    }
}

#[async_trait]
impl AcquisitionClient<MovieRegistration> for RadarrClient {
    async fn create(&self, request: &MovieRegistration) -> Result<ArrResponse, ArrError> {
        self.http.post_json("movie", request).await
    }

    async fn trigger_search(&self, id: u32) -> Result<ArrResponse, ArrError> {
        let command = json!({
            "name": "MoviesSearch",
            "movieIds": [id],
        });
        self.http.post_json("command", &command).await
    }
}
