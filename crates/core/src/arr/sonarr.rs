//! Sonarr v3 client.

use async_trait::async_trait;
use serde_json::json;

use super::http::ArrHttp;
use super::{
    AcquisitionClient, ArrError, ArrResponse, LookupClient, SeriesMatch, SeriesRegistration,
    SystemStatus, TitleQuery,
};
use crate::config::SonarrConfig;

/// HTTP client for a single Sonarr instance.
pub struct SonarrClient {
    http: ArrHttp,
}

impl SonarrClient {
    pub fn new(config: &SonarrConfig) -> Result<Self, ArrError> {
        Ok(Self {
            http: ArrHttp::new("sonarr", &config.url, &config.api_key, config.timeout_secs)?,
        })
    }

    pub fn base_url(&self) -> &str {
        self.http.base_url()
    }

    pub async fn system_status(&self) -> Result<SystemStatus, ArrError> {
        self.http.system_status().await
    }
}

#[async_trait]
impl LookupClient<SeriesMatch> for SonarrClient {
    async fn lookup(&self, query: &TitleQuery) -> Result<Vec<SeriesMatch>, ArrError> {
        let path = format!(
            "series/lookup?term={}",
            urlencoding::encode(&query.search_term())
        );
        self.http.get_json(&path).await
    }
}

#[async_trait]
impl AcquisitionClient<SeriesRegistration> for SonarrClient {
    async fn create(&self, request: &SeriesRegistration) -> Result<ArrResponse, ArrError> {
        self.http.post_json("series", request).await
    }

    /// Sends a `SeriesSearch` command for a tracked series.
    async fn trigger_search(&self, id: u32) -> Result<ArrResponse, ArrError> {
        let command = json!({
            "name": "SeriesSearch",
            "seriesId": id,
        });
        self.http.post_json("command", &command).await
    }
}
