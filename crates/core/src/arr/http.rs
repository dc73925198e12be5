//! Shared HTTP plumbing for the v3 APIs of Radarr and Sonarr.

use std::time::Duration;

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use super::{ArrError, ArrResponse, SystemStatus};
use crate::config::normalize_api_url;

/// Authenticated client bound to one service's `/api/v3` base.
pub(crate) struct ArrHttp {
    client: Client,
    base_url: String,
    api_key: String,
    service: &'static str,
}

impl ArrHttp {
    pub(crate) fn new(
        service: &'static str,
        url: &str,
        api_key: &str,
        timeout_secs: u32,
    ) -> Result<Self, ArrError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs as u64))
            .build()?;

        Ok(Self {
            client,
            base_url: normalize_api_url(url),
            api_key: api_key.to_string(),
            service,
        })
    }

    pub(crate) fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// GET a JSON document. Any non-2xx status is an error.
    pub(crate) async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ArrError> {
        let url = self.url(path);
        debug!("{} GET {}", self.service, url);

        let response = self
            .client
            .get(&url)
            .header("X-Api-Key", &self.api_key)
            .send()
            .await?;

        let response = self.check_status(response).await?;
        response
            .json()
            .await
            .map_err(|e| ArrError::Parse(format!("{} response from {}: {}", self.service, path, e)))
    }

    /// POST a JSON body. Every HTTP status is returned to the caller,
    /// only transport failures are errors.
    pub(crate) async fn post_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<ArrResponse, ArrError> {
        let url = self.url(path);
        debug!("{} POST {}", self.service, url);

        let response = self
            .client
            .post(&url)
            .header("X-Api-Key", &self.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status().as_u16();
        let text = response.text().await?;
        let body = if text.trim().is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(serde_json::Value::String(text))
        };

        Ok(ArrResponse::new(status, body))
    }

    /// Fetch `system/status`, the cheapest authenticated call.
    pub(crate) async fn system_status(&self) -> Result<SystemStatus, ArrError> {
        self.get_json("system/status").await
    }

    async fn check_status(&self, response: Response) -> Result<Response, ArrError> {
        let status = response.status();
        if status == 401 {
            return Err(ArrError::Unauthorized(self.service.to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ArrError::Api {
                status: status.as_u16(),
                message: body,
            });
        }
        Ok(response)
    }
}
