//! Common test utilities for driving the router with mock services.
//!
//! The fixture wires real engines over the in-memory Radarr/Sonarr mocks
//! and a JSONL audit log in a temp dir, then sends requests in-process.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use darrlink_core::config::{AuditConfig, AuthConfig, LoggingConfig, ServerConfig};
use darrlink_core::testing::{MockMovieService, MockSeriesService};
use darrlink_core::{
    create_audit_system, create_authenticator, AuditBackend, AuditFilter, AuditRecord,
    AuditStore, AuthMethod, Config, DispatchMode, JsonlAuditStore, MovieReconciler,
    SeriesReconciler,
};
use darrlink_server::{create_router, AppState};

/// Re-export fixtures for test convenience
pub use darrlink_core::testing::fixtures;

/// Key expected by fixtures built with [`TestConfig::with_api_key`]
pub const PROXY_KEY: &str = "proxy-test-key";

/// In-process server over mock Radarr/Sonarr.
///
/// # Example
///
/// ```rust,ignore
/// let fixture = TestFixture::new().await;
/// fixture.radarr.add_matches("Heat", vec![fixtures::movie_match("Heat", 1995)]).await;
///
/// let response = fixture.post("/api/v1/movies", json!({"items": [{"title": "Heat"}]})).await;
/// assert_eq!(response.status, 200);
/// ```
pub struct TestFixture {
    pub router: Router,
    pub radarr: Arc<MockMovieService>,
    pub sonarr: Arc<MockSeriesService>,
    pub audit_store: Arc<dyn AuditStore>,
    /// Holds the audit log alive for the fixture's lifetime
    pub temp_dir: TempDir,
    api_key: Option<String>,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
    pub text: String,
}

/// Configuration for test fixture.
#[derive(Debug, Clone)]
pub struct TestConfig {
    pub radarr: bool,
    pub sonarr: bool,
    pub api_key: Option<String>,
    pub dispatch: DispatchMode,
    pub audit_enabled: bool,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            radarr: true,
            sonarr: true,
            api_key: None,
            dispatch: DispatchMode::Sequential,
            audit_enabled: true,
        }
    }
}

impl TestConfig {
    pub fn with_api_key() -> Self {
        Self {
            api_key: Some(PROXY_KEY.to_string()),
            ..Default::default()
        }
    }

    pub fn movies_only() -> Self {
        Self {
            sonarr: false,
            ..Default::default()
        }
    }

    pub fn series_only() -> Self {
        Self {
            radarr: false,
            ..Default::default()
        }
    }
}

impl TestFixture {
    pub async fn new() -> Self {
        Self::with_config(TestConfig::default()).await
    }

    pub async fn with_config(test_config: TestConfig) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let audit_path = temp_dir.path().join("audit.jsonl");

        let auth = match &test_config.api_key {
            Some(key) => AuthConfig {
                method: AuthMethod::ApiKey,
                api_key: Some(key.clone()),
            },
            None => AuthConfig {
                method: AuthMethod::None,
                api_key: None,
            },
        };

        let config = Config {
            auth: auth.clone(),
            server: ServerConfig {
                host: std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST),
                port: 0, // Not used for in-process testing
            },
            logging: LoggingConfig::default(),
            audit: AuditConfig {
                enabled: test_config.audit_enabled,
                backend: AuditBackend::Jsonl,
                path: Some(audit_path.clone()),
            },
            radarr: None,
            sonarr: None,
        };

        let audit_store: Arc<dyn AuditStore> = Arc::new(
            JsonlAuditStore::new(&audit_path).expect("Failed to create audit store"),
        );
        let (audit_handle, audit_writer) = create_audit_system(Arc::clone(&audit_store), 100);
        tokio::spawn(audit_writer.run());

        let radarr = Arc::new(MockMovieService::new());
        let sonarr = Arc::new(MockSeriesService::new());

        let authenticator = Arc::from(create_authenticator(&auth).expect("authenticator"));
        let mut state = AppState::new(config, authenticator, Arc::clone(&audit_store));

        if test_config.radarr {
            let mut engine =
                MovieReconciler::from_service(Arc::clone(&radarr), fixtures::movie_policy())
                    .with_dispatch(test_config.dispatch);
            if test_config.audit_enabled {
                engine = engine.with_audit(audit_handle.clone());
            }
            state = state.with_movies(engine);
        }

        if test_config.sonarr {
            let mut engine =
                SeriesReconciler::from_service(Arc::clone(&sonarr), fixtures::series_policy())
                    .with_dispatch(test_config.dispatch);
            if test_config.audit_enabled {
                engine = engine.with_audit(audit_handle.clone());
            }
            state = state.with_series(engine);
        }

        let router = create_router(Arc::new(state));

        Self {
            router,
            radarr,
            sonarr,
            audit_store,
            temp_dir,
            api_key: test_config.api_key,
        }
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None, true).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        let body = serde_json::to_string(&body).unwrap();
        self.request("POST", path, Some(&body), true).await
    }

    /// Send a POST request with raw string body (for testing malformed JSON).
    pub async fn post_raw(&self, path: &str, body: &str) -> TestResponse {
        self.request("POST", path, Some(body), true).await
    }

    /// Send a GET request without the proxy key, even if one is configured.
    pub async fn get_unauthenticated(&self, path: &str) -> TestResponse {
        self.request("GET", path, None, false).await
    }

    /// Poll the audit store until `min` records match, or give up after ~1s.
    pub async fn wait_for_audit(&self, filter: AuditFilter, min: usize) -> Vec<AuditRecord> {
        let mut records = Vec::new();
        for _ in 0..50 {
            records = self.audit_store.query(&filter).expect("audit query");
            if records.len() >= min {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        records
    }

    async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<&str>,
        authenticate: bool,
    ) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        if authenticate {
            if let Some(key) = &self.api_key {
                request_builder = request_builder.header("X-Api-Key", key);
            }
        }

        let body = match body {
            Some(raw) => {
                request_builder = request_builder.header("Content-Type", "application/json");
                Body::from(raw.to_string())
            }
            None => Body::empty(),
        };

        let request = request_builder.body(body).unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let text = String::from_utf8_lossy(&body_bytes).into_owned();
        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body, text }
    }
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status, $response.status, $response.text
        );
    };
}
