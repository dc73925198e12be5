//! State shared by the movie and series mocks.

use std::collections::{HashMap, HashSet};

use serde_json::json;
use tokio::sync::RwLock;

use crate::arr::{ArrError, ArrResponse, TitleQuery};

/// A request the mock received, for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedRequest {
    Lookup { term: String },
    QueueDetails { id: u32 },
    Create { title: String },
    TriggerSearch { id: u32 },
}

pub(super) fn injected_failure() -> ArrError {
    ArrError::Api {
        status: 503,
        message: "mock failure".to_string(),
    }
}

fn key(name: &str) -> String {
    name.trim().to_lowercase()
}

pub(super) struct ServiceState<M, R> {
    matches: RwLock<HashMap<String, Vec<M>>>,
    failing_lookups: RwLock<HashSet<String>>,
    create_response: RwLock<ArrResponse>,
    search_response: RwLock<ArrResponse>,
    fail_creates: RwLock<bool>,
    fail_searches: RwLock<bool>,
    created: RwLock<Vec<R>>,
    requests: RwLock<Vec<RecordedRequest>>,
}

impl<M: Clone, R: Clone> ServiceState<M, R> {
    pub(super) fn new() -> Self {
        Self {
            matches: RwLock::new(HashMap::new()),
            failing_lookups: RwLock::new(HashSet::new()),
            create_response: RwLock::new(ArrResponse::new(201, json!({}))),
            search_response: RwLock::new(ArrResponse::new(201, json!({}))),
            fail_creates: RwLock::new(false),
            fail_searches: RwLock::new(false),
            created: RwLock::new(Vec::new()),
            requests: RwLock::new(Vec::new()),
        }
    }

    pub(super) async fn add_matches(&self, name: &str, matches: Vec<M>) {
        self.matches.write().await.insert(key(name), matches);
    }

    pub(super) async fn fail_lookup(&self, name: &str) {
        self.failing_lookups.write().await.insert(key(name));
    }

    pub(super) async fn set_create_response(&self, response: ArrResponse) {
        *self.create_response.write().await = response;
    }

    pub(super) async fn set_search_response(&self, response: ArrResponse) {
        *self.search_response.write().await = response;
    }

    pub(super) async fn fail_creates(&self) {
        *self.fail_creates.write().await = true;
    }

    pub(super) async fn fail_searches(&self) {
        *self.fail_searches.write().await = true;
    }

    pub(super) async fn record(&self, request: RecordedRequest) {
        self.requests.write().await.push(request);
    }

    pub(super) async fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.read().await.clone()
    }

    pub(super) async fn created(&self) -> Vec<R> {
        self.created.read().await.clone()
    }

    pub(super) async fn count(&self, pred: impl Fn(&RecordedRequest) -> bool) -> usize {
        self.requests.read().await.iter().filter(|r| pred(*r)).count()
    }

    pub(super) async fn lookup(&self, query: &TitleQuery) -> Result<Vec<M>, ArrError> {
        self.record(RecordedRequest::Lookup {
            term: query.search_term(),
        })
        .await;

        if self.failing_lookups.read().await.contains(&key(&query.name)) {
            return Err(injected_failure());
        }
        Ok(self
            .matches
            .read()
            .await
            .get(&key(&query.name))
            .cloned()
            .unwrap_or_default())
    }

    pub(super) async fn create(&self, request: &R, title: &str) -> Result<ArrResponse, ArrError> {
        self.record(RecordedRequest::Create {
            title: title.to_string(),
        })
        .await;

        if *self.fail_creates.read().await {
            return Err(injected_failure());
        }
        self.created.write().await.push(request.clone());
        Ok(self.create_response.read().await.clone())
    }

    pub(super) async fn trigger_search(&self, id: u32) -> Result<ArrResponse, ArrError> {
        self.record(RecordedRequest::TriggerSearch { id }).await;

        if *self.fail_searches.read().await {
            return Err(injected_failure());
        }
        Ok(self.search_response.read().await.clone())
    }
}
