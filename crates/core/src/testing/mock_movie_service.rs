//! Mock Radarr for testing.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::mock_state::{injected_failure, RecordedRequest, ServiceState};
use crate::arr::{
    AcquisitionClient, ArrError, ArrResponse, LookupClient, MovieMatch, MovieRegistration,
    QueueInspector, QueueRecord, TitleQuery,
};

/// In-memory stand-in for Radarr, playing all three client roles.
///
/// Provides controllable behavior for testing:
/// - Lookup results keyed by (case-insensitive) title
/// - Queue contents per movie id
/// - Status and body of create/search replies
/// - Transport failures per operation
///
/// # Example
///
/// ```rust,ignore
/// use darrlink_core::testing::{fixtures, MockMovieService};
///
/// let radarr = Arc::new(MockMovieService::new());
/// radarr.add_matches("Heat", vec![fixtures::movie_match("Heat", 1995)]).await;
///
/// let engine = MovieReconciler::from_service(radarr.clone(), fixtures::movie_policy());
/// engine.add("Heat", Some("1995")).await;
///
/// assert_eq!(radarr.create_count().await, 1);
/// ```
pub struct MockMovieService {
    state: ServiceState<MovieMatch, MovieRegistration>,
    queue: RwLock<HashMap<u32, Vec<QueueRecord>>>,
    fail_queue: RwLock<bool>,
}

impl Default for MockMovieService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockMovieService {
    /// Create a mock with no titles; creates and searches reply 201.
    pub fn new() -> Self {
        Self {
            state: ServiceState::new(),
            queue: RwLock::new(HashMap::new()),
            fail_queue: RwLock::new(false),
        }
    }

    /// Matches returned when looking up `name`.
    pub async fn add_matches(&self, name: &str, matches: Vec<MovieMatch>) {
        self.state.add_matches(name, matches).await;
    }

    /// Queue contents reported for a movie id.
    pub async fn set_queue(&self, movie_id: u32, records: Vec<QueueRecord>) {
        self.queue.write().await.insert(movie_id, records);
    }

    pub async fn set_create_response(&self, response: ArrResponse) {
        self.state.set_create_response(response).await;
    }

    pub async fn set_search_response(&self, response: ArrResponse) {
        self.state.set_search_response(response).await;
    }

    /// Lookups for `name` fail with a transport-level error.
    pub async fn fail_lookup(&self, name: &str) {
        self.state.fail_lookup(name).await;
    }

    pub async fn fail_queue(&self) {
        *self.fail_queue.write().await = true;
    }

    pub async fn fail_creates(&self) {
        self.state.fail_creates().await;
    }

    pub async fn fail_searches(&self) {
        self.state.fail_searches().await;
    }

    /// Every request received, in order.
    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests().await
    }

    /// Registrations that reached the mock (failed creates excluded).
    pub async fn created(&self) -> Vec<MovieRegistration> {
        self.state.created().await
    }

    pub async fn create_count(&self) -> usize {
        self.state
            .count(|r| matches!(r, RecordedRequest::Create { .. }))
            .await
    }

    pub async fn search_count(&self) -> usize {
        self.state
            .count(|r| matches!(r, RecordedRequest::TriggerSearch { .. }))
            .await
    }

    pub async fn queue_check_count(&self) -> usize {
        self.state
            .count(|r| matches!(r, RecordedRequest::QueueDetails { .. }))
            .await
    }
}

#[async_trait]
impl LookupClient<MovieMatch> for MockMovieService {
    async fn lookup(&self, query: &TitleQuery) -> Result<Vec<MovieMatch>, ArrError> {
        self.state.lookup(query).await
    }
}

#[async_trait]
impl QueueInspector for MockMovieService {
    async fn queue_details(&self, id: u32) -> Result<Vec<QueueRecord>, ArrError> {
        self.state
            .record(RecordedRequest::QueueDetails { id })
            .await;

        if *self.fail_queue.read().await {
            return Err(injected_failure());
        }
        Ok(self.queue.read().await.get(&id).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl AcquisitionClient<MovieRegistration> for MockMovieService {
    async fn create(&self, request: &MovieRegistration) -> Result<ArrResponse, ArrError> {
        self.state.create(request, &request.title).await
    }

    async fn trigger_search(&self, id: u32) -> Result<ArrResponse, ArrError> {
        self.state.trigger_search(id).await
    }
}
