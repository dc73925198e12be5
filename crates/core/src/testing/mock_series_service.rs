//! Mock Sonarr for testing.

use async_trait::async_trait;

use super::mock_state::{RecordedRequest, ServiceState};
use crate::arr::{
    AcquisitionClient, ArrError, ArrResponse, LookupClient, SeriesMatch, SeriesRegistration,
    TitleQuery,
};

/// In-memory stand-in for Sonarr.
///
/// Same controls as [`MockMovieService`](super::MockMovieService), minus the queue.
pub struct MockSeriesService {
    state: ServiceState<SeriesMatch, SeriesRegistration>,
}

impl Default for MockSeriesService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSeriesService {
    pub fn new() -> Self {
        Self {
            state: ServiceState::new(),
        }
    }

    pub async fn add_matches(&self, name: &str, matches: Vec<SeriesMatch>) {
        self.state.add_matches(name, matches).await;
    }

    pub async fn set_create_response(&self, response: ArrResponse) {
        self.state.set_create_response(response).await;
    }

    pub async fn set_search_response(&self, response: ArrResponse) {
        self.state.set_search_response(response).await;
    }

    pub async fn fail_lookup(&self, name: &str) {
        self.state.fail_lookup(name).await;
    }

    pub async fn fail_creates(&self) {
        self.state.fail_creates().await;
    }

    pub async fn fail_searches(&self) {
        self.state.fail_searches().await;
    }

    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests().await
    }

    pub async fn created(&self) -> Vec<SeriesRegistration> {
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
}

#[async_trait]
impl LookupClient<SeriesMatch> for MockSeriesService {
    async fn lookup(&self, query: &TitleQuery) -> Result<Vec<SeriesMatch>, ArrError> {
        self.state.lookup(query).await
    }
}

#[async_trait]
impl AcquisitionClient<SeriesRegistration> for MockSeriesService {
    async fn create(&self, request: &SeriesRegistration) -> Result<ArrResponse, ArrError> {
        self.state.create(request, &request.title).await
    }

    async fn trigger_search(&self, id: u32) -> Result<ArrResponse, ArrError> {
        self.state.trigger_search(id).await
    }
}
