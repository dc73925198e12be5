//! Movie-domain reconciliation against Radarr.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, info, warn};

use super::{
    audited_lookup, conclude, record_api_call, BulkDispatcher, MediaKind, Outcome,
    ReconciliationResult, Reconciler,
};
use crate::arr::{
    AcquisitionClient, ArrError, CatalogMatch, LookupClient, MovieMatch, MoviePolicy,
    MovieRegistration, QueueInspector, QueueStatus, TitleQuery,
};
use crate::audit::AuditHandle;
use crate::config::DispatchMode;
use crate::metrics;

const SERVICE: &str = "radarr";

/// Decides, per requested movie, whether to add it, skip it, or search again.
///
/// Only the movie domain inspects the download queue and can fire a
/// one-shot search for a tracked title that has no file yet.
pub struct MovieReconciler {
    lookup: Arc<dyn LookupClient<MovieMatch>>,
    queue: Arc<dyn QueueInspector>,
    acquisition: Arc<dyn AcquisitionClient<MovieRegistration>>,
    policy: MoviePolicy,
    dispatcher: BulkDispatcher,
    audit: Option<AuditHandle>,
}

impl MovieReconciler {
    pub fn new(
        lookup: Arc<dyn LookupClient<MovieMatch>>,
        queue: Arc<dyn QueueInspector>,
        acquisition: Arc<dyn AcquisitionClient<MovieRegistration>>,
        policy: MoviePolicy,
    ) -> Self {
        Self {
            lookup,
            queue,
            acquisition,
            policy,
            dispatcher: BulkDispatcher::default(),
            audit: None,
        }
    }

    /// Build from one service that plays all three roles (the Radarr client or a mock).
    pub fn from_service<S>(service: Arc<S>, policy: MoviePolicy) -> Self
    where
        S: LookupClient<MovieMatch>
            + QueueInspector
            + AcquisitionClient<MovieRegistration>
            + 'static,
    {
        Self::new(service.clone(), service.clone(), service, policy)
    }

    pub fn with_dispatch(mut self, mode: DispatchMode) -> Self {
        self.dispatcher = BulkDispatcher::new(mode);
        self
    }

    pub fn with_audit(mut self, audit: AuditHandle) -> Self {
        self.audit = Some(audit);
        self
    }

    pub fn policy(&self) -> &MoviePolicy {
        &self.policy
    }

    pub fn dispatch_mode(&self) -> DispatchMode {
        self.dispatcher.mode()
    }

    /// Catalog lookup. Unlike [`add`](Self::add), failures are returned.
    pub async fn lookup(&self, name: &str, year: Option<&str>) -> Result<Vec<MovieMatch>, ArrError> {
        audited_lookup(
            self.lookup.as_ref(),
            SERVICE,
            &TitleQuery::new(name, year),
            self.audit.as_ref(),
        )
        .await
    }

    /// Queue state of a tracked movie. Fails open: errors read as not queued.
    pub async fn check_queue_status(&self, movie_id: u32) -> QueueStatus {
        match self.queue.queue_details(movie_id).await {
            Ok(records) => {
                metrics::record_arr_request(SERVICE, "queue", Some(200));
                QueueStatus::from_records(&records)
            }
            Err(e) => {
                warn!(
                    "Queue check failed for movie {}, assuming not queued: {}",
                    movie_id, e
                );
                metrics::record_arr_request(SERVICE, "queue", e.status());
                metrics::QUEUE_CHECK_FAILURES
                    .with_label_values(&[SERVICE])
                    .inc();
                if let Some(audit) = &self.audit {
                    audit.error(
                        SERVICE,
                        format!("Error checking queue status for movie ID: {}", movie_id),
                        &e,
                    );
                }
                QueueStatus::NotQueued
            }
        }
    }

    /// Reconcile one title. Never fails; errors become
    /// "Unexpected error occurred".
    pub async fn add(&self, name: &str, year: Option<&str>) -> ReconciliationResult {
        let query = TitleQuery::new(name, year);
        let started = Instant::now();

        info!("Attempting to add movie: {}", query.search_term());
        if let Some(audit) = &self.audit {
            audit.log(
                "info",
                SERVICE,
                json!({ "message": format!("Attempting to add movie: {}", query.search_term()) }),
                true,
            );
        }

        let reconciled = self.reconcile(&query).await;
        conclude(MediaKind::Movie, self.audit.as_ref(), &query, reconciled, started)
    }

    /// Reconcile every title; one result per input, in input order.
    pub async fn bulk_add(&self, items: &[TitleQuery]) -> Vec<ReconciliationResult> {
        self.dispatcher
            .dispatch(self, items, self.audit.as_ref())
            .await
    }

    async fn reconcile(
        &self,
        query: &TitleQuery,
    ) -> Result<(Outcome, ReconciliationResult), ArrError> {
        let matches =
            audited_lookup(self.lookup.as_ref(), SERVICE, query, self.audit.as_ref()).await?;

        // First match wins.
        let Some(candidate) = matches.into_iter().next() else {
            info!("No results found for movie: {}", query.search_term());
            return Ok((
                Outcome::NoResults,
                ReconciliationResult::not_found(MediaKind::Movie, query),
            ));
        };

        let registration = MovieRegistration::from_match(&candidate, &self.policy);
        debug!("Movie registration: {:?}", registration);

        let (outcome, errors) = match candidate.existing_id() {
            Some(movie_id) => self.reconcile_existing(&candidate, movie_id).await?,
            None => self.register(&registration).await?,
        };

        let result = ReconciliationResult::for_match(MediaKind::Movie, outcome, &candidate);
        Ok(match errors {
            Some(errors) => (outcome, result.with_errors(errors)),
            None => (outcome, result),
        })
    }

    async fn reconcile_existing(
        &self,
        candidate: &MovieMatch,
        movie_id: u32,
    ) -> Result<(Outcome, Option<serde_json::Value>), ArrError> {
        match self.check_queue_status(movie_id).await {
            QueueStatus::Downloading => return Ok((Outcome::Downloading, None)),
            QueueStatus::Importing => return Ok((Outcome::Importing, None)),
            QueueStatus::NotQueued => {}
        }

        let outcome = if !candidate.is_available {
            Outcome::NotReleased
        } else if candidate.file_present() {
            Outcome::AlreadyExists
        } else if self.policy.force_search_on_existing {
            self.force_search(candidate, movie_id).await?
        } else {
            Outcome::ExistsWithoutFile
        };

        Ok((outcome, None))
    }

    /// Fire exactly one search command; the result is never polled.
    async fn force_search(&self, candidate: &MovieMatch, movie_id: u32) -> Result<Outcome, ArrError> {
        info!(
            "Triggering search for existing movie {} ({})",
            candidate.title, movie_id
        );

        let response = self.acquisition.trigger_search(movie_id).await;
        record_api_call(
            self.audit.as_ref(),
            SERVICE,
            "movie-search",
            &candidate.title,
            &response,
        );
        let response = response?;

        if response.is_created() {
            return Ok(Outcome::SearchTriggered);
        }

        warn!(
            "Radarr rejected search for {} with status {}",
            candidate.title, response.status
        );
        if let Some(audit) = &self.audit {
            audit.error(
                SERVICE,
                format!("Search command rejected for movie: {}", candidate.title),
                &response.body,
            );
        }
        Ok(Outcome::SearchRejected)
    }

    async fn register(
        &self,
        registration: &MovieRegistration,
    ) -> Result<(Outcome, Option<serde_json::Value>), ArrError> {
        info!(
            "Sending movie to Radarr: {} -> {}",
            registration.title, registration.path
        );

        let response = self.acquisition.create(registration).await;
        record_api_call(
            self.audit.as_ref(),
            SERVICE,
            "add-movie",
            &registration.title,
            &response,
        );
        let response = response?;

        if response.is_created() {
            Ok((Outcome::Added, None))
        } else {
            warn!(
                "Radarr rejected {} with status {}",
                registration.title, response.status
            );
            Ok((Outcome::AddRejected, Some(response.body)))
        }
    }
}

#[async_trait]
impl Reconciler for MovieReconciler {
    fn kind(&self) -> MediaKind {
        MediaKind::Movie
    }

    async fn add(&self, name: &str, year: Option<&str>) -> ReconciliationResult {
        MovieReconciler::add(self, name, year).await
    }
}
