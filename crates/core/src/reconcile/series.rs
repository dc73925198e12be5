//! Series-domain reconciliation against Sonarr.

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
    AcquisitionClient, ArrError, CatalogMatch, LookupClient, SeriesMatch, SeriesPolicy,
    SeriesRegistration, TitleQuery,
};
use crate::audit::AuditHandle;
use crate::config::DispatchMode;

const SERVICE: &str = "sonarr";

/// Adds series that Sonarr does not track yet.
///
/// A tracked series is always reported as existing: there is no queue
/// inspection and no forced search in this domain.
pub struct SeriesReconciler {
    lookup: Arc<dyn LookupClient<SeriesMatch>>,
    acquisition: Arc<dyn AcquisitionClient<SeriesRegistration>>,
    policy: SeriesPolicy,
    dispatcher: BulkDispatcher,
    audit: Option<AuditHandle>,
}

impl SeriesReconciler {
    pub fn new(
        lookup: Arc<dyn LookupClient<SeriesMatch>>,
        acquisition: Arc<dyn AcquisitionClient<SeriesRegistration>>,
        policy: SeriesPolicy,
    ) -> Self {
        Self {
            lookup,
            acquisition,
            policy,
            dispatcher: BulkDispatcher::default(),
            audit: None,
        }
    }

    pub fn from_service<S>(service: Arc<S>, policy: SeriesPolicy) -> Self
    where
        S: LookupClient<SeriesMatch> + AcquisitionClient<SeriesRegistration> + 'static,
    {
        Self::new(service.clone(), service, policy)
    }

    pub fn with_dispatch(mut self, mode: DispatchMode) -> Self {
        self.dispatcher = BulkDispatcher::new(mode);
        self
    }

    pub fn with_audit(mut self, audit: AuditHandle) -> Self {
        self.audit = Some(audit);
        self
    }

    pub fn policy(&self) -> &SeriesPolicy {
        &self.policy
    }

    pub fn dispatch_mode(&self) -> DispatchMode {
        self.dispatcher.mode()
    }

    pub async fn lookup(
        &self,
        name: &str,
        year: Option<&str>,
    ) -> Result<Vec<SeriesMatch>, ArrError> {
        audited_lookup(
            self.lookup.as_ref(),
            SERVICE,
            &TitleQuery::new(name, year),
            self.audit.as_ref(),
        )
        .await
    }

    pub async fn add(&self, name: &str, year: Option<&str>) -> ReconciliationResult {
        let query = TitleQuery::new(name, year);
        let started = Instant::now();

        info!("Attempting to add series: {}", query.search_term());
        if let Some(audit) = &self.audit {
            audit.log(
                "info",
                SERVICE,
                json!({ "message": format!("Attempting to add series: {}", query.search_term()) }),
                true,
            );
        }

        let reconciled = self.reconcile(&query).await;
        conclude(MediaKind::Series, self.audit.as_ref(), &query, reconciled, started)
    }

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

        let Some(candidate) = matches.into_iter().next() else {
            info!("No results found for series: {}", query.search_term());
            return Ok((
                Outcome::NoResults,
                ReconciliationResult::not_found(MediaKind::Series, query),
            ));
        };

        let registration = SeriesRegistration::from_match(&candidate, &self.policy);
        debug!("Series registration: {:?}", registration);

        if candidate.existing_id().is_some() {
            return Ok((
                Outcome::AlreadyExists,
                ReconciliationResult::for_match(MediaKind::Series, Outcome::AlreadyExists, &candidate),
            ));
        }

        info!(
            "Sending series to Sonarr: {} -> {}",
            registration.title, registration.path
        );
        let response = self.acquisition.create(&registration).await;
        record_api_call(
            self.audit.as_ref(),
            SERVICE,
            "add-series",
            &registration.title,
            &response,
        );
        let response = response?;

        if response.is_created() {
            return Ok((
                Outcome::Added,
                ReconciliationResult::for_match(MediaKind::Series, Outcome::Added, &candidate),
            ));
        }

        warn!(
            "Sonarr rejected {} with status {}",
            registration.title, response.status
        );
        Ok((
            Outcome::AddRejected,
            ReconciliationResult::for_match(MediaKind::Series, Outcome::AddRejected, &candidate)
                .with_errors(response.body),
        ))
    }
}

#[async_trait]
impl Reconciler for SeriesReconciler {
    fn kind(&self) -> MediaKind {
        MediaKind::Series
    }

    async fn add(&self, name: &str, year: Option<&str>) -> ReconciliationResult {
        SeriesReconciler::add(self, name, year).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arr::ArrResponse;
    use crate::testing::{fixtures, MockSeriesService};

    fn reconciler(service: &Arc<MockSeriesService>) -> SeriesReconciler {
        SeriesReconciler::from_service(Arc::clone(service), fixtures::series_policy())
    }

    #[tokio::test]
    async fn test_new_series_is_registered() {
        let service = Arc::new(MockSeriesService::new());
        service
            .add_matches("The Wire", vec![fixtures::series_match("The Wire", 2002)])
            .await;

        let result = reconciler(&service).add("The Wire", Some("2002")).await;

        assert!(result.success);
        assert_eq!(result.message, "Series added");

        let created = service.created().await;
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].path, "/data/tv/The Wire");
        assert_eq!(created[0].add_options.monitor, "missing");
    }

    #[tokio::test]
    async fn test_tracked_series_is_never_searched() {
        let service = Arc::new(MockSeriesService::new());
        service
            .add_matches("Severance", vec![fixtures::tracked_series("Severance", 2022, 9)])
            .await;

        let result = reconciler(&service).add("Severance", None).await;

        assert_eq!(result.message, "Series already exists");
        assert_eq!(service.create_count().await, 0);
        assert_eq!(service.search_count().await, 0);
    }

    #[tokio::test]
    async fn test_rejected_series_carries_errors() {
        let service = Arc::new(MockSeriesService::new());
        service
            .add_matches("Lost", vec![fixtures::series_match("Lost", 2004)])
            .await;
        service
            .set_create_response(ArrResponse::new(
                400,
                json!([{"errorMessage": "Path is already configured"}]),
            ))
            .await;

        let result = reconciler(&service).add("Lost", Some("2004")).await;

        assert!(!result.success);
        assert_eq!(result.message, "Error adding series");
        assert_eq!(
            result.errors.unwrap()[0]["errorMessage"],
            "Path is already configured"
        );
    }

    #[tokio::test]
    async fn test_lookup_failure_inside_add_is_unexpected() {
        let service = Arc::new(MockSeriesService::new());
        service.fail_lookup("Lost").await;

        let result = reconciler(&service).add("Lost", None).await;

        assert_eq!(result.message, "Unexpected error occurred");
        assert!(result.title.is_empty());
    }
}
