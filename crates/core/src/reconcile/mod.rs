//! Per-title reconciliation: decide whether a requested title is added,
//! skipped, or re-searched, and report the decision as a
//! [`ReconciliationResult`].

mod dispatch;
mod movie;
mod series;

pub use dispatch::BulkDispatcher;
pub use movie::MovieReconciler;
pub use series::SeriesReconciler;

use std::time::Instant;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::arr::{ArrError, ArrResponse, CatalogMatch, LookupClient, TitleQuery};
use crate::audit::{AuditEvent, AuditHandle};
use crate::metrics;

/// Which target service a reconciler drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Movie,
    Series,
}

impl MediaKind {
    /// Service name used in logs, audit events and metrics labels.
    pub fn service(&self) -> &'static str {
        match self {
            Self::Movie => "radarr",
            Self::Series => "sonarr",
        }
    }
}

/// Every decision a reconciliation can end in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    NoResults,
    Downloading,
    Importing,
    NotReleased,
    AlreadyExists,
    SearchTriggered,
    SearchRejected,
    ExistsWithoutFile,
    Added,
    AddRejected,
    Unexpected,
}

impl Outcome {
    pub fn message(&self, kind: MediaKind) -> &'static str {
        match (self, kind) {
            (Self::NoResults, _) => "No results found",
            (Self::Downloading, _) => "Movie is already downloading",
            (Self::Importing, _) => "Movie is importing, wait a few minutes",
            (Self::NotReleased, _) => "Movie is not out yet, still in cinemas or production.",
            (Self::AlreadyExists, MediaKind::Movie) => "Movie already exists, doing nothing!",
            (Self::AlreadyExists, MediaKind::Series) => "Series already exists",
            (Self::SearchTriggered, _) => "Movie is downloading now",
            (Self::SearchRejected, _) => "An error has occurred",
            (Self::ExistsWithoutFile, _) => "Movie exists, but isn't downloaded",
            (Self::Added, MediaKind::Movie) => "Movie added and downloading",
            (Self::Added, MediaKind::Series) => "Series added",
            (Self::AddRejected, MediaKind::Movie) => "Error adding movie",
            (Self::AddRejected, MediaKind::Series) => "Error adding series",
            (Self::Unexpected, _) => "Unexpected error occurred",
        }
    }

    /// Only a fresh registration counts as success.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Added)
    }

    /// Stable label for metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Self::NoResults => "no_results",
            Self::Downloading => "downloading",
            Self::Importing => "importing",
            Self::NotReleased => "not_released",
            Self::AlreadyExists => "already_exists",
            Self::SearchTriggered => "search_triggered",
            Self::SearchRejected => "search_rejected",
            Self::ExistsWithoutFile => "exists_without_file",
            Self::Added => "added",
            Self::AddRejected => "add_rejected",
            Self::Unexpected => "unexpected",
        }
    }
}

/// What a caller gets back for one requested title.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationResult {
    pub success: bool,
    pub message: String,
    pub title: String,
    pub year: String,
    pub imdb_id: Option<String>,
    pub tmdb_id: Option<u32>,
    /// Error body returned by the target service on a rejected add
    pub errors: Option<serde_json::Value>,
}

impl ReconciliationResult {
    /// Lookup found nothing; echo back what was asked for.
    pub fn not_found(kind: MediaKind, query: &TitleQuery) -> Self {
        Self {
            success: false,
            message: Outcome::NoResults.message(kind).to_string(),
            title: query.name.clone(),
            year: query.year().unwrap_or_default().to_string(),
            imdb_id: None,
            tmdb_id: None,
            errors: None,
        }
    }

    /// Something failed underneath; details only go to the logs.
    pub fn unexpected(kind: MediaKind) -> Self {
        Self {
            success: false,
            message: Outcome::Unexpected.message(kind).to_string(),
            title: String::new(),
            year: String::new(),
            imdb_id: None,
            tmdb_id: None,
            errors: None,
        }
    }

    pub fn for_match(kind: MediaKind, outcome: Outcome, candidate: &impl CatalogMatch) -> Self {
        Self {
            success: outcome.is_success(),
            message: outcome.message(kind).to_string(),
            title: candidate.title().to_string(),
            year: candidate.year().map(|y| y.to_string()).unwrap_or_default(),
            imdb_id: candidate.imdb_id().map(String::from),
            tmdb_id: candidate.tmdb_id(),
            errors: None,
        }
    }

    pub fn with_errors(mut self, errors: serde_json::Value) -> Self {
        self.errors = Some(errors);
        self
    }
}

/// A per-domain reconciliation engine.
///
/// `add` never fails: every error is folded into the returned result.
#[async_trait]
pub trait Reconciler: Send + Sync {
    fn kind(&self) -> MediaKind;

    async fn add(&self, name: &str, year: Option<&str>) -> ReconciliationResult;
}

// =============================================================================
// Shared plumbing
// =============================================================================

/// Queue an audit event without waiting; a full channel drops it.
fn emit(audit: Option<&AuditHandle>, event: AuditEvent) {
    if let Some(audit) = audit {
        audit.try_emit(event);
    }
}

/// Run a lookup, recording it in metrics and the audit log.
async fn audited_lookup<M: Send>(
    client: &dyn LookupClient<M>,
    service: &str,
    query: &TitleQuery,
    audit: Option<&AuditHandle>,
) -> Result<Vec<M>, ArrError> {
    debug!("{} lookup: term='{}'", service, query.search_term());

    let result = client.lookup(query).await;
    let (status_code, results_count) = match &result {
        Ok(matches) => (Some(200), matches.len()),
        Err(e) => {
            warn!("{} lookup failed for '{}': {}", service, query.search_term(), e);
            (e.status(), 0)
        }
    };
    metrics::record_arr_request(service, "lookup", status_code);

    emit(
        audit,
        AuditEvent::Lookup {
            service: service.to_string(),
            query: query.clone(),
            status_code,
            results_count,
            success: result.is_ok(),
        },
    );

    result
}

/// Record a mutating call (create or search command).
fn record_api_call(
    audit: Option<&AuditHandle>,
    service: &str,
    operation: &str,
    title: &str,
    response: &Result<ArrResponse, ArrError>,
) {
    let status_code = match response {
        Ok(r) => Some(r.status),
        Err(e) => e.status(),
    };
    metrics::record_arr_request(service, operation, status_code);

    emit(
        audit,
        AuditEvent::Api {
            service: service.to_string(),
            operation: operation.to_string(),
            title: Some(title.to_string()),
            status_code,
            success: matches!(response, Ok(r) if r.is_success()),
        },
    );
}

/// Common tail of every add(): fold errors, record metrics and the audit entry.
fn conclude(
    kind: MediaKind,
    audit: Option<&AuditHandle>,
    query: &TitleQuery,
    reconciled: Result<(Outcome, ReconciliationResult), ArrError>,
    started: Instant,
) -> ReconciliationResult {
    let service = kind.service();
    let (outcome, result) = match reconciled {
        Ok(pair) => pair,
        Err(e) => {
            error!("{} add failed for '{}': {}", service, query.search_term(), e);
            if let Some(audit) = audit {
                audit.error(
                    service,
                    format!("Error adding {}: {}", kind_noun(kind), query.search_term()),
                    &e,
                );
            }
            (Outcome::Unexpected, ReconciliationResult::unexpected(kind))
        }
    };

    metrics::RECONCILIATIONS_TOTAL
        .with_label_values(&[service, outcome.label()])
        .inc();
    metrics::RECONCILIATION_DURATION
        .with_label_values(&[service])
        .observe(started.elapsed().as_secs_f64());

    emit(
        audit,
        AuditEvent::Add {
            service: service.to_string(),
            query: query.clone(),
            result: result.clone(),
        },
    );

    result
}

fn kind_noun(kind: MediaKind) -> &'static str {
    match kind {
        MediaKind::Movie => "movie",
        MediaKind::Series => "series",
    }
}
