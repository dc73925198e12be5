use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::arr::TitleQuery;
use crate::reconcile::ReconciliationResult;

/// Audit event types
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuditEvent {
    // System events
    ServiceStarted {
        version: String,
        config_hash: String,
    },
    ServiceStopped {
        reason: String,
    },

    /// Catalog lookup against a target service
    Lookup {
        service: String,
        query: TitleQuery,
        /// HTTP status of the lookup, absent when the request never completed
        #[serde(default, skip_serializing_if = "Option::is_none")]
        status_code: Option<u16>,
        results_count: usize,
        success: bool,
    },

    /// Outcome of one reconciliation
    Add {
        service: String,
        query: TitleQuery,
        result: ReconciliationResult,
    },

    /// Summary of a bulk request
    BulkAdd {
        service: String,
        total: usize,
        successful: usize,
        failed: usize,
    },

    /// Mutating call against a target service (create, search command)
    Api {
        service: String,
        operation: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        status_code: Option<u16>,
        success: bool,
    },

    /// Free-form entry: progress notes and anything without a dedicated variant
    Log {
        kind: String,
        service: String,
        payload: serde_json::Value,
        success: bool,
    },

    /// A failure that was absorbed rather than returned
    Error {
        service: String,
        message: String,
        cause: String,
    },
}

impl AuditEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::ServiceStarted { .. } => "service_started",
            Self::ServiceStopped { .. } => "service_stopped",
            Self::Lookup { .. } => "lookup",
            Self::Add { .. } => "add",
            Self::BulkAdd { .. } => "bulk_add",
            Self::Api { .. } => "api",
            Self::Log { .. } => "log",
            Self::Error { .. } => "error",
        }
    }

    /// Target service the event concerns, if any
    pub fn service(&self) -> Option<&str> {
        match self {
            Self::ServiceStarted { .. } | Self::ServiceStopped { .. } => None,
            Self::Lookup { service, .. }
            | Self::Add { service, .. }
            | Self::BulkAdd { service, .. }
            | Self::Api { service, .. }
            | Self::Log { service, .. }
            | Self::Error { service, .. } => Some(service),
        }
    }

    /// Whether the audited operation succeeded
    pub fn success(&self) -> bool {
        match self {
            Self::ServiceStarted { .. } | Self::ServiceStopped { .. } => true,
            Self::Lookup { success, .. }
            | Self::Api { success, .. }
            | Self::Log { success, .. } => *success,
            Self::Add { result, .. } => result.success,
            Self::BulkAdd { failed, .. } => *failed == 0,
            Self::Error { .. } => false,
        }
    }
}

/// Stored audit record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub event_type: String,
    pub service: Option<String>,
    pub success: bool,
    pub data: AuditEvent,
}

impl AuditRecord {
    pub fn from_event(timestamp: DateTime<Utc>, event: AuditEvent) -> Self {
        Self {
            id: 0,
            timestamp,
            event_type: event.event_type().to_string(),
            service: event.service().map(String::from),
            success: event.success(),
            data: event,
        }
    }
}
