use std::fmt::Display;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use super::AuditEvent;

/// Envelope wrapping an audit event with metadata
#[derive(Debug, Clone)]
pub struct AuditEventEnvelope {
    pub timestamp: DateTime<Utc>,
    pub event: AuditEvent,
}

/// Handle for emitting audit events
///
/// This is cheaply cloneable and can be shared across tasks.
/// Events are sent through a bounded channel to be written by the AuditWriter.
/// Emitting never fails the caller. `try_emit`, `log` and `error` never wait
/// either: when the writer falls behind the event is dropped with a warning.
#[derive(Clone, Debug)]
pub struct AuditHandle {
    tx: mpsc::Sender<AuditEventEnvelope>,
}

impl AuditHandle {
    pub fn new(tx: mpsc::Sender<AuditEventEnvelope>) -> Self {
        Self { tx }
    }

    /// Emit an audit event, waiting for channel capacity.
    ///
    /// If the channel is closed the error is logged and dropped.
    pub async fn emit(&self, event: AuditEvent) {
        let envelope = AuditEventEnvelope {
            timestamp: Utc::now(),
            event,
        };
        if let Err(e) = self.tx.send(envelope).await {
            tracing::error!("Failed to emit audit event: {}", e);
        }
    }

    /// Try to emit an audit event without waiting.
    ///
    /// Returns true if the event was queued.
    pub fn try_emit(&self, event: AuditEvent) -> bool {
        let envelope = AuditEventEnvelope {
            timestamp: Utc::now(),
            event,
        };
        match self.tx.try_send(envelope) {
            Ok(()) => true,
            Err(TrySendError::Full(dropped)) => {
                tracing::warn!(
                    "Audit channel full, dropping {} event",
                    dropped.event.event_type()
                );
                false
            }
            Err(TrySendError::Closed(_)) => {
                tracing::error!("Failed to emit audit event: channel closed");
                false
            }
        }
    }

    /// Record a free-form entry under `kind` (e.g. "info"). Does not wait.
    pub fn log(&self, kind: &str, service: &str, payload: serde_json::Value, success: bool) {
        self.try_emit(AuditEvent::Log {
            kind: kind.to_string(),
            service: service.to_string(),
            payload,
            success,
        });
    }

    /// Record an absorbed failure together with its cause. Does not wait.
    pub fn error(&self, service: &str, message: impl Into<String>, cause: &dyn Display) {
        self.try_emit(AuditEvent::Error {
            service: service.to_string(),
            message: message.into(),
            cause: cause.to_string(),
        });
    }
}
