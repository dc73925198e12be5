use futures::future::join_all;
use tracing::info;

use super::{emit, ReconciliationResult, Reconciler};
use crate::arr::TitleQuery;
use crate::audit::{AuditEvent, AuditHandle};
use crate::config::DispatchMode;
use crate::metrics;

/// Runs a reconciler over a batch of titles.
///
/// Output always has the input's length and order, whichever mode is used.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BulkDispatcher {
    mode: DispatchMode,
}

impl BulkDispatcher {
    pub fn new(mode: DispatchMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> DispatchMode {
        self.mode
    }

    pub async fn dispatch(
        &self,
        reconciler: &dyn Reconciler,
        items: &[TitleQuery],
        audit: Option<&AuditHandle>,
    ) -> Vec<ReconciliationResult> {
        let service = reconciler.kind().service();
        let mode = match self.mode {
            DispatchMode::Sequential => "sequential",
            DispatchMode::Concurrent => "concurrent",
        };

        info!("Attempting to add {} titles to {} ({})", items.len(), service, mode);
        metrics::BULK_BATCH_SIZE
            .with_label_values(&[service, mode])
            .observe(items.len() as f64);

        let results = match self.mode {
            DispatchMode::Sequential => {
                let mut results = Vec::with_capacity(items.len());
                for item in items {
                    results.push(reconciler.add(&item.name, item.year()).await);
                }
                results
            }
            DispatchMode::Concurrent => {
                join_all(
                    items
                        .iter()
                        .map(|item| reconciler.add(&item.name, item.year())),
                )
                .await
            }
        };

        let successful = results.iter().filter(|r| r.success).count();
        let failed = results.len() - successful;
        info!(
            "Bulk add to {} finished: {} added, {} not added",
            service, successful, failed
        );

        emit(
            audit,
            AuditEvent::BulkAdd {
                service: service.to_string(),
                total: items.len(),
                successful,
                failed,
            },
        );

        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconcile::MediaKind;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::mpsc;

    /// Echoes the name back; earlier items sleep longer so that concurrent
    /// completion order is the reverse of input order.
    struct SlowEcho {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    impl SlowEcho {
        fn new() -> Self {
            Self {
                in_flight: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Reconciler for SlowEcho {
        fn kind(&self) -> MediaKind {
            MediaKind::Movie
        }

        async fn add(&self, name: &str, _year: Option<&str>) -> ReconciliationResult {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);

            let delay: u64 = name.parse().unwrap_or(0);
            tokio::time::sleep(Duration::from_millis(50 - delay * 10)).await;

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            ReconciliationResult {
                success: delay % 2 == 0,
                message: "ok".to_string(),
                title: name.to_string(),
                year: String::new(),
                imdb_id: None,
                tmdb_id: None,
                errors: None,
            }
        }
    }

    fn items() -> Vec<TitleQuery> {
        (0..4).map(|i| TitleQuery::new(i.to_string(), None)).collect()
    }

    fn titles(results: &[ReconciliationResult]) -> Vec<&str> {
        results.iter().map(|r| r.title.as_str()).collect()
    }

    #[tokio::test]
    async fn test_sequential_runs_one_at_a_time_in_order() {
        let echo = SlowEcho::new();
        let results = BulkDispatcher::new(DispatchMode::Sequential)
            .dispatch(&echo, &items(), None)
            .await;

        assert_eq!(titles(&results), vec!["0", "1", "2", "3"]);
        assert_eq!(echo.peak.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_concurrent_overlaps_but_keeps_order() {
        let echo = SlowEcho::new();
        let results = BulkDispatcher::new(DispatchMode::Concurrent)
            .dispatch(&echo, &items(), None)
            .await;

        assert_eq!(titles(&results), vec!["0", "1", "2", "3"]);
        assert!(echo.peak.load(Ordering::SeqCst) > 1);
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let echo = SlowEcho::new();
        let results = BulkDispatcher::default().dispatch(&echo, &[], None).await;
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_summary_event_counts_outcomes() {
        let (tx, mut rx) = mpsc::channel(4);
        let audit = AuditHandle::new(tx);

        BulkDispatcher::default()
            .dispatch(&SlowEcho::new(), &items(), Some(&audit))
            .await;

        let envelope = rx.recv().await.unwrap();
        match envelope.event {
            AuditEvent::BulkAdd {
                service,
                total,
                successful,
                failed,
            } => {
                assert_eq!(service, "radarr");
                assert_eq!(total, 4);
                assert_eq!(successful, 2);
                assert_eq!(failed, 2);
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }
}
