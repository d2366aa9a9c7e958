//! Drives reconciliation over a list of filings.
//!
//! Filings are reconciled with bounded parallelism but their results are
//! appended in input order by a single loop, so observers only ever see the
//! result set grow. Failures and timeouts of a single filing are logged and
//! count as zero rows.

use anyhow::Result;
use futures::stream::{self, StreamExt};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

use crate::core::types::FactSource;
use crate::edgar::filing::FilingMetadata;
use crate::error::DisclosureError;
use crate::mapping::{enrich, EnrichedRow, MappingTable};
use crate::reconcile::{FilingReconciler, ReconcileConfig, ReconciledRow};

pub const DEFAULT_CONCURRENCY: usize = 4;
pub const DEFAULT_UNIT_TIMEOUT: Duration = Duration::from_secs(60);

/// Shared cancellation switch. `stop` may be called from any thread,
/// including a signal handler.
#[derive(Debug)]
pub struct StopSignal {
    running: AtomicBool,
    notify: Notify,
}

impl Default for StopSignal {
    fn default() -> Self {
        Self {
            running: AtomicBool::new(true),
            notify: Notify::new(),
        }
    }
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Resolves once `stop` has been called.
    pub async fn stopped(&self) {
        loop {
            // Registered before the check so a concurrent `stop` is not missed.
            let notified = self.notify.notified();
            if !self.is_running() {
                return;
            }
            notified.await;
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchProgress {
    pub total: usize,
    pub processed: usize,
    /// Filings that contributed at least one row.
    pub with_rows: usize,
    /// Filings that failed to fetch, parse, or finish in time.
    pub failed: usize,
    pub rows: usize,
}

/// Receives a snapshot after every processed filing.
pub trait BatchObserver {
    fn on_progress(&mut self, progress: &BatchProgress, results: &[ReconciledRow]);
}

impl<F> BatchObserver for F
where
    F: FnMut(&BatchProgress, &[ReconciledRow]),
{
    fn on_progress(&mut self, progress: &BatchProgress, results: &[ReconciledRow]) {
        self(progress, results)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchStatus {
    Completed,
    /// Stopped through the [`StopSignal`]; rows of finished filings are kept.
    Aborted,
}

#[derive(Debug, Clone)]
pub struct BatchResult {
    pub status: BatchStatus,
    pub rows: Vec<EnrichedRow>,
    pub progress: BatchProgress,
}

pub struct BatchProcessor {
    source: Arc<dyn FactSource>,
    config: ReconcileConfig,
    concurrency: usize,
    unit_timeout: Duration,
    stop: Arc<StopSignal>,
}

impl BatchProcessor {
    pub fn new(source: Arc<dyn FactSource>, config: ReconcileConfig) -> Self {
        Self {
            source,
            config,
            concurrency: DEFAULT_CONCURRENCY,
            unit_timeout: DEFAULT_UNIT_TIMEOUT,
            stop: Arc::new(StopSignal::new()),
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_unit_timeout(mut self, timeout: Duration) -> Self {
        self.unit_timeout = timeout;
        self
    }

    /// Stopping the signal ends the batch at once; filings still being
    /// fetched are dropped, rows of finished filings are kept.
    pub fn with_stop_signal(mut self, stop: Arc<StopSignal>) -> Self {
        self.stop = stop;
        self
    }

    /// Processes `filings`, then left-joins the accumulated rows with `mapping`.
    ///
    /// A completed batch without any row fails with [`DisclosureError::EmptyResult`].
    pub async fn run(
        &self,
        filings: &[FilingMetadata],
        mapping: &MappingTable,
        observer: &mut dyn BatchObserver,
    ) -> Result<BatchResult> {
        let mut progress = BatchProgress {
            total: filings.len(),
            ..Default::default()
        };
        let mut results: Vec<ReconciledRow> = Vec::new();
        let mut status = BatchStatus::Completed;

        log::info!("Checking {} filings", filings.len());

        let mut units = stream::iter(filings)
            .map(|filing| self.process_unit(filing))
            .buffered(self.concurrency);

        while progress.processed < progress.total {
            let next = tokio::select! {
                biased;
                _ = self.stop.stopped() => {
                    log::warn!(
                        "Batch aborted after {} of {} filings",
                        progress.processed,
                        progress.total
                    );
                    status = BatchStatus::Aborted;
                    break;
                }
                next = units.next() => next,
            };

            let Some(outcome) = next else {
                break;
            };

            progress.processed += 1;
            match outcome {
                Some(rows) if !rows.is_empty() => {
                    progress.with_rows += 1;
                    results.extend(rows);
                }
                Some(_) => {}
                None => progress.failed += 1,
            }
            progress.rows = results.len();

            observer.on_progress(&progress, &results);
        }

        if results.is_empty() && status == BatchStatus::Completed {
            return Err(DisclosureError::EmptyResult.into());
        }

        Ok(BatchResult {
            status,
            rows: enrich(&results, mapping),
            progress,
        })
    }

    /// `None` when the filing could not be reconciled.
    async fn process_unit(&self, filing: &FilingMetadata) -> Option<Vec<ReconciledRow>> {
        let reference = &filing.filing_reference;
        let reconciler = FilingReconciler::new(self.source.as_ref(), &self.config);

        match tokio::time::timeout(self.unit_timeout, reconciler.reconcile(reference)).await {
            Ok(Ok(reconciliation)) => Some(
                reconciliation
                    .rows
                    .into_iter()
                    .map(|mut row| {
                        row.filed_at = filing.filed_at;
                        row.ticker = filing.ticker.clone();
                        row
                    })
                    .collect(),
            ),
            Ok(Err(e)) => {
                log::warn!("Failed to process filing: {} - {:#}", reference, e);
                None
            }
            Err(_) => {
                log::warn!(
                    "Timed out after {:?} processing filing: {}",
                    self.unit_timeout,
                    reference
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_stopped_resolves_after_stop() {
        let signal = Arc::new(StopSignal::new());
        assert!(signal.is_running());

        let waiter = {
            let signal = signal.clone();
            tokio::spawn(async move { signal.stopped().await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        signal.stop();

        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
        assert!(!signal.is_running());
    }

    #[tokio::test]
    async fn test_stopped_is_immediate_once_stopped() {
        let signal = StopSignal::new();
        signal.stop();
        tokio::time::timeout(Duration::from_millis(100), signal.stopped())
            .await
            .unwrap();
    }
}
