//! Bounded-concurrency scheduler driving recording downloads to completion.
//!
//! A fixed pool of worker tasks drains one shared work queue. Each worker
//! pops the next call under a lock, applies the idempotent skip (artifact
//! already at the destination), otherwise invokes the downloader, forwards
//! the finalized outcome to the sink, and paces itself with a fixed
//! inter-item delay. The lock guards only the pop - it is never held across
//! network or file I/O.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::api::CallRecord;
use crate::recording::{DownloadOutcome, RecordingDownloader};

/// Minimum allowed concurrency value.
const MIN_CONCURRENCY: usize = 1;

/// Maximum allowed concurrency value.
const MAX_CONCURRENCY: usize = 100;

/// Default worker-pool width. The upstream API is sensitive to parallel
/// recording fetches, so the pipeline is sequential unless told otherwise.
pub const DEFAULT_CONCURRENCY: usize = 1;

/// Default pause between items taken by one worker.
pub const DEFAULT_ITEM_DELAY: Duration = Duration::from_millis(1000);

/// Error type for scheduler construction.
#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    /// Invalid concurrency value provided.
    #[error(
        "invalid concurrency value {value}: must be between {MIN_CONCURRENCY} and {MAX_CONCURRENCY}"
    )]
    InvalidConcurrency {
        /// The invalid value that was provided.
        value: usize,
    },
}

/// Finalized classification of one scheduled call.
///
/// Extends the downloader's outcome with `Existing` for idempotent skips,
/// which never reach the network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutcomeKind {
    /// Recording fetched; payload is the audio body for the sink to persist.
    Success(Vec<u8>),
    /// The API reported no recording exists for this call.
    NotFound,
    /// The fetch failed terminally.
    Failed,
    /// The artifact was already at the destination; no network call made.
    Existing,
}

impl OutcomeKind {
    /// Status label recorded by the output sink.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Success(_) => "SUCCESS",
            Self::NotFound => "NOT_FOUND",
            Self::Failed => "FAILED",
            Self::Existing => "EXISTING",
        }
    }
}

impl From<DownloadOutcome> for OutcomeKind {
    fn from(outcome: DownloadOutcome) -> Self {
        match outcome {
            DownloadOutcome::Success(bytes) => Self::Success(bytes),
            DownloadOutcome::NotFound => Self::NotFound,
            DownloadOutcome::Failed => Self::Failed,
        }
    }
}

/// Destination for per-call outcomes.
///
/// Implemented by the filesystem sink in production and by in-memory
/// doubles in tests. Both methods are best-effort from the scheduler's
/// point of view: `record` must never fail the pipeline.
#[async_trait]
pub trait OutcomeSink: Send + Sync {
    /// Whether the artifact for `(campaign_id, call_id)` already exists at
    /// the destination.
    async fn artifact_exists(&self, campaign_id: i64, call_id: i64) -> bool;

    /// Consumes the finalized outcome for one call.
    async fn record(&self, campaign_id: i64, call: &CallRecord, outcome: OutcomeKind);
}

/// Statistics from one scheduler run.
///
/// Atomic counters allow updates from concurrent workers.
#[derive(Debug, Default)]
pub struct RunStats {
    success: AtomicUsize,
    not_found: AtomicUsize,
    failed: AtomicUsize,
    existing: AtomicUsize,
}

impl RunStats {
    /// Creates a stats tracker with zero counts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Successfully downloaded recordings.
    #[must_use]
    pub fn success(&self) -> usize {
        self.success.load(Ordering::SeqCst)
    }

    /// Calls with no recording available.
    #[must_use]
    pub fn not_found(&self) -> usize {
        self.not_found.load(Ordering::SeqCst)
    }

    /// Terminally failed downloads.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.failed.load(Ordering::SeqCst)
    }

    /// Idempotent skips.
    #[must_use]
    pub fn existing(&self) -> usize {
        self.existing.load(Ordering::SeqCst)
    }

    /// Total processed calls.
    #[must_use]
    pub fn total(&self) -> usize {
        self.success() + self.not_found() + self.failed() + self.existing()
    }

    fn count(&self, outcome: &OutcomeKind) {
        let counter = match outcome {
            OutcomeKind::Success(_) => &self.success,
            OutcomeKind::NotFound => &self.not_found,
            OutcomeKind::Failed => &self.failed,
            OutcomeKind::Existing => &self.existing,
        };
        counter.fetch_add(1, Ordering::SeqCst);
    }
}

/// Queue driver that runs recording downloads on a fixed worker pool.
///
/// # Concurrency Model
///
/// - One shared queue seeded with all calls; pop is mutually exclusive
/// - `concurrency` workers run as independent Tokio tasks
/// - A worker's backoff/pacing sleep suspends only that worker
/// - `run` returns after every worker has drained the queue
/// - No ordering guaranteed between outcomes of different calls
pub struct DownloadScheduler {
    downloader: Arc<RecordingDownloader>,
    concurrency: usize,
    item_delay: Duration,
}

impl DownloadScheduler {
    /// Creates a scheduler with the given worker-pool width and per-item
    /// pacing delay.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::InvalidConcurrency`] when `concurrency` is
    /// outside `1..=100`.
    pub fn new(
        downloader: Arc<RecordingDownloader>,
        concurrency: usize,
        item_delay: Duration,
    ) -> Result<Self, SchedulerError> {
        if !(MIN_CONCURRENCY..=MAX_CONCURRENCY).contains(&concurrency) {
            return Err(SchedulerError::InvalidConcurrency { value: concurrency });
        }
        Ok(Self {
            downloader,
            concurrency,
            item_delay,
        })
    }

    /// Returns the configured worker-pool width.
    #[must_use]
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Processes all `calls` for one campaign, emitting exactly one outcome
    /// per call through `sink`.
    ///
    /// Re-running after a prior run is safe and incremental: calls whose
    /// artifact already exists are skipped without a network request.
    #[instrument(skip(self, calls, sink), fields(calls = calls.len(), concurrency = self.concurrency))]
    pub async fn run(
        &self,
        campaign_id: i64,
        calls: Vec<CallRecord>,
        sink: Arc<dyn OutcomeSink>,
    ) -> RunStats {
        let total = calls.len();
        let queue = Arc::new(Mutex::new(VecDeque::from(calls)));
        let stats = Arc::new(RunStats::new());

        info!(total, "starting download run");

        let mut handles = Vec::with_capacity(self.concurrency);
        for worker_id in 0..self.concurrency {
            let queue = Arc::clone(&queue);
            let stats = Arc::clone(&stats);
            let sink = Arc::clone(&sink);
            let downloader = Arc::clone(&self.downloader);
            let item_delay = self.item_delay;

            handles.push(tokio::spawn(async move {
                loop {
                    // Critical section covers only the pop; the guard is
                    // dropped before any I/O.
                    let next = queue.lock().await.pop_front();
                    let Some(call) = next else {
                        debug!(worker_id, "queue drained, worker exiting");
                        break;
                    };

                    let outcome = if sink.artifact_exists(campaign_id, call.id).await {
                        debug!(worker_id, call_id = call.id, "artifact exists, skipping");
                        OutcomeKind::Existing
                    } else {
                        OutcomeKind::from(downloader.download(campaign_id, call.id).await)
                    };

                    stats.count(&outcome);
                    debug!(
                        worker_id,
                        call_id = call.id,
                        status = outcome.label(),
                        done = stats.total(),
                        total,
                        "call processed"
                    );
                    sink.record(campaign_id, &call, outcome).await;

                    tokio::time::sleep(item_delay).await;
                }
            }));
        }

        for handle in handles {
            // Task panics are logged but don't fail the run.
            if let Err(e) = handle.await {
                warn!(error = %e, "download worker panicked");
            }
        }

        info!(
            success = stats.success(),
            not_found = stats.not_found(),
            failed = stats.failed(),
            existing = stats.existing(),
            total = stats.total(),
            "download run complete"
        );

        match Arc::try_unwrap(stats) {
            Ok(stats) => stats,
            Err(arc_stats) => {
                // All workers are joined, so this branch should be
                // unreachable; copy the counters if it ever isn't.
                let fallback = RunStats::new();
                fallback.success.store(arc_stats.success(), Ordering::SeqCst);
                fallback
                    .not_found
                    .store(arc_stats.not_found(), Ordering::SeqCst);
                fallback.failed.store(arc_stats.failed(), Ordering::SeqCst);
                fallback
                    .existing
                    .store(arc_stats.existing(), Ordering::SeqCst);
                fallback
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_labels() {
        assert_eq!(OutcomeKind::Success(Vec::new()).label(), "SUCCESS");
        assert_eq!(OutcomeKind::NotFound.label(), "NOT_FOUND");
        assert_eq!(OutcomeKind::Failed.label(), "FAILED");
        assert_eq!(OutcomeKind::Existing.label(), "EXISTING");
    }

    #[test]
    fn test_outcome_from_download_outcome() {
        assert_eq!(
            OutcomeKind::from(DownloadOutcome::Success(vec![1, 2])),
            OutcomeKind::Success(vec![1, 2])
        );
        assert_eq!(
            OutcomeKind::from(DownloadOutcome::NotFound),
            OutcomeKind::NotFound
        );
        assert_eq!(
            OutcomeKind::from(DownloadOutcome::Failed),
            OutcomeKind::Failed
        );
    }

    #[test]
    fn test_run_stats_counting() {
        let stats = RunStats::new();
        stats.count(&OutcomeKind::Success(Vec::new()));
        stats.count(&OutcomeKind::Success(Vec::new()));
        stats.count(&OutcomeKind::NotFound);
        stats.count(&OutcomeKind::Failed);
        stats.count(&OutcomeKind::Existing);

        assert_eq!(stats.success(), 2);
        assert_eq!(stats.not_found(), 1);
        assert_eq!(stats.failed(), 1);
        assert_eq!(stats.existing(), 1);
        assert_eq!(stats.total(), 5);
    }

    #[test]
    fn test_run_stats_thread_safe() {
        use std::thread;

        let stats = Arc::new(RunStats::new());
        let mut handles = Vec::new();
        for _ in 0..8 {
            let stats = Arc::clone(&stats);
            handles.push(thread::spawn(move || {
                for _ in 0..100 {
                    stats.count(&OutcomeKind::NotFound);
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(stats.not_found(), 800);
        assert_eq!(stats.total(), 800);
    }

    #[test]
    fn test_scheduler_error_display() {
        let error = SchedulerError::InvalidConcurrency { value: 0 };
        let msg = error.to_string();
        assert!(msg.contains("invalid concurrency"));
        assert!(msg.contains('0'));
    }

    #[test]
    fn test_default_constants() {
        assert_eq!(DEFAULT_CONCURRENCY, 1);
        assert_eq!(DEFAULT_ITEM_DELAY, Duration::from_millis(1000));
    }
}
