//! Recording download as an explicit attempt state machine.

use std::sync::Arc;

use tracing::{debug, error, instrument, warn};

use crate::api::{ArgusClient, RecordingResponse};
use crate::report::FailureReporter;

use super::retry::{RetryDecision, RetryPolicy};

/// Application status meaning "no recording exists for this call"
/// (voicemail, abandoned before connect, and similar).
const NOT_FOUND_STATUS: i64 = -6;

/// Terminal classification of one call's recording fetch.
///
/// Produced exactly once per call per run; the downloader never lets an
/// error escape its boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// The recording was fetched; the payload is the audio body.
    Success(Vec<u8>),
    /// The API reported that no recording exists. Expected, not an error.
    NotFound,
    /// The fetch failed terminally (non-transient error, or retries
    /// exhausted).
    Failed,
}

/// Per-invocation retry state. Lives only for one `download` call and is
/// destroyed on the terminal outcome.
#[derive(Debug)]
enum AttemptState {
    /// About to issue attempt `n` (1-indexed).
    Attempting(u32),
    /// Terminal outcome reached.
    Done(DownloadOutcome),
}

/// Downloads one call's recording with bounded retry.
///
/// # Retry Behavior
///
/// - An audio body is terminal success.
/// - An error envelope with the not-found sentinel is terminal
///   [`DownloadOutcome::NotFound`], with no retry and no diagnostic.
/// - Any other envelope is a non-transient application error: terminal
///   [`DownloadOutcome::Failed`] without retry.
/// - A 5xx HTTP error is retried with linear backoff until the attempt
///   limit; every other transport error is terminal on the spot. Terminal
///   transport failures are handed to the [`FailureReporter`].
pub struct RecordingDownloader {
    client: Arc<ArgusClient>,
    policy: RetryPolicy,
    reporter: Arc<FailureReporter>,
}

impl RecordingDownloader {
    /// Creates a downloader over a shared client and failure reporter.
    #[must_use]
    pub fn new(
        client: Arc<ArgusClient>,
        policy: RetryPolicy,
        reporter: Arc<FailureReporter>,
    ) -> Self {
        Self {
            client,
            policy,
            reporter,
        }
    }

    /// Returns the configured retry policy.
    #[must_use]
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Fetches the recording for `call_id`, resolving every failure mode to
    /// a classified outcome.
    #[instrument(skip(self))]
    pub async fn download(&self, campaign_id: i64, call_id: i64) -> DownloadOutcome {
        let mut state = AttemptState::Attempting(1);

        loop {
            let attempt = match state {
                AttemptState::Attempting(n) => n,
                AttemptState::Done(outcome) => return outcome,
            };

            debug!(attempt, "attempting recording download");
            state = match self.client.fetch_recording(campaign_id, call_id).await {
                Ok(RecordingResponse::Audio(bytes)) => {
                    debug!(attempt, bytes = bytes.len(), "recording downloaded");
                    AttemptState::Done(DownloadOutcome::Success(bytes))
                }
                Ok(RecordingResponse::Envelope(envelope)) => {
                    if envelope.cod_status == NOT_FOUND_STATUS {
                        AttemptState::Done(DownloadOutcome::NotFound)
                    } else {
                        warn!(
                            attempt,
                            cod_status = envelope.cod_status,
                            message = %envelope.desc_status,
                            "unexpected non-audio response"
                        );
                        AttemptState::Done(DownloadOutcome::Failed)
                    }
                }
                Err(e) => match self.policy.should_retry(&e, attempt) {
                    RetryDecision::Retry {
                        delay,
                        attempt: next_attempt,
                    } => {
                        warn!(
                            attempt,
                            next_attempt,
                            max_attempts = self.policy.max_attempts(),
                            delay_ms = delay.as_millis(),
                            error = %e,
                            "server failure, retrying recording download"
                        );
                        tokio::time::sleep(delay).await;
                        AttemptState::Attempting(next_attempt)
                    }
                    RetryDecision::DoNotRetry { reason } => {
                        error!(
                            attempt,
                            error = %e,
                            %reason,
                            "recording download failed terminally"
                        );
                        self.reporter
                            .report(campaign_id, call_id, &e.status_label())
                            .await;
                        AttemptState::Done(DownloadOutcome::Failed)
                    }
                },
            };
        }
    }
}
