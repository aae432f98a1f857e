//! Recording download with bounded retry and classified outcomes.

mod downloader;
mod retry;

pub use downloader::{DownloadOutcome, RecordingDownloader};
pub use retry::{BASE_DELAY, DEFAULT_MAX_RETRIES, RetryDecision, RetryPolicy, is_transient};
