//! Argus recording downloader core library.
//!
//! This library retrieves the campaign catalog and call records from the
//! Argus telephony API and reliably downloads each call's recording,
//! writing results and failures to durable logs.
//!
//! # Architecture
//!
//! The pipeline is organized leaf-first:
//! - [`chunk`] - Date-range splitting respecting the API query-window limit
//! - [`api`] - HTTP client wrapper, wire types, and error taxonomy
//! - [`catalog`] - Campaign catalog fetch with dedup
//! - [`pager`] - Cursor pagination over call records
//! - [`recording`] - Recording download with retry/backoff
//! - [`scheduler`] - Bounded-concurrency queue driver
//! - [`report`] - Reproducible diagnostics for failed downloads
//! - [`sink`] - Filesystem outcome sink (MP3 artifacts, CSV, logs)

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod api;
pub mod catalog;
pub mod chunk;
pub mod config;
pub mod pager;
pub mod recording;
pub mod report;
pub mod scheduler;
pub mod sink;

// Re-export commonly used types
pub use api::{ApiError, ArgusClient, CallRecord, Campaign};
pub use chunk::{ChunkError, DateChunk, DEFAULT_CHUNK_DAYS, split_date_range};
pub use config::{Config, ConfigError};
pub use recording::{
    BASE_DELAY, DEFAULT_MAX_RETRIES, DownloadOutcome, RecordingDownloader, RetryDecision,
    RetryPolicy,
};
pub use report::FailureReporter;
pub use scheduler::{
    DEFAULT_CONCURRENCY, DEFAULT_ITEM_DELAY, DownloadScheduler, OutcomeKind, OutcomeSink,
    RunStats, SchedulerError,
};
pub use sink::FsSink;
