//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use chrono::{DateTime, FixedOffset};
use clap::Parser;

use argus_core::{DEFAULT_CHUNK_DAYS, DEFAULT_MAX_RETRIES};

/// Batch download and log call recordings from the Argus telephony API.
///
/// Fetches the campaign catalog and all call records in the given period,
/// then downloads each call's recording into a per-campaign folder,
/// writing a call-details CSV and failure logs along the way. Re-running
/// is safe: recordings already on disk are skipped.
#[derive(Parser, Debug)]
#[command(name = "argus-dl")]
#[command(author, version, about)]
pub struct Args {
    /// Start of the period (RFC 3339, e.g. 2025-08-08T00:00:00-03:00)
    #[arg(long)]
    pub from: DateTime<FixedOffset>,

    /// End of the period (RFC 3339, e.g. 2025-08-08T23:59:59-03:00)
    #[arg(long)]
    pub to: DateTime<FixedOffset>,

    /// Only process this campaign id (overrides ARGUS_CAMPAIGN_ID)
    #[arg(long)]
    pub campaign: Option<i64>,

    /// Output directory for recordings, CSVs, and logs
    #[arg(short, long, default_value = "gravacoes")]
    pub output: PathBuf,

    /// Concurrent download workers (1-100)
    #[arg(short = 'c', long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(1..=100))]
    pub concurrency: u8,

    /// Maximum attempts per recording on server failures (1-10)
    #[arg(short = 'r', long, default_value_t = DEFAULT_MAX_RETRIES as u8, value_parser = clap::value_parser!(u8).range(1..=10))]
    pub max_retries: u8,

    /// Pause between downloads per worker in milliseconds
    #[arg(long, default_value_t = 1000, value_parser = clap::value_parser!(u64).range(0..=60000))]
    pub delay_ms: u64,

    /// Maximum days per call-listing query (API window limit)
    #[arg(long, default_value_t = DEFAULT_CHUNK_DAYS, value_parser = clap::value_parser!(i64).range(1..=31))]
    pub chunk_days: i64,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,
}
