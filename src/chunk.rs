//! Date-range chunking respecting the API query-window limit.
//!
//! The call-listing endpoint rejects queries spanning more than a few days,
//! so an arbitrary date interval is split into bounded sub-intervals before
//! pagination. Chunk boundaries are inclusive on both ends; the end of each
//! non-final chunk is pulled back by one second so the boundary instant is
//! not counted twice by consecutive chunks.

use chrono::{DateTime, Duration, FixedOffset};
use thiserror::Error;

/// Default maximum chunk span in days, matching the API window limit.
pub const DEFAULT_CHUNK_DAYS: i64 = 7;

/// Timestamp format expected by the Argus API (`2025-08-08T00:00:00-03:00`).
const API_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%:z";

/// Errors from date-range chunking.
#[derive(Debug, Error)]
pub enum ChunkError {
    /// The requested interval or window size is malformed.
    #[error("invalid date range: {reason}")]
    InvalidRange {
        /// Why the input was rejected.
        reason: String,
    },
}

/// A bounded sub-interval of the overall date range.
///
/// Invariant: `start < end` and the span never exceeds the `max_days`
/// passed to [`split_date_range`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateChunk {
    /// Inclusive start of the sub-interval.
    pub start: DateTime<FixedOffset>,
    /// Inclusive end of the sub-interval.
    pub end: DateTime<FixedOffset>,
}

impl DateChunk {
    /// Chunk start formatted the way the API expects it.
    #[must_use]
    pub fn start_param(&self) -> String {
        self.start.format(API_TIMESTAMP_FORMAT).to_string()
    }

    /// Chunk end formatted the way the API expects it.
    #[must_use]
    pub fn end_param(&self) -> String {
        self.end.format(API_TIMESTAMP_FORMAT).to_string()
    }
}

/// Splits `[start, end]` into an ordered sequence of chunks of at most
/// `max_days` each.
///
/// The chunks are contiguous and non-overlapping: each non-final chunk ends
/// exactly one second before the next chunk starts, and the final chunk ends
/// at `end`. Deterministic, no side effects.
///
/// # Errors
///
/// Returns [`ChunkError::InvalidRange`] when `start >= end` or
/// `max_days < 1`.
pub fn split_date_range(
    start: DateTime<FixedOffset>,
    end: DateTime<FixedOffset>,
    max_days: i64,
) -> Result<Vec<DateChunk>, ChunkError> {
    if max_days < 1 {
        return Err(ChunkError::InvalidRange {
            reason: format!("max_days must be at least 1, got {max_days}"),
        });
    }
    if start >= end {
        return Err(ChunkError::InvalidRange {
            reason: format!("start ({start}) must be before end ({end})"),
        });
    }

    let span = Duration::days(max_days);
    let mut chunks = Vec::new();
    let mut current = start;
    while current < end {
        let next = current + span;
        let chunk_end = if next > end {
            end
        } else {
            next - Duration::seconds(1)
        };
        chunks.push(DateChunk {
            start: current,
            end: chunk_end,
        });
        current = next;
    }
    Ok(chunks)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn ts(s: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(s).unwrap()
    }

    #[test]
    fn test_split_single_chunk_when_range_fits_window() {
        let start = ts("2025-08-08T00:00:00-03:00");
        let end = ts("2025-08-08T23:59:59-03:00");
        let chunks = split_date_range(start, end, 7).unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].start, start);
        assert_eq!(chunks[0].end, end);
    }

    #[test]
    fn test_split_multiple_chunks_cover_range_without_gaps() {
        let start = ts("2025-08-01T00:00:00-03:00");
        let end = ts("2025-08-20T23:59:59-03:00");
        let chunks = split_date_range(start, end, 7).unwrap();
        assert_eq!(chunks.len(), 3);

        // First chunk starts at the overall start; last ends at the overall end.
        assert_eq!(chunks[0].start, start);
        assert_eq!(chunks.last().unwrap().end, end);

        // Contiguous: each chunk ends one second before the next starts.
        for pair in chunks.windows(2) {
            assert_eq!(pair[0].end + Duration::seconds(1), pair[1].start);
        }

        // Span bound holds for every chunk.
        for chunk in &chunks {
            assert!(chunk.end - chunk.start < Duration::days(7));
            assert!(chunk.start < chunk.end);
        }
    }

    #[test]
    fn test_split_non_final_chunk_ends_one_second_before_window() {
        let start = ts("2025-08-01T00:00:00-03:00");
        let end = ts("2025-08-20T00:00:00-03:00");
        let chunks = split_date_range(start, end, 7).unwrap();
        assert_eq!(
            chunks[0].end,
            ts("2025-08-07T23:59:59-03:00"),
            "non-final chunk end is start + 7 days minus one second"
        );
    }

    #[test]
    fn test_split_respects_custom_window() {
        let start = ts("2025-08-01T00:00:00-03:00");
        let end = ts("2025-08-05T00:00:00-03:00");
        let chunks = split_date_range(start, end, 1).unwrap();
        assert_eq!(chunks.len(), 4);
    }

    #[test]
    fn test_split_rejects_reversed_range() {
        let start = ts("2025-08-08T00:00:00-03:00");
        let end = ts("2025-08-01T00:00:00-03:00");
        let result = split_date_range(start, end, 7);
        assert!(matches!(result, Err(ChunkError::InvalidRange { .. })));
    }

    #[test]
    fn test_split_rejects_equal_bounds() {
        let start = ts("2025-08-08T00:00:00-03:00");
        let result = split_date_range(start, start, 7);
        assert!(matches!(result, Err(ChunkError::InvalidRange { .. })));
    }

    #[test]
    fn test_split_rejects_zero_window() {
        let start = ts("2025-08-01T00:00:00-03:00");
        let end = ts("2025-08-08T00:00:00-03:00");
        let result = split_date_range(start, end, 0);
        assert!(matches!(result, Err(ChunkError::InvalidRange { .. })));
    }

    #[test]
    fn test_chunk_params_use_api_timestamp_format() {
        let chunk = DateChunk {
            start: ts("2025-08-08T00:00:00-03:00"),
            end: ts("2025-08-08T23:59:59-03:00"),
        };
        assert_eq!(chunk.start_param(), "2025-08-08T00:00:00-03:00");
        assert_eq!(chunk.end_param(), "2025-08-08T23:59:59-03:00");
    }
}
