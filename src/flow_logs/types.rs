//! Flow Logs Data Types
//!
//! Request and response shapes exchanged with CloudWatch Logs, and the
//! options that configure a [`FlowLogsReader`](super::FlowLogsReader).

#![warn(clippy::all, rust_2018_idioms)]

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Window length used when no start time is given
pub const DEFAULT_WINDOW_HOURS: i64 = 1;

/// Reader options: time window and completeness flag
#[derive(Debug, Clone)]
pub struct ReaderOptions {
    /// Start of the window (inclusive). Defaults to one hour before `end_time`
    pub start_time: Option<DateTime<Utc>>,
    /// End of the window (exclusive). Defaults to now
    pub end_time: Option<DateTime<Utc>>,
    /// Only read streams that have ingested everything up to `end_time`
    pub only_complete: bool,
}

impl ReaderOptions {
    /// Create new ReaderOptions with default values
    pub fn new() -> Self {
        Self {
            start_time: None,
            end_time: None,
            only_complete: false,
        }
    }

    /// Set start time
    pub fn with_start_time(mut self, start_time: DateTime<Utc>) -> Self {
        self.start_time = Some(start_time);
        self
    }

    /// Set end time
    pub fn with_end_time(mut self, end_time: DateTime<Utc>) -> Self {
        self.end_time = Some(end_time);
        self
    }

    /// Set only_complete
    pub fn with_only_complete(mut self, only_complete: bool) -> Self {
        self.only_complete = only_complete;
        self
    }

    /// Resolve the window, filling in defaults relative to `now`
    pub fn resolve_window(&self, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        let end_time = self.end_time.unwrap_or(now);
        let start_time = self
            .start_time
            .unwrap_or_else(|| end_time - Duration::hours(DEFAULT_WINDOW_HOURS));
        (start_time, end_time)
    }
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Summary of a log stream as returned by `DescribeLogStreams`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogStreamSummary {
    pub log_stream_name: String,
    /// Last ingestion time (Unix milliseconds), absent for empty streams
    pub last_ingestion_time: Option<i64>,
}

impl LogStreamSummary {
    pub fn new(log_stream_name: String, last_ingestion_time: Option<i64>) -> Self {
        Self {
            log_stream_name,
            last_ingestion_time,
        }
    }
}

/// One page of `DescribeLogStreams`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogStreamsPage {
    pub log_streams: Vec<LogStreamSummary>,
    pub next_token: Option<String>,
}

/// Parameters of a single `FilterLogEvents` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterEventsRequest {
    pub log_group_name: String,
    /// Unix milliseconds, inclusive
    pub start_time: i64,
    /// Unix milliseconds, exclusive
    pub end_time: i64,
    pub interleaved: bool,
    /// Restrict to these streams; `None` searches the whole group
    pub log_stream_names: Option<Vec<String>>,
    pub next_token: Option<String>,
}

/// A single delivered log event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEvent {
    /// Name of the log stream this event belongs to
    pub log_stream_name: String,
    /// Raw flow-log line
    pub message: String,
    /// Event timestamp (Unix milliseconds)
    pub timestamp: Option<i64>,
    /// Time when the event was ingested (Unix milliseconds)
    pub ingestion_time: Option<i64>,
}

impl LogEvent {
    /// Create a new log event
    pub fn new(log_stream_name: String, message: String) -> Self {
        Self {
            log_stream_name,
            message,
            timestamp: None,
            ingestion_time: None,
        }
    }

    /// Create log event with timestamps
    pub fn with_times(
        log_stream_name: String,
        message: String,
        timestamp: i64,
        ingestion_time: i64,
    ) -> Self {
        Self {
            log_stream_name,
            message,
            timestamp: Some(timestamp),
            ingestion_time: Some(ingestion_time),
        }
    }
}

/// One page of `FilterLogEvents`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEventsPage {
    pub events: Vec<LogEvent>,
    pub next_token: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_reader_options_defaults() {
        let options = ReaderOptions::default();

        assert!(options.start_time.is_none());
        assert!(options.end_time.is_none());
        assert!(!options.only_complete);
    }

    #[test]
    fn test_resolve_window_defaults_to_last_hour() {
        let now = Utc.with_ymd_and_hms(2015, 8, 12, 13, 0, 0).unwrap();

        let (start, end) = ReaderOptions::new().resolve_window(now);
        assert_eq!(end, now);
        assert_eq!(start, Utc.with_ymd_and_hms(2015, 8, 12, 12, 0, 0).unwrap());
    }

    #[test]
    fn test_resolve_window_relative_to_end_time() {
        let now = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let end_time = Utc.with_ymd_and_hms(2015, 8, 12, 13, 0, 0).unwrap();

        let options = ReaderOptions::new()
            .with_end_time(end_time)
            .with_only_complete(true);
        let (start, end) = options.resolve_window(now);

        assert!(options.only_complete);
        assert_eq!(end, end_time);
        assert_eq!(start, Utc.with_ymd_and_hms(2015, 8, 12, 12, 0, 0).unwrap());
    }

    #[test]
    fn test_resolve_window_explicit() {
        let now = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let start_time = Utc.with_ymd_and_hms(2015, 8, 12, 0, 0, 0).unwrap();
        let end_time = Utc.with_ymd_and_hms(2015, 8, 13, 0, 0, 0).unwrap();

        let (start, end) = ReaderOptions::new()
            .with_start_time(start_time)
            .with_end_time(end_time)
            .resolve_window(now);

        assert_eq!((start, end), (start_time, end_time));
    }

    #[test]
    fn test_log_event_serialization() {
        let event = LogEvent::with_times(
            "eni-102010ab-all".to_string(),
            "2 123456789010 eni-102010ab - - - - - - - 1 2 - NODATA".to_string(),
            1000,
            2000,
        );

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("eni-102010ab-all"));

        let deserialized: LogEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, event);
    }
}
