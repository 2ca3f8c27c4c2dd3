//! Flow Logs Reader
//!
//! Streams [`FlowRecord`]s out of a CloudWatch Logs log group for a fixed
//! time window. Events are fetched one page at a time and parsed lazily as
//! the caller polls; at most one page is held in memory.
//!
//! Pagination state belongs to each stream returned by [`FlowLogsReader::records`]
//! or [`FlowLogsReader::read_streams`], not to the reader. Every call starts
//! over from the first page.

#![warn(clippy::all, rust_2018_idioms)]

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};

use super::client::LogsApi;
use super::record::FlowRecord;
use super::types::{FilterEventsRequest, LogEvent, LogEventsPage, ReaderOptions};

/// Position of one iteration over the event pages
enum PageState {
    /// Nothing fetched yet; ready streams are resolved here when required
    Start,
    /// Next page to request
    Fetch {
        log_stream_names: Option<Vec<String>>,
        next_token: Option<String>,
    },
    Done,
}

/// Reads VPC flow-log records from a log group
#[derive(Clone)]
pub struct FlowLogsReader {
    api: Arc<dyn LogsApi>,
    log_group_name: String,
    start_ms: i64,
    end_ms: i64,
    only_complete: bool,
}

impl std::fmt::Debug for FlowLogsReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlowLogsReader")
            .field("log_group_name", &self.log_group_name)
            .field("start_ms", &self.start_ms)
            .field("end_ms", &self.end_ms)
            .field("only_complete", &self.only_complete)
            .finish()
    }
}

impl FlowLogsReader {
    /// Create a reader; unset window bounds default to the hour ending now
    pub fn new(
        api: Arc<dyn LogsApi>,
        log_group_name: impl Into<String>,
        options: ReaderOptions,
    ) -> Self {
        let (start_time, end_time) = options.resolve_window(Utc::now());
        Self::with_window(api, log_group_name, start_time, end_time, options.only_complete)
    }

    /// Create a reader for an explicit `[start_time, end_time)` window
    pub fn with_window(
        api: Arc<dyn LogsApi>,
        log_group_name: impl Into<String>,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        only_complete: bool,
    ) -> Self {
        let log_group_name = log_group_name.into();

        if start_time > end_time {
            trace_warn!(
                "Start time {} is after end time {} for log group {}; no events will match",
                start_time,
                end_time,
                log_group_name
            );
        }

        Self {
            api,
            log_group_name,
            start_ms: start_time.timestamp_millis(),
            end_ms: end_time.timestamp_millis(),
            only_complete,
        }
    }

    pub fn log_group_name(&self) -> &str {
        &self.log_group_name
    }

    /// Window start (Unix milliseconds, inclusive)
    pub fn start_ms(&self) -> i64 {
        self.start_ms
    }

    /// Window end (Unix milliseconds, exclusive)
    pub fn end_ms(&self) -> i64 {
        self.end_ms
    }

    pub fn only_complete(&self) -> bool {
        self.only_complete
    }

    /// Names of streams whose last ingestion is after the window end.
    ///
    /// Stream pages are followed only while each page carries a continuation
    /// token. The first page without one ends discovery.
    pub async fn get_ready_streams(&self) -> Result<Vec<String>> {
        let mut ready_streams = Vec::new();
        let mut next_token = None;
        let mut pages_fetched = 0;

        loop {
            let page = self
                .api
                .describe_log_streams(&self.log_group_name, next_token)
                .await
                .with_context(|| {
                    format!(
                        "Failed to list ready streams for log group: {}",
                        self.log_group_name
                    )
                })?;
            pages_fetched += 1;

            for stream in page.log_streams {
                if stream
                    .last_ingestion_time
                    .is_some_and(|ingested| ingested > self.end_ms)
                {
                    ready_streams.push(stream.log_stream_name);
                }
            }

            match page.next_token {
                Some(token) => next_token = Some(token),
                None => break,
            }
        }

        trace_debug!(
            "Found {} ready streams in {} pages for log group {}",
            ready_streams.len(),
            pages_fetched,
            self.log_group_name
        );

        Ok(ready_streams)
    }

    /// Raw events in the window, interleaved across streams
    pub fn read_streams(&self) -> BoxStream<'_, Result<LogEvent>> {
        stream::try_unfold(PageState::Start, move |state| self.next_page(state))
            .map_ok(|events| stream::iter(events.into_iter().map(Ok::<_, anyhow::Error>)))
            .try_flatten()
            .boxed()
    }

    /// Parsed flow-log records in the window
    pub fn records(&self) -> BoxStream<'_, Result<FlowRecord>> {
        self.read_streams()
            .and_then(|event| async move {
                FlowRecord::from_event(&event).with_context(|| {
                    format!(
                        "Failed to parse flow log record from stream {}: {:?}",
                        event.log_stream_name, event.message
                    )
                })
            })
            .boxed()
    }

    /// Drain [`records`](Self::records) into memory
    pub async fn collect_records(&self) -> Result<Vec<FlowRecord>> {
        let records: Vec<FlowRecord> = self.records().try_collect().await?;
        trace_info!(
            "Read {} flow log records from log group {}",
            records.len(),
            self.log_group_name
        );
        Ok(records)
    }

    /// Advance one iteration by a single page
    async fn next_page(&self, state: PageState) -> Result<Option<(Vec<LogEvent>, PageState)>> {
        let (log_stream_names, next_token) = match state {
            PageState::Start => {
                // Ready streams are resolved once and reused for every page
                let log_stream_names = if self.only_complete {
                    Some(self.get_ready_streams().await?)
                } else {
                    None
                };
                (log_stream_names, None)
            }
            PageState::Fetch {
                log_stream_names,
                next_token,
            } => (log_stream_names, next_token),
            PageState::Done => return Ok(None),
        };

        let page = self.fetch_page(log_stream_names.clone(), next_token).await?;

        // A missing or null token ends the iteration
        let next_state = match page.next_token {
            Some(token) => PageState::Fetch {
                log_stream_names,
                next_token: Some(token),
            },
            None => PageState::Done,
        };

        Ok(Some((page.events, next_state)))
    }

    async fn fetch_page(
        &self,
        log_stream_names: Option<Vec<String>>,
        next_token: Option<String>,
    ) -> Result<LogEventsPage> {
        let request = FilterEventsRequest {
            log_group_name: self.log_group_name.clone(),
            start_time: self.start_ms,
            end_time: self.end_ms,
            interleaved: true,
            log_stream_names,
            next_token,
        };

        let page = self.api.filter_log_events(request).await?;
        trace_debug!(
            "Fetched {} events from log group {} (more: {})",
            page.events.len(),
            self.log_group_name,
            page.next_token.is_some()
        );

        Ok(page)
    }
}
