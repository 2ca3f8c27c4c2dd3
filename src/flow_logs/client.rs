//! CloudWatch Logs Client Wrapper
//!
//! [`LogsApi`] is the narrow slice of CloudWatch Logs the reader depends on.
//! [`CloudWatchLogsApi`] implements it on top of the AWS SDK; tests script
//! their own implementations.

#![warn(clippy::all, rust_2018_idioms)]

use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_sdk_cloudwatchlogs as cloudwatchlogs;

use crate::config::AwsSettings;

use super::types::{FilterEventsRequest, LogEvent, LogEventsPage, LogStreamSummary, LogStreamsPage};

/// Paginated CloudWatch Logs operations used by the reader
#[async_trait]
pub trait LogsApi: Send + Sync {
    /// Fetch one page of log stream descriptions for a log group
    async fn describe_log_streams(
        &self,
        log_group_name: &str,
        next_token: Option<String>,
    ) -> Result<LogStreamsPage>;

    /// Fetch one page of log events
    async fn filter_log_events(&self, request: FilterEventsRequest) -> Result<LogEventsPage>;
}

/// [`LogsApi`] backed by `aws_sdk_cloudwatchlogs`
#[derive(Clone)]
pub struct CloudWatchLogsApi {
    client: cloudwatchlogs::Client,
}

impl CloudWatchLogsApi {
    /// Wrap an existing SDK client
    pub fn new(client: cloudwatchlogs::Client) -> Self {
        Self { client }
    }

    /// Build a client from region/profile settings and the default credential chain
    pub async fn from_settings(settings: &AwsSettings) -> Self {
        let aws_config = settings.load_sdk_config().await;
        Self::new(cloudwatchlogs::Client::new(&aws_config))
    }
}

#[async_trait]
impl LogsApi for CloudWatchLogsApi {
    async fn describe_log_streams(
        &self,
        log_group_name: &str,
        next_token: Option<String>,
    ) -> Result<LogStreamsPage> {
        let response = self
            .client
            .describe_log_streams()
            .log_group_name(log_group_name)
            .set_next_token(next_token)
            .send()
            .await
            .with_context(|| {
                format!(
                    "Failed to describe log streams for log group: {}",
                    log_group_name
                )
            })?;

        let mut log_streams = Vec::new();

        if let Some(streams) = response.log_streams {
            for stream in streams {
                if let Some(name) = stream.log_stream_name {
                    log_streams.push(LogStreamSummary::new(name, stream.last_ingestion_time));
                }
            }
        }

        Ok(LogStreamsPage {
            log_streams,
            next_token: response.next_token,
        })
    }

    async fn filter_log_events(&self, request: FilterEventsRequest) -> Result<LogEventsPage> {
        // `interleaved` is deprecated upstream but still accepted
        #[allow(deprecated)]
        let builder = self
            .client
            .filter_log_events()
            .log_group_name(&request.log_group_name)
            .start_time(request.start_time)
            .end_time(request.end_time)
            .interleaved(request.interleaved)
            .set_log_stream_names(request.log_stream_names)
            .set_next_token(request.next_token);

        let response = builder.send().await.with_context(|| {
            format!(
                "Failed to filter log events from log group: {}",
                request.log_group_name
            )
        })?;

        let mut events = Vec::new();

        if let Some(aws_events) = response.events {
            for event in aws_events {
                events.push(LogEvent {
                    log_stream_name: event.log_stream_name.unwrap_or_default(),
                    message: event.message.unwrap_or_default(),
                    timestamp: event.timestamp,
                    ingestion_time: event.ingestion_time,
                });
            }
        }

        Ok(LogEventsPage {
            events,
            next_token: response.next_token,
        })
    }
}
