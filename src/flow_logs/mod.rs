//! VPC Flow Logs Module
//!
//! Reads AWS VPC Flow Logs records delivered to a CloudWatch Logs log group.
//!
//! ## Features
//!
//! - Parse and re-serialize version 2 flow-log lines
//! - Lazy, page-at-a-time retrieval over a time window
//! - Optional restriction to streams that have finished ingesting the window
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use futures::TryStreamExt;
//! use flowlogs_reader::config::AwsSettings;
//! use flowlogs_reader::flow_logs::{CloudWatchLogsApi, FlowLogsReader, ReaderOptions};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let api = CloudWatchLogsApi::from_settings(&AwsSettings::default()).await;
//! let reader = FlowLogsReader::new(
//!     Arc::new(api),
//!     "flowlog_group",
//!     ReaderOptions::new().with_only_complete(true),
//! );
//!
//! let mut records = reader.records();
//! while let Some(record) = records.try_next().await? {
//!     println!("{}", record.to_message());
//! }
//! # Ok(())
//! # }
//! ```

#![warn(clippy::all, rust_2018_idioms)]

pub mod client;
pub mod reader;
pub mod record;
pub mod types;

// Re-export commonly used types
pub use client::{CloudWatchLogsApi, LogsApi};
pub use reader::FlowLogsReader;
pub use record::{FieldValue, FlowRecord, FlowRecordError, NO_DATA};
pub use types::{
    FilterEventsRequest, LogEvent, LogEventsPage, LogStreamSummary, LogStreamsPage, ReaderOptions,
};
