//! flowlogs-reader - AWS VPC Flow Logs from CloudWatch Logs
//!
//! Reads VPC Flow Logs records out of a CloudWatch Logs log group for a time
//! window and parses each line into a typed [`FlowRecord`].
//!
//! # Architecture Overview
//!
//! - **Record model** ([`flow_logs::record`]): immutable [`FlowRecord`] with
//!   exact round-trip serialization to the wire format
//! - **Reader** ([`flow_logs::reader`]): two-level pagination (ready stream
//!   discovery, then event pages) exposed as a lazy `futures::Stream`
//! - **Remote boundary** ([`flow_logs::client`]): the [`flow_logs::LogsApi`]
//!   trait and its AWS SDK implementation
//! - **Configuration** ([`config`]): region/profile overrides on top of the
//!   SDK's default credential chain
//!
//! The library only emits `tracing` events; installing a subscriber is left to
//! the binary or the embedding application.

#![warn(clippy::all, rust_2018_idioms)]

// Include logging macros first
#[macro_use]
pub mod logging_macros;

pub mod config;
pub mod flow_logs;

pub use flow_logs::{FlowLogsReader, FlowRecord, FlowRecordError};
