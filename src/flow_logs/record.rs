//! VPC Flow Log Record
//!
//! Parsing and re-serialization of a single version 2 flow-log line:
//!
//! ```text
//! version account_id interface_id srcaddr dstaddr srcport dstport protocol packets bytes start end action log_status
//! ```
//!
//! A `-` token means "no data" and decodes to `None`.

#![warn(clippy::all, rust_2018_idioms)]

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::types::LogEvent;

/// Placeholder token for fields without data
pub const NO_DATA: &str = "-";

const TIMESTAMP_DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Errors raised while parsing a flow-log line
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FlowRecordError {
    #[error("expected {expected} fields, found {found}")]
    FieldCount { expected: usize, found: usize },

    #[error("invalid integer for {field}: {token:?}")]
    InvalidInteger { field: &'static str, token: String },

    #[error("invalid timestamp for {field}: {token:?}")]
    InvalidTimestamp { field: &'static str, token: String },

    #[error("invalid text for {field}: {value:?}")]
    InvalidText { field: &'static str, value: String },
}

/// Typed value of a single record field, as returned by [`FlowRecord::to_map`]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldValue {
    Integer(u64),
    Text(String),
    Timestamp(DateTime<Utc>),
    Absent,
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(FieldValue::Absent, Into::into)
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(value: DateTime<Utc>) -> Self {
        FieldValue::Timestamp(value)
    }
}

macro_rules! integer_field_value {
    ($($ty:ty),*) => {
        $(impl From<$ty> for FieldValue {
            fn from(value: $ty) -> Self {
                FieldValue::Integer(u64::from(value))
            }
        })*
    };
}

integer_field_value!(u8, u16, u32, u64);

/// One VPC Flow Logs record.
///
/// Records are immutable once parsed. Equality and hashing cover every field,
/// so records can be deduplicated through a `HashSet`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "FlowRecordFields")]
pub struct FlowRecord {
    version: u32,
    account_id: String,
    interface_id: String,
    srcaddr: Option<String>,
    dstaddr: Option<String>,
    srcport: Option<u16>,
    dstport: Option<u16>,
    protocol: Option<u8>,
    packets: Option<u64>,
    bytes: Option<u64>,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
    action: Option<String>,
    log_status: String,
}

/// Unchecked field set accepted by `Deserialize`, validated into a [`FlowRecord`]
#[derive(Deserialize)]
struct FlowRecordFields {
    version: u32,
    account_id: String,
    interface_id: String,
    srcaddr: Option<String>,
    dstaddr: Option<String>,
    srcport: Option<u16>,
    dstport: Option<u16>,
    protocol: Option<u8>,
    packets: Option<u64>,
    bytes: Option<u64>,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
    action: Option<String>,
    log_status: String,
}

impl TryFrom<FlowRecordFields> for FlowRecord {
    type Error = FlowRecordError;

    /// Apply the same rules as the line parser so the record still
    /// serializes to a line that parses back to itself.
    fn try_from(fields: FlowRecordFields) -> Result<Self, Self::Error> {
        validate_text("account_id", &fields.account_id)?;
        validate_text("interface_id", &fields.interface_id)?;
        validate_optional_text("srcaddr", &fields.srcaddr)?;
        validate_optional_text("dstaddr", &fields.dstaddr)?;
        validate_optional_text("action", &fields.action)?;
        validate_text("log_status", &fields.log_status)?;
        validate_timestamp("start", fields.start)?;
        validate_timestamp("end", fields.end)?;

        Ok(Self {
            version: fields.version,
            account_id: fields.account_id,
            interface_id: fields.interface_id,
            srcaddr: fields.srcaddr,
            dstaddr: fields.dstaddr,
            srcport: fields.srcport,
            dstport: fields.dstport,
            protocol: fields.protocol,
            packets: fields.packets,
            bytes: fields.bytes,
            start: fields.start,
            end: fields.end,
            action: fields.action,
            log_status: fields.log_status,
        })
    }
}

impl FlowRecord {
    /// Field names in wire order
    pub const FIELD_NAMES: [&'static str; 14] = [
        "version",
        "account_id",
        "interface_id",
        "srcaddr",
        "dstaddr",
        "srcport",
        "dstport",
        "protocol",
        "packets",
        "bytes",
        "start",
        "end",
        "action",
        "log_status",
    ];

    /// Parse a raw flow-log line
    pub fn from_message(message: &str) -> Result<Self, FlowRecordError> {
        let tokens: Vec<&str> = message.split_whitespace().collect();
        if tokens.len() != Self::FIELD_NAMES.len() {
            return Err(FlowRecordError::FieldCount {
                expected: Self::FIELD_NAMES.len(),
                found: tokens.len(),
            });
        }

        Ok(Self {
            version: parse_integer("version", tokens[0])?,
            account_id: tokens[1].to_string(),
            interface_id: tokens[2].to_string(),
            srcaddr: parse_text(tokens[3]),
            dstaddr: parse_text(tokens[4]),
            srcport: parse_optional_integer("srcport", tokens[5])?,
            dstport: parse_optional_integer("dstport", tokens[6])?,
            protocol: parse_optional_integer("protocol", tokens[7])?,
            packets: parse_optional_integer("packets", tokens[8])?,
            bytes: parse_optional_integer("bytes", tokens[9])?,
            start: parse_timestamp("start", tokens[10])?,
            end: parse_timestamp("end", tokens[11])?,
            action: parse_text(tokens[12]),
            log_status: tokens[13].to_string(),
        })
    }

    /// Parse the `message` carried by a delivered log event
    pub fn from_event(event: &LogEvent) -> Result<Self, FlowRecordError> {
        Self::from_message(&event.message)
    }

    /// Serialize back to the space-separated wire format
    pub fn to_message(&self) -> String {
        self.tokens().join(" ")
    }

    /// Field name to typed value
    pub fn to_map(&self) -> BTreeMap<&'static str, FieldValue> {
        let values: [FieldValue; 14] = [
            self.version.into(),
            self.account_id.clone().into(),
            self.interface_id.clone().into(),
            self.srcaddr.clone().into(),
            self.dstaddr.clone().into(),
            self.srcport.into(),
            self.dstport.into(),
            self.protocol.into(),
            self.packets.into(),
            self.bytes.into(),
            self.start.into(),
            self.end.into(),
            self.action.clone().into(),
            self.log_status.clone().into(),
        ];

        Self::FIELD_NAMES.into_iter().zip(values).collect()
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    pub fn interface_id(&self) -> &str {
        &self.interface_id
    }

    pub fn srcaddr(&self) -> Option<&str> {
        self.srcaddr.as_deref()
    }

    pub fn dstaddr(&self) -> Option<&str> {
        self.dstaddr.as_deref()
    }

    pub fn srcport(&self) -> Option<u16> {
        self.srcport
    }

    pub fn dstport(&self) -> Option<u16> {
        self.dstport
    }

    pub fn protocol(&self) -> Option<u8> {
        self.protocol
    }

    pub fn packets(&self) -> Option<u64> {
        self.packets
    }

    pub fn bytes(&self) -> Option<u64> {
        self.bytes
    }

    /// Start of the capture window
    pub fn start(&self) -> Option<DateTime<Utc>> {
        self.start
    }

    /// End of the capture window
    pub fn end(&self) -> Option<DateTime<Utc>> {
        self.end
    }

    pub fn action(&self) -> Option<&str> {
        self.action.as_deref()
    }

    pub fn log_status(&self) -> &str {
        &self.log_status
    }

    /// Wire tokens in field order, `-` for absent values
    fn tokens(&self) -> [String; 14] {
        [
            self.version.to_string(),
            self.account_id.clone(),
            self.interface_id.clone(),
            text_token(&self.srcaddr),
            text_token(&self.dstaddr),
            integer_token(self.srcport),
            integer_token(self.dstport),
            integer_token(self.protocol),
            integer_token(self.packets),
            integer_token(self.bytes),
            integer_token(self.start.map(|ts| ts.timestamp())),
            integer_token(self.end.map(|ts| ts.timestamp())),
            text_token(&self.action),
            self.log_status.clone(),
        ]
    }
}

impl fmt::Display for FlowRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tokens = self.tokens();
        // Timestamps display as calendar time rather than epoch seconds
        tokens[10] = display_timestamp(self.start);
        tokens[11] = display_timestamp(self.end);

        for (i, (name, value)) in Self::FIELD_NAMES.iter().zip(tokens.iter()).enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}: {}", name, value)?;
        }
        Ok(())
    }
}

impl FromStr for FlowRecord {
    type Err = FlowRecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_message(s)
    }
}

impl TryFrom<&LogEvent> for FlowRecord {
    type Error = FlowRecordError;

    fn try_from(event: &LogEvent) -> Result<Self, Self::Error> {
        Self::from_event(event)
    }
}

fn parse_text(token: &str) -> Option<String> {
    (token != NO_DATA).then(|| token.to_string())
}

fn parse_integer<T: FromStr>(field: &'static str, token: &str) -> Result<T, FlowRecordError> {
    let invalid = || FlowRecordError::InvalidInteger {
        field,
        token: token.to_string(),
    };

    // Canonical decimal only (no sign, no leading zeros) so the token round-trips
    let canonical = !token.is_empty()
        && token.bytes().all(|b| b.is_ascii_digit())
        && (token == "0" || !token.starts_with('0'));
    if !canonical {
        return Err(invalid());
    }
    token.parse().map_err(|_| invalid())
}

fn parse_optional_integer<T: FromStr>(
    field: &'static str,
    token: &str,
) -> Result<Option<T>, FlowRecordError> {
    if token == NO_DATA {
        return Ok(None);
    }
    parse_integer(field, token).map(Some)
}

fn parse_timestamp(
    field: &'static str,
    token: &str,
) -> Result<Option<DateTime<Utc>>, FlowRecordError> {
    let Some(seconds) = parse_optional_integer::<i64>(field, token).map_err(|_| {
        FlowRecordError::InvalidTimestamp {
            field,
            token: token.to_string(),
        }
    })?
    else {
        return Ok(None);
    };

    DateTime::from_timestamp(seconds, 0)
        .map(Some)
        .ok_or_else(|| FlowRecordError::InvalidTimestamp {
            field,
            token: token.to_string(),
        })
}

/// Text must be a single non-empty token
fn validate_text(field: &'static str, value: &str) -> Result<(), FlowRecordError> {
    if value.is_empty() || value.chars().any(char::is_whitespace) {
        return Err(FlowRecordError::InvalidText {
            field,
            value: value.to_string(),
        });
    }
    Ok(())
}

/// `-` is reserved for absence in optional fields
fn validate_optional_text(
    field: &'static str,
    value: &Option<String>,
) -> Result<(), FlowRecordError> {
    match value.as_deref() {
        Some(NO_DATA) => Err(FlowRecordError::InvalidText {
            field,
            value: NO_DATA.to_string(),
        }),
        Some(text) => validate_text(field, text),
        None => Ok(()),
    }
}

fn validate_timestamp(
    field: &'static str,
    value: Option<DateTime<Utc>>,
) -> Result<(), FlowRecordError> {
    match value {
        Some(ts) if ts.timestamp_subsec_nanos() != 0 => Err(FlowRecordError::InvalidTimestamp {
            field,
            token: ts.to_rfc3339(),
        }),
        _ => Ok(()),
    }
}

fn text_token(value: &Option<String>) -> String {
    value.clone().unwrap_or_else(|| NO_DATA.to_string())
}

fn integer_token<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| NO_DATA.to_string(), |v| v.to_string())
}

fn display_timestamp(value: Option<DateTime<Utc>>) -> String {
    value.map_or_else(
        || NO_DATA.to_string(),
        |ts| ts.format(TIMESTAMP_DISPLAY_FORMAT).to_string(),
    )
}
