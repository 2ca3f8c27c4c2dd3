#![warn(clippy::all, rust_2018_idioms)]

use std::io::Write;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use futures::TryStreamExt;
use structopt::StructOpt;
use tracing_subscriber::prelude::*;

use flowlogs_reader::config::AwsSettings;
use flowlogs_reader::flow_logs::{CloudWatchLogsApi, FlowLogsReader, ReaderOptions};
use flowlogs_reader::{trace_error, trace_info};

const DEFAULT_LOG_FILTER: &str =
    "flowlogs_reader=info,aws_config=warn,aws_smithy_runtime=warn,aws_smithy_runtime_api=warn,hyper=warn";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => bail!("unknown output format: {} (expected text or json)", other),
        }
    }
}

/// Print VPC Flow Logs records from a CloudWatch Logs log group
#[derive(Debug, StructOpt)]
#[structopt(name = "flowlogs-reader")]
struct Opt {
    /// Log group the flow logs are delivered to
    log_group_name: String,
    /// AWS region (defaults to the SDK provider chain)
    #[structopt(long)]
    region: Option<String>,
    /// Named profile from the shared AWS config
    #[structopt(long)]
    profile: Option<String>,
    /// Window start, RFC 3339 or "YYYY-MM-DD HH:MM:SS" in UTC (default: one hour before end)
    #[structopt(long, parse(try_from_str = parse_time))]
    start_time: Option<DateTime<Utc>>,
    /// Window end, RFC 3339 or "YYYY-MM-DD HH:MM:SS" in UTC (default: now)
    #[structopt(long, parse(try_from_str = parse_time))]
    end_time: Option<DateTime<Utc>>,
    /// Only read streams that have ingested the whole window
    #[structopt(long)]
    only_complete: bool,
    /// Output format: text or json
    #[structopt(long, default_value = "text")]
    format: OutputFormat,
}

fn parse_time(value: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }

    let naive = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
        .with_context(|| format!("invalid time: {}", value))?;
    Ok(naive.and_utc())
}

fn init_logging() {
    // RUST_LOG takes precedence over the built-in filter
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run(opt: Opt) -> Result<()> {
    let settings = AwsSettings::new(opt.region, opt.profile);
    let api = CloudWatchLogsApi::from_settings(&settings).await;

    let mut options = ReaderOptions::new().with_only_complete(opt.only_complete);
    if let Some(start_time) = opt.start_time {
        options = options.with_start_time(start_time);
    }
    if let Some(end_time) = opt.end_time {
        options = options.with_end_time(end_time);
    }

    let reader = FlowLogsReader::new(Arc::new(api), opt.log_group_name, options);
    trace_info!("Reading {:?}", reader);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let mut count = 0usize;

    let mut records = reader.records();
    while let Some(record) = records.try_next().await? {
        match opt.format {
            OutputFormat::Text => writeln!(out, "{}", record.to_message())?,
            OutputFormat::Json => writeln!(out, "{}", serde_json::to_string(&record)?)?,
        }
        count += 1;
    }

    trace_info!("Printed {} records", count);
    Ok(())
}

#[tokio::main]
async fn main() {
    let opt = Opt::from_args();
    init_logging();

    trace_info!(
        "flowlogs-reader {} ({}) starting",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_COMMIT")
    );

    if let Err(e) = run(opt).await {
        trace_error!("{:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
