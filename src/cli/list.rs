//! List command implementation

use chrono::{DateTime, Utc};
use clap::Parser;
use serde_json::json;
use tracing::info;

use super::time::{parse_end_time, parse_start_time};
use super::{Cli, CliError, OutputFormat};
use crate::fetcher::LogLister;
use crate::keys::{decode, LogType};

/// Arguments for listing log objects
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Host identifier the logs belong to (e.g., f6g4s8v3)
    #[arg(long)]
    pub host: String,

    /// Log type (e.g., cds)
    #[arg(long)]
    pub log_type: String,

    /// Range start, inclusive (YYYY-MM-DD or RFC3339)
    #[arg(long)]
    pub start: String,

    /// Range end, exclusive (YYYY-MM-DD or RFC3339)
    #[arg(long)]
    pub end: String,
}

/// Parsed listing query shared by `list` and `fetch`
pub(crate) struct ListQuery {
    pub host: String,
    pub log_type: LogType,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl ListQuery {
    pub(crate) fn parse(host: &str, log_type: &str, start: &str, end: &str) -> Result<Self, CliError> {
        Ok(Self {
            host: host.to_string(),
            log_type: LogType::parse(log_type)?,
            start: parse_start_time(start)?,
            end: parse_end_time(end)?,
        })
    }

    /// Run the listing against the CLI's storage client
    pub(crate) async fn run(&self, cli: &Cli) -> Result<Vec<String>, CliError> {
        let lister = LogLister::new(cli.storage_client()?);
        let urls = lister
            .list(&self.host, &self.log_type, self.start, self.end)
            .await?;
        Ok(urls)
    }
}

impl ListArgs {
    /// Execute the list command
    pub async fn execute(&self, cli: &Cli) -> Result<(), CliError> {
        let query = ListQuery::parse(&self.host, &self.log_type, &self.start, &self.end)?;
        let urls = query.run(cli).await?;
        info!(host = %query.host, objects = urls.len(), "Listed log objects");

        match cli.output_format {
            OutputFormat::Json => {
                let output = json!({
                    "host": query.host,
                    "log_type": query.log_type.as_str(),
                    "start": query.start.to_rfc3339(),
                    "end": query.end.to_rfc3339(),
                    "count": urls.len(),
                    "urls": urls,
                });
                println!("{output}");
            }
            OutputFormat::Human => {
                for url in &urls {
                    println!("{url}");
                }
                eprintln!("{}", summarize(&query.host, &urls));
            }
        }
        Ok(())
    }
}

/// One-line summary with the creation span of the listed objects
fn summarize(host: &str, urls: &[String]) -> String {
    let instants: Vec<DateTime<Utc>> = urls
        .iter()
        .filter_map(|url| url.strip_prefix(&format!("{host}/")).map(str::to_string))
        .filter_map(|key| decode(&key).ok().map(|(_, at)| at))
        .collect();

    match (instants.iter().min(), instants.iter().max()) {
        (Some(first), Some(last)) => format!(
            "{} objects, created {} .. {}",
            urls.len(),
            first.to_rfc3339(),
            last.to_rfc3339()
        ),
        _ => format!("{} objects", urls.len()),
    }
}
