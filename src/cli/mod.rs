//! CLI command implementations

pub mod download;
pub mod error;
pub mod list;
pub mod status;
pub mod time;

pub use download::{DownloadArgs, FetchArgs};
pub use error::CliError;
pub use list::ListArgs;
pub use status::StatusArgs;

use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use crate::fetcher::{LogCredential, StorageConfig, StorageHttpClient};

/// CDN log downloader CLI
#[derive(Parser, Debug)]
#[command(name = "cdn-log-downloader")]
#[command(about = "List and download CDN access logs from log storage", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Log storage base URL (e.g., https://logs.example.com/v1)
    #[arg(long, global = true, env = "CDN_LOGS_BASE_URL")]
    pub base_url: Option<String>,

    /// Bearer token for the log storage service
    #[arg(long, global = true, env = "CDN_LOGS_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Output format (json or human)
    #[arg(long = "format", global = true, default_value = "human")]
    pub output_format: OutputFormat,

    /// Serve Prometheus metrics on this address (e.g., 127.0.0.1:9090)
    #[arg(long, global = true)]
    pub metrics_addr: Option<SocketAddr>,

    /// TCP/TLS connect timeout in seconds
    #[arg(long, global = true, default_value_t = 10)]
    pub connect_timeout_secs: u64,

    /// Whole-request timeout in seconds, including the body
    #[arg(long, global = true, default_value_t = 300)]
    pub request_timeout_secs: u64,
}

/// CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List log objects of one type created in a time range
    List(ListArgs),

    /// List a time range, then download everything it contains
    Fetch(FetchArgs),

    /// Download explicit URLs or `<host>/<key>` paths
    Download(DownloadArgs),

    /// Summarize a destination directory's download ledger
    Status(StatusArgs),
}

/// Output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// Human-readable output
    Human,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "human" => Ok(OutputFormat::Human),
            _ => Err(format!("Invalid output format: {s}. Valid options: json, human")),
        }
    }
}

impl Cli {
    /// Run the selected command
    pub async fn execute(&self) -> Result<(), CliError> {
        match &self.command {
            Commands::List(args) => args.execute(self).await,
            Commands::Fetch(args) => args.execute(self).await,
            Commands::Download(args) => args.execute(self).await,
            Commands::Status(args) => args.execute(self),
        }
    }

    /// Storage connection settings from the global flags
    pub fn storage_config(&self) -> Result<StorageConfig, CliError> {
        let base_url = self.base_url.as_deref().ok_or_else(|| {
            CliError::ConfigurationError(
                "log storage base URL is required (--base-url or CDN_LOGS_BASE_URL)".to_string(),
            )
        })?;
        Ok(StorageConfig::new(base_url)?
            .with_connect_timeout(Duration::from_secs(self.connect_timeout_secs))
            .with_request_timeout(Duration::from_secs(self.request_timeout_secs)))
    }

    /// Authenticated client shared by listing and downloading
    ///
    /// A missing token is not an error here; the first operation reports it.
    pub fn storage_client(&self) -> Result<Arc<StorageHttpClient>, CliError> {
        let config = self.storage_config()?;
        let credential = self.token.as_deref().map(LogCredential::new);
        Ok(Arc::new(StorageHttpClient::from_config(&config, credential)?))
    }
}
