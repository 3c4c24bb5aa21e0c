//! Download and fetch command implementations

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use super::list::ListQuery;
use super::{Cli, CliError, OutputFormat};
use crate::downloader::progress::format_bytes;
use crate::downloader::{DownloadError, DownloadReport, LogDownloader, ProgressObserver};
use crate::resume::DownloadState;

/// Arguments for downloading explicit URLs
#[derive(Parser, Debug)]
pub struct DownloadArgs {
    /// Destination directory; also holds the `.state` ledger
    #[arg(long)]
    pub dest: PathBuf,

    /// Read additional URLs from a file, one per line
    #[arg(long)]
    pub from_file: Option<PathBuf>,

    /// Absolute URLs or `<host>/<key>` paths
    pub urls: Vec<String>,
}

/// Arguments for listing a range and downloading the result
#[derive(Parser, Debug)]
pub struct FetchArgs {
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

    /// Destination directory; also holds the `.state` ledger
    #[arg(long)]
    pub dest: PathBuf,
}

impl DownloadArgs {
    /// Execute the download command
    pub async fn execute(&self, cli: &Cli) -> Result<(), CliError> {
        let mut urls = self.urls.clone();
        if let Some(path) = &self.from_file {
            urls.extend(read_url_file(path)?);
        }
        if urls.is_empty() {
            return Err(CliError::InvalidArgument(
                "no URLs given (pass them as arguments or with --from-file)".to_string(),
            ));
        }

        run_download(cli, &self.dest, &urls).await
    }
}

impl FetchArgs {
    /// Execute the fetch command
    pub async fn execute(&self, cli: &Cli) -> Result<(), CliError> {
        let query = ListQuery::parse(&self.host, &self.log_type, &self.start, &self.end)?;
        let urls = query.run(cli).await?;
        info!(host = %query.host, objects = urls.len(), "Listed log objects, downloading");

        run_download(cli, &self.dest, &urls).await
    }
}

fn read_url_file(path: &Path) -> Result<Vec<String>, CliError> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        CliError::InvalidArgument(format!("Failed to read URL file {}: {e}", path.display()))
    })?;
    Ok(contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}

async fn run_download(cli: &Cli, dest: &Path, urls: &[String]) -> Result<(), CliError> {
    let observer = Arc::new(BarObserver::new(cli.output_format));
    let downloader = LogDownloader::new(cli.storage_client()?).with_observer(observer.clone());

    let result = downloader.download_many(dest, urls).await;
    observer.finish();

    match cli.output_format {
        OutputFormat::Json => output_json(dest, &result),
        OutputFormat::Human => output_human(dest, &result),
    }
    result.map(|_| ()).map_err(CliError::from)
}

fn output_json(dest: &Path, result: &Result<DownloadReport, DownloadError>) {
    let output = match result {
        Ok(report) => json!({
            "success": true,
            "dest": dest.display().to_string(),
            "completed": report.completed,
            "skipped": report.skipped,
            "bytes_written": report.bytes_written,
            "elapsed_secs": report.elapsed.as_secs_f64(),
            "error": null,
        }),
        Err(e) => {
            let (url, state) = match e {
                DownloadError::Failed { url, state, .. } => (Some(url.clone()), Some(state.code())),
                _ => (None, None),
            };
            json!({
                "success": false,
                "dest": dest.display().to_string(),
                "url": url,
                "state": state,
                "error": e.to_string(),
            })
        }
    };
    println!("{output}");
}

fn output_human(dest: &Path, result: &Result<DownloadReport, DownloadError>) {
    match result {
        Ok(report) => {
            println!("\nDownload completed successfully!");
            println!("Destination: {}", dest.display());
            println!("{report}");
        }
        Err(e) => {
            eprintln!("\nDownload failed!");
            eprintln!("Error: {e}");
            if e.state().is_some() {
                eprintln!("Re-run the same command to resume.");
            }
        }
    }
}

/// Renders engine progress as an `indicatif` bar
struct BarObserver {
    bar: ProgressBar,
}

impl BarObserver {
    fn new(format: OutputFormat) -> Self {
        let bar = match format {
            OutputFormat::Human => ProgressBar::new(0),
            OutputFormat::Json => ProgressBar::hidden(),
        };
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
        {
            bar.set_style(style.progress_chars("#>-"));
        }
        Self { bar }
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl ProgressObserver for BarObserver {
    fn on_batch_started(&self, total: usize) {
        self.bar.set_length(total as u64);
    }

    fn on_skipped(&self, _url: &str) {
        self.bar.inc(1);
    }

    fn on_started(&self, url: &str) {
        let name = url.rsplit('/').next().unwrap_or(url);
        self.bar.set_message(name.to_string());
    }

    fn on_finished(&self, _url: &str, state: DownloadState, bytes: u64) {
        if state.is_complete() {
            self.bar.inc(1);
            self.bar.set_message(format!("+{}", format_bytes(bytes)));
        }
    }
}
