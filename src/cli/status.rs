//! Status command implementation

use clap::Parser;
use serde_json::json;
use std::collections::BTreeMap;
use std::path::PathBuf;

use super::{Cli, CliError, OutputFormat};
use crate::resume::{DownloadState, Ledger};

/// Arguments for inspecting a destination directory
#[derive(Parser, Debug)]
pub struct StatusArgs {
    /// Destination directory holding the `.state` ledger
    #[arg(long)]
    pub dest: PathBuf,
}

/// Ledger summary for one destination directory
#[derive(Debug, Default, PartialEq, Eq)]
pub struct LedgerSummary {
    /// Entry count by state
    pub by_state: BTreeMap<DownloadState, usize>,
    /// URLs whose last attempt failed, most recent first
    pub failed: Vec<(String, DownloadState)>,
}

impl LedgerSummary {
    /// Tally a loaded ledger
    pub fn from_ledger(ledger: &Ledger) -> Self {
        let mut summary = Self::default();
        for (url, record) in ledger.iter() {
            *summary.by_state.entry(record.state).or_default() += 1;
            if record.state.is_failure() {
                summary.failed.push((url.to_string(), record.state));
            }
        }
        summary
    }

    /// Total entries
    pub fn total(&self) -> usize {
        self.by_state.values().sum()
    }
}

impl StatusArgs {
    /// Execute the status command
    ///
    /// Reads `.state` without taking the directory lock, so it can be used
    /// while a download is running.
    pub fn execute(&self, cli: &Cli) -> Result<(), CliError> {
        let ledger = Ledger::open(&self.dest);
        let summary = LedgerSummary::from_ledger(&ledger);

        match cli.output_format {
            OutputFormat::Json => {
                let states: BTreeMap<String, usize> = summary
                    .by_state
                    .iter()
                    .map(|(state, count)| (state.code().to_string(), *count))
                    .collect();
                let failed: Vec<_> = summary
                    .failed
                    .iter()
                    .map(|(url, state)| json!({ "url": url, "state": state.code() }))
                    .collect();
                let output = json!({
                    "ledger": ledger.path().display().to_string(),
                    "total": summary.total(),
                    "states": states,
                    "failed": failed,
                });
                println!("{output}");
            }
            OutputFormat::Human => {
                println!("Ledger: {}", ledger.path().display());
                println!("Entries: {}", summary.total());
                for (state, count) in &summary.by_state {
                    println!("  {state}: {count}");
                }
                for (url, state) in &summary.failed {
                    println!("  failed {state}: {url}");
                }
            }
        }
        Ok(())
    }
}
