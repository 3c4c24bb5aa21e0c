//! Integration tests for logging and tracing

use cdn_log_downloader::{LogCredential, LogDownloader, StorageConfig, StorageHttpClient};
use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

#[test]
fn test_tracing_subscriber_initialization() {
    // Either succeeds or fails because another test installed one first
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("cdn_log_downloader=debug")),
        )
        .with_test_writer()
        .try_init();

    info!(component = "test", "info with fields");
    warn!(url = "https://s/h1/a.log.gz", state = 11, "warning with fields");
}

/// Writer that collects formatted output for inspection
#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_tracing_json_format() {
    let captured = Captured::default();
    let writer = captured.clone();
    let subscriber = tracing_subscriber::fmt()
        .json()
        .with_env_filter(EnvFilter::new("cdn_log_downloader=info"))
        .with_writer(move || writer.clone())
        .finish();

    tracing::subscriber::with_default(subscriber, || {
        info!(target: "cdn_log_downloader", url = "https://s/h1/a.log.gz", "json event");
        debug!(target: "cdn_log_downloader", "filtered out");
    });

    let output = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines.len(), 1, "{output}");
    let event: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(event["level"], "INFO");
    assert_eq!(event["fields"]["message"], "json event");
    assert_eq!(event["fields"]["url"], "https://s/h1/a.log.gz");
}

#[test]
fn test_env_filter_parsing() {
    for directive in [
        "info",
        "cdn_log_downloader=debug",
        "warn,cdn_log_downloader::fetcher=trace",
    ] {
        assert!(EnvFilter::try_new(directive).is_ok(), "{directive}");
    }
}

#[tokio::test]
async fn test_engine_logs_through_installed_subscriber() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("cdn_log_downloader=trace"))
        .with_test_writer()
        .try_init();

    // Exercises the failure-path events without any network access
    let config = StorageConfig::new("http://127.0.0.1:9").unwrap();
    let client = StorageHttpClient::from_config(&config, Some(LogCredential::new("t"))).unwrap();
    let dest = TempDir::new().unwrap();
    let result = LogDownloader::new(Arc::new(client))
        .download_many(dest.path(), &["://broken"])
        .await;
    assert!(result.is_err());
}
