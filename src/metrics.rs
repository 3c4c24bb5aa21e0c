//! Observability metrics for CDN log retrieval
//!
//! ## Architecture
//!
//! - Uses the `metrics` crate facade; without an installed recorder every
//!   emission is a no-op, so library users pay nothing by default
//! - [`init_metrics`] installs a Prometheus exporter with a scrape endpoint
//! - Listing, HTTP, ledger and per-object download events are all recorded

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use metrics_exporter_prometheus::PrometheusBuilder;
use once_cell::sync::OnceCell;
use std::net::SocketAddr;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::resume::DownloadState;

/// Set once the Prometheus exporter has been installed
static METRICS_INITIALIZED: OnceCell<SocketAddr> = OnceCell::new();

/// Initialize metrics system with Prometheus exporter
///
/// Call once at startup from inside a Tokio runtime. Later calls are no-ops.
///
/// # Arguments
/// * `addr` - Socket address to bind the scrape endpoint (e.g., "0.0.0.0:9090")
pub fn init_metrics(addr: SocketAddr) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(bound) = METRICS_INITIALIZED.get() {
        debug!(addr = %bound, "Metrics already initialized, skipping");
        return Ok(());
    }

    info!("Initializing metrics system on {}", addr);

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {e}"))?;

    describe_counter!(
        "cdn_logs_http_requests_total",
        Unit::Count,
        "Total number of HTTP requests made to the log storage service"
    );

    describe_histogram!(
        "cdn_logs_http_request_duration_seconds",
        Unit::Seconds,
        "HTTP request duration in seconds, headers only"
    );

    describe_counter!(
        "cdn_logs_listing_requests_total",
        Unit::Count,
        "Listing requests issued, including bisected sub-ranges"
    );

    describe_counter!(
        "cdn_logs_listing_bisections_total",
        Unit::Count,
        "Listing ranges split because the response hit the truncation ceiling"
    );

    describe_counter!(
        "cdn_logs_downloads_total",
        Unit::Count,
        "Download attempts by final state"
    );

    describe_counter!(
        "cdn_logs_download_bytes_total",
        Unit::Bytes,
        "Bytes written to local log files"
    );

    describe_histogram!(
        "cdn_logs_download_duration_seconds",
        Unit::Seconds,
        "Wall time of a single object download"
    );

    describe_counter!(
        "cdn_logs_ledger_evictions_total",
        Unit::Count,
        "Ledger entries evicted from memory to respect the footprint limit"
    );

    let _ = METRICS_INITIALIZED.set(addr);
    info!("Metrics system initialized successfully on {}", addr);
    Ok(())
}

/// Check if the Prometheus exporter is installed
pub fn is_initialized() -> bool {
    METRICS_INITIALIZED.get().is_some()
}

/// Record one HTTP exchange with the storage service
///
/// `status` is the numeric status, or `None` when the request never got a response.
pub fn record_http_request(status: Option<u16>, duration: Duration) {
    let status = status.map_or_else(|| "network_error".to_string(), |s| s.to_string());
    counter!("cdn_logs_http_requests_total", "status" => status).increment(1);
    histogram!("cdn_logs_http_request_duration_seconds").record(duration.as_secs_f64());
}

/// Per-object download metrics
pub struct DownloadMetrics {
    url: String,
    start_time: Instant,
}

impl DownloadMetrics {
    /// Start tracking one object download
    pub fn start(url: impl Into<String>) -> Self {
        let url = url.into();
        debug!(url = %url, "Download started");
        Self {
            url,
            start_time: Instant::now(),
        }
    }

    /// Record successful completion
    pub fn record_success(&self, bytes: u64) {
        let duration = self.start_time.elapsed();

        counter!("cdn_logs_downloads_total", "state" => DownloadState::Completed.code().to_string())
            .increment(1);
        counter!("cdn_logs_download_bytes_total").increment(bytes);
        histogram!("cdn_logs_download_duration_seconds").record(duration.as_secs_f64());

        info!(
            url = %self.url,
            bytes = bytes,
            duration_ms = duration.as_millis(),
            "Download completed"
        );
    }

    /// Record a failed attempt
    pub fn record_failure(&self, state: DownloadState, reason: &str) {
        let duration = self.start_time.elapsed();

        counter!("cdn_logs_downloads_total", "state" => state.code().to_string()).increment(1);
        histogram!("cdn_logs_download_duration_seconds").record(duration.as_secs_f64());

        warn!(
            url = %self.url,
            state = %state,
            reason = %reason,
            duration_ms = duration.as_millis(),
            "Download failed"
        );
    }
}
