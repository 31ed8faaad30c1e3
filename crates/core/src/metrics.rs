//! Metrics definitions for the search service.
//!
//! This module defines all metrics used throughout the service.
//! Metrics are collected using the `metrics` crate and can be exported
//! to Prometheus via `metrics-exporter-prometheus`.

use metrics::{counter, describe_counter, describe_histogram, histogram};
use std::time::Instant;

/// Initialize all metric descriptions.
/// Call this once at startup before any metrics are recorded.
pub fn init_metrics() {
    describe_counter!(
        "search_pages_total",
        "Total number of search pages served"
    );
    describe_counter!(
        "search_errors_total",
        "Total number of failed search page fetches, by error kind"
    );
    describe_counter!(
        "cursor_rejections_total",
        "Total number of rejected cursor tokens, by rejection kind"
    );
    describe_histogram!(
        "search_page_duration_seconds",
        "Time taken to serve one search page in seconds"
    );
}

/// Record a successfully served page.
pub fn record_page_served() {
    counter!("search_pages_total").increment(1);
}

/// Record a failed page fetch.
///
/// # Arguments
/// * `kind` - The error family ("cursor", "query", "engine")
pub fn record_search_error(kind: &str) {
    counter!("search_errors_total", "kind" => kind.to_string()).increment(1);
}

/// Record a rejected cursor token.
///
/// # Arguments
/// * `kind` - The rejection kind ("malformed" or "incompatible")
pub fn record_cursor_rejection(kind: &str) {
    counter!("cursor_rejections_total", "kind" => kind.to_string()).increment(1);
}

/// Record page-serving duration.
pub fn record_page_duration(duration_secs: f64) {
    histogram!("search_page_duration_seconds").record(duration_secs);
}

/// A timer that automatically records duration when dropped.
pub struct PageTimer {
    start: Instant,
}

impl PageTimer {
    /// Start a new page timer.
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for PageTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for PageTimer {
    fn drop(&mut self) {
        let duration = self.start.elapsed().as_secs_f64();
        record_page_duration(duration);
    }
}
