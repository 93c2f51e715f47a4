//! Prometheus Metrics Definitions
//!
//! Defines the didbrowse metrics and exposes a /metrics endpoint for
//! Prometheus scraping.

use axum::{http::StatusCode, response::IntoResponse};
use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_histogram_vec, CounterVec, Encoder, HistogramVec, TextEncoder,
};

use crate::error::{ApiError, ApiResult};

/// HTTP request latency buckets (seconds)
/// Covers: 1ms, 5ms, 10ms, 25ms, 50ms, 100ms, 250ms, 500ms, 1s, 2.5s, 5s, 10s
const HTTP_LATENCY_BUCKETS: &[f64] = &[
    0.001, 0.005, 0.010, 0.025, 0.050, 0.100, 0.250, 0.500, 1.0, 2.5, 5.0, 10.0,
];

/// Remote replica-service latency buckets (seconds), up to the default timeout.
const REMOTE_LATENCY_BUCKETS: &[f64] = &[0.010, 0.050, 0.100, 0.250, 0.500, 1.0, 2.5, 5.0, 10.0, 30.0];

/// Global metrics instance - initialized once at startup
pub static METRICS: Lazy<ApiResult<DidBrowseMetrics>> = Lazy::new(DidBrowseMetrics::new);

#[derive(Clone)]
pub struct DidBrowseMetrics {
    /// HTTP request counter - labels: method, path, status
    pub http_requests_total: CounterVec,

    /// HTTP request duration histogram - labels: method, path
    pub http_request_duration_seconds: HistogramVec,

    /// Attached-files lookups - labels: namespace, result (hit/miss/bypass)
    pub cache_lookups_total: CounterVec,

    /// Remote fetches - labels: namespace, status (success/error)
    pub remote_fetches_total: CounterVec,

    /// Remote fetch duration histogram - labels: namespace
    pub remote_fetch_duration_seconds: HistogramVec,
}

impl DidBrowseMetrics {
    /// Create and register all metrics with Prometheus.
    pub fn new() -> ApiResult<Self> {
        Ok(Self {
            http_requests_total: register_counter_vec!(
                "didbrowse_http_requests_total",
                "Total number of HTTP requests",
                &["method", "path", "status"]
            )
            .map_err(|e| ApiError::internal_error(format!("Failed to register http_requests_total: {}", e)))?,

            http_request_duration_seconds: register_histogram_vec!(
                "didbrowse_http_request_duration_seconds",
                "HTTP request duration in seconds",
                &["method", "path"],
                HTTP_LATENCY_BUCKETS.to_vec()
            )
            .map_err(|e| ApiError::internal_error(format!("Failed to register http_request_duration_seconds: {}", e)))?,

            cache_lookups_total: register_counter_vec!(
                "didbrowse_cache_lookups_total",
                "Attached-files lookups by cache outcome",
                &["namespace", "result"]
            )
            .map_err(|e| ApiError::internal_error(format!("Failed to register cache_lookups_total: {}", e)))?,

            remote_fetches_total: register_counter_vec!(
                "didbrowse_remote_fetches_total",
                "Requests made to remote replica services",
                &["namespace", "status"]
            )
            .map_err(|e| ApiError::internal_error(format!("Failed to register remote_fetches_total: {}", e)))?,

            remote_fetch_duration_seconds: register_histogram_vec!(
                "didbrowse_remote_fetch_duration_seconds",
                "Remote replica service request duration in seconds",
                &["namespace"],
                REMOTE_LATENCY_BUCKETS.to_vec()
            )
            .map_err(|e| ApiError::internal_error(format!("Failed to register remote_fetch_duration_seconds: {}", e)))?,
        })
    }

    /// Record an HTTP request.
    pub fn record_http_request(&self, method: &str, path: &str, status: u16, duration_secs: f64) {
        let status_str = status.to_string();
        self.http_requests_total
            .with_label_values(&[method, path, &status_str])
            .inc();
        self.http_request_duration_seconds
            .with_label_values(&[method, path])
            .observe(duration_secs);
    }

    /// Record how a lookup was served: "hit", "miss" or "bypass".
    pub fn record_cache_lookup(&self, namespace: &str, result: &str) {
        self.cache_lookups_total
            .with_label_values(&[namespace, result])
            .inc();
    }

    pub fn record_remote_fetch(&self, namespace: &str, success: bool, duration_secs: f64) {
        let status = if success { "success" } else { "error" };
        self.remote_fetches_total
            .with_label_values(&[namespace, status])
            .inc();
        self.remote_fetch_duration_seconds
            .with_label_values(&[namespace])
            .observe(duration_secs);
    }
}

/// Handler for GET /metrics endpoint.
///
/// Returns Prometheus text format metrics.
pub async fn metrics_handler() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    match encoder.encode(&metric_families, &mut buffer) {
        Ok(_) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            buffer,
        ),
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode metrics");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [("content-type", "text/plain")],
                format!("Failed to encode metrics: {}", e).into_bytes(),
            )
        }
    }
}
