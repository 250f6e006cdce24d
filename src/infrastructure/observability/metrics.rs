//! Prometheus metrics infrastructure

use std::sync::Arc;
use std::time::Duration;

use axum::{Router, extract::State, response::IntoResponse, routing::get};
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::Lazy;
use regex::Regex;

use super::config::MetricsConfig;

static UUID_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(job-|src-)?[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}").unwrap()
});

static SOURCE_SEGMENT_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/sources/[^/]+").unwrap());

/// Prometheus metrics handle for serving metrics endpoint
#[derive(Clone)]
pub struct PrometheusMetrics {
    handle: Arc<PrometheusHandle>,
}

impl PrometheusMetrics {
    /// Get the metrics as a string for the /metrics endpoint
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

/// Initialize Prometheus metrics
pub fn init_metrics(config: &MetricsConfig) -> Option<PrometheusMetrics> {
    if !config.enabled {
        tracing::info!("Prometheus metrics disabled");
        return None;
    }

    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            gauge!("federated_search_info", "version" => env!("CARGO_PKG_VERSION")).set(1.0);
            tracing::info!("Prometheus metrics initialized at {}", config.path);

            Some(PrometheusMetrics {
                handle: Arc::new(handle),
            })
        }
        Err(e) => {
            tracing::error!("Failed to initialize Prometheus metrics: {}", e);
            None
        }
    }
}

/// Create the metrics router
pub fn create_metrics_router(metrics: PrometheusMetrics, path: &str) -> Router {
    Router::new()
        .route(path, get(metrics_handler))
        .with_state(metrics)
}

async fn metrics_handler(State(metrics): State<PrometheusMetrics>) -> impl IntoResponse {
    metrics.render()
}

/// Record an HTTP request metric
pub fn record_http_request(method: &str, path: &str, status: u16, duration: Duration) {
    let labels = [
        ("method", method.to_string()),
        ("path", sanitize_path(path)),
        ("status", status.to_string()),
    ];

    counter!("http_requests_total", &labels).increment(1);
    histogram!("http_request_duration_seconds", &labels).record(duration.as_secs_f64());

    if status >= 500 {
        counter!("http_server_errors_total", &labels).increment(1);
    }
}

/// Record a federated search
pub fn record_search(sources_queried: usize, degraded: usize, hits: usize, duration: Duration) {
    counter!("search_requests_total").increment(1);
    histogram!("search_duration_seconds").record(duration.as_secs_f64());
    histogram!("search_sources_queried").record(sources_queried as f64);
    histogram!("search_hits_returned").record(hits as f64);

    if degraded > 0 {
        counter!("search_degraded_sources_total").increment(degraded as u64);
    }
}

/// Record one adapter call; `outcome` is `ok`, `error` or `timeout`
pub fn record_adapter_call(source_type: &str, outcome: &'static str, duration: Duration) {
    let labels = [
        ("source_type", source_type.to_string()),
        ("outcome", outcome.to_string()),
    ];

    counter!("search_adapter_calls_total", &labels).increment(1);
    histogram!("search_adapter_duration_seconds", &labels).record(duration.as_secs_f64());
}

/// Record a build job entering a stage
pub fn record_build_stage(stage: &str) {
    counter!("index_build_stage_entries_total", "stage" => stage.to_string()).increment(1);
}

/// Record a build job reaching a terminal stage
pub fn record_build_outcome(outcome: &str, duration: Duration) {
    let labels = [("outcome", outcome.to_string())];

    counter!("index_builds_total", &labels).increment(1);
    histogram!("index_build_duration_seconds", &labels).record(duration.as_secs_f64());
}

/// Sanitize URL path for metric labels (remove IDs, limit cardinality)
fn sanitize_path(path: &str) -> String {
    let path = UUID_PATTERN.replace_all(path, "{id}");
    let path = SOURCE_SEGMENT_PATTERN.replace_all(&path, "/sources/{id}");

    path.chars().take(50).collect()
}
