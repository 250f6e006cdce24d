//! Observability infrastructure - Tracing, Metrics, and Logging

mod config;
mod metrics;
mod tracing_setup;

pub use config::{MetricsConfig, ObservabilityConfig, TracingConfig};
pub use metrics::{
    PrometheusMetrics, create_metrics_router, init_metrics, record_adapter_call,
    record_build_outcome, record_build_stage, record_http_request, record_search,
};
pub use tracing_setup::{init_tracing, shutdown_tracing};
