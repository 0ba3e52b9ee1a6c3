//! Metrics for the ewm services.
//!
//! This crate provides:
//! - Prometheus recorder installation and the `/metrics` rendering
//! - HTTP request metrics middleware
//! - Domain counters for the event service ([`EventMetrics`]) and the
//!   statistics service ([`StatsMetrics`])
//!
//! # Example
//!
//! ```rust,ignore
//! use observability::{init_metrics, metrics_handler, EventMetrics};
//!
//! init_metrics()?;
//! EventMetrics::record_published();
//!
//! let app = Router::new().route("/metrics", get(metrics_handler));
//! ```

pub mod events;
pub mod middleware;
pub mod stats;

pub use events::EventMetrics;
pub use middleware::metrics_middleware;
pub use stats::StatsMetrics;

pub use metrics::{counter, gauge, histogram};

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use tracing::info;

static METRICS_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

/// Install the Prometheus recorder once per process.
///
/// Later calls return the existing handle.
pub fn init_metrics() -> Result<&'static PrometheusHandle, BuildError> {
    METRICS_HANDLE.get_or_try_init(|| {
        let handle = PrometheusBuilder::new().install_recorder()?;

        info!("Prometheus metrics recorder initialized");
        register_metric_descriptions();

        Ok(handle)
    })
}

pub fn get_metrics_handle() -> Option<&'static PrometheusHandle> {
    METRICS_HANDLE.get()
}

/// Axum handler for `/metrics`.
pub async fn metrics_handler() -> String {
    match get_metrics_handle() {
        Some(handle) => handle.render(),
        None => "# Metrics not initialized\n".to_string(),
    }
}

fn register_metric_descriptions() {
    use metrics::{describe_counter, describe_histogram};

    describe_counter!("http_requests_total", "Total number of HTTP requests");
    describe_histogram!(
        "http_request_duration_seconds",
        "HTTP request duration in seconds"
    );
    describe_counter!(
        "http_requests_errors_total",
        "Total number of HTTP request errors"
    );

    describe_counter!(
        "ewm_events_total",
        "Event lifecycle operations by kind (created, published, rejected, canceled)"
    );
    describe_counter!(
        "ewm_participation_requests_total",
        "Participation request status changes by resulting status"
    );
    describe_counter!("ewm_event_views_total", "Public event views counted");
    describe_histogram!(
        "ewm_moderation_batch_size",
        "Number of requests per moderation batch"
    );

    describe_counter!("stats_hits_recorded_total", "Endpoint hits stored");
    describe_counter!(
        "stats_hit_emission_failures_total",
        "Hits the event service failed to deliver to the statistics service"
    );
    describe_counter!("stats_queries_total", "Aggregation queries by uniqueness mode");
    describe_histogram!(
        "stats_query_duration_seconds",
        "Aggregation query duration in seconds"
    );
}
