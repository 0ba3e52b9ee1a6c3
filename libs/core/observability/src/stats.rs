//! Statistics-service counters, plus the emission side of the event service.

use metrics::{counter, histogram};
use std::time::Duration;

pub struct StatsMetrics;

impl StatsMetrics {
    pub fn record_hit(app: &str) {
        counter!("stats_hits_recorded_total", "app" => app.to_string()).increment(1);
    }

    pub fn record_query(unique: bool, rows: usize, elapsed: Duration) {
        let mode = if unique { "unique" } else { "all" };
        counter!("stats_queries_total", "mode" => mode).increment(1);
        histogram!("stats_query_duration_seconds", "mode" => mode).record(elapsed.as_secs_f64());

        tracing::debug!(mode, rows, elapsed_ms = elapsed.as_millis() as u64, "Stats query served");
    }

    /// Fire-and-forget delivery failed on the event-service side.
    pub fn record_emission_failure() {
        counter!("stats_hit_emission_failures_total").increment(1);
    }
}
