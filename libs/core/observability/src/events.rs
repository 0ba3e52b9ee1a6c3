//! Event-service counters.

use metrics::{counter, histogram};

pub struct EventMetrics;

impl EventMetrics {
    pub fn record_created() {
        counter!("ewm_events_total", "operation" => "created").increment(1);
    }

    pub fn record_published() {
        counter!("ewm_events_total", "operation" => "published").increment(1);
    }

    pub fn record_rejected() {
        counter!("ewm_events_total", "operation" => "rejected").increment(1);
    }

    pub fn record_canceled() {
        counter!("ewm_events_total", "operation" => "canceled").increment(1);
    }

    pub fn record_view() {
        counter!("ewm_event_views_total").increment(1);
    }

    /// One moderation batch; counts are the partition sizes.
    pub fn record_moderation(confirmed: usize, rejected: usize) {
        histogram!("ewm_moderation_batch_size").record((confirmed + rejected) as f64);
        counter!("ewm_participation_requests_total", "status" => "confirmed")
            .increment(confirmed as u64);
        counter!("ewm_participation_requests_total", "status" => "rejected")
            .increment(rejected as u64);

        tracing::debug!(confirmed, rejected, "Moderation batch applied");
    }

    /// A request created or canceled by its requester.
    pub fn record_request_status(status: &'static str) {
        counter!("ewm_participation_requests_total", "status" => status).increment(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_without_recorder_is_noop() {
        EventMetrics::record_created();
        EventMetrics::record_published();
        EventMetrics::record_moderation(2, 1);
        EventMetrics::record_request_status("pending");
    }
}
