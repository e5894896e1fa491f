//! Metrics collection for the API service.

use estimate_bot_core::Decision;
use prometheus::{Histogram, IntCounterVec};
use std::sync::Arc;
use std::time::Duration;

/// Service metrics for observability
///
/// Registered in the process-wide Prometheus registry, so construct it once
/// per process.
#[derive(Debug)]
pub struct ServiceMetrics {
    /// Terminal decisions, labelled by [`Decision::as_str`]
    pub webhook_decisions_total: IntCounterVec,

    /// Time spent handling one delivery, from body read to response
    pub webhook_duration_seconds: Histogram,
}

impl ServiceMetrics {
    pub fn new() -> Result<Arc<Self>, prometheus::Error> {
        use prometheus::{register_histogram, register_int_counter_vec};

        Ok(Arc::new(Self {
            webhook_decisions_total: register_int_counter_vec!(
                "estimate_bot_webhook_decisions_total",
                "Webhook deliveries by terminal decision",
                &["decision"]
            )?,
            webhook_duration_seconds: register_histogram!(
                "estimate_bot_webhook_duration_seconds",
                "Webhook processing time distribution",
                vec![0.001, 0.01, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0]
            )?,
        }))
    }

    /// Record the outcome of one delivery.
    pub fn record_decision(&self, decision: Decision, elapsed: Duration) {
        self.webhook_decisions_total
            .with_label_values(&[decision.as_str()])
            .inc();
        self.webhook_duration_seconds
            .observe(elapsed.as_secs_f64());
    }

    /// Current count for one decision label.
    pub fn decision_count(&self, decision: Decision) -> u64 {
        self.webhook_decisions_total
            .with_label_values(&[decision.as_str()])
            .get()
    }
}
