//! Negotiation metrics
//!
//! Counters are recorded through the `metrics` facade; they are no-ops until
//! the host application installs a recorder.

use crate::domain::roap::{ErrorType, RoapState};
use metrics::{counter, describe_counter};

/// Register metric descriptions with the installed recorder
pub fn describe_metrics() {
    describe_counter!(
        "roap_negotiations_started_total",
        "Total number of offer/answer rounds started"
    );
    describe_counter!(
        "roap_negotiations_completed_total",
        "Total number of offer/answer rounds completed"
    );
    describe_counter!(
        "roap_negotiations_failed_total",
        "Total number of sessions that entered a failed state"
    );
    describe_counter!(
        "roap_glare_total",
        "Total number of simultaneous offers resolved"
    );
    describe_counter!(
        "roap_offer_retries_total",
        "Total number of offers re-created after a retryable error"
    );
}

/// Record a negotiation round start
pub fn record_negotiation_started() {
    counter!("roap_negotiations_started_total").increment(1);
}

/// Record a completed negotiation round
pub fn record_negotiation_completed() {
    counter!("roap_negotiations_completed_total").increment(1);
}

/// Record a session failure by the failed state it ended in
pub fn record_negotiation_failed(state: RoapState) {
    counter!("roap_negotiations_failed_total", "state" => state.as_str()).increment(1);
}

/// Record a glare resolution
pub fn record_glare(error_type: ErrorType) {
    counter!("roap_glare_total", "error_type" => error_type.as_str()).increment(1);
}

/// Record an automatic offer retry
pub fn record_offer_retry() {
    counter!("roap_offer_retries_total").increment(1);
}
