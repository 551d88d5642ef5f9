//! Connector metrics

use prometheus::{register_counter_vec, register_histogram_vec, CounterVec, HistogramVec};

lazy_static::lazy_static! {
    pub static ref DELIVERY_ATTEMPTS_TOTAL: CounterVec = register_counter_vec!(
        "connector_delivery_attempts_total",
        "Delivery attempts by handler and outcome",
        &["handler", "outcome"]
    )
    .unwrap();

    pub static ref DELIVERY_DURATION: HistogramVec = register_histogram_vec!(
        "connector_delivery_duration_seconds",
        "Delivery attempt duration by handler",
        &["handler"]
    )
    .unwrap();
}
