use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter, register_int_counter_vec, HistogramVec,
    IntCounter, IntCounterVec,
};

lazy_static! {
    // HTTP Metrics
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "http_requests_total",
        "Total HTTP requests",
        &["method", "path", "status"]
    )
    .unwrap();

    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "http_request_duration_seconds",
        "HTTP request duration in seconds",
        &["method", "path"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    )
    .unwrap();

    // Envelope Metrics
    pub static ref ENVELOPE_FAILURES_TOTAL: IntCounterVec = register_int_counter_vec!(
        "envelope_failures_total",
        "Failure envelopes written, by domain code",
        &["code"]
    )
    .unwrap();

    pub static ref PANICS_RECOVERED_TOTAL: IntCounter = register_int_counter!(
        "panics_recovered_total",
        "Handler panics converted into failure envelopes"
    )
    .unwrap();
}

/// Initialize all metrics (forces lazy_static evaluation)
pub fn init_metrics() {
    lazy_static::initialize(&HTTP_REQUESTS_TOTAL);
    lazy_static::initialize(&HTTP_REQUEST_DURATION_SECONDS);
    lazy_static::initialize(&ENVELOPE_FAILURES_TOTAL);
    lazy_static::initialize(&PANICS_RECOVERED_TOTAL);
}
