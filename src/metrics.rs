//! Prometheus metrics for the issuance pipeline.

use once_cell::sync::Lazy;
use prometheus::{register_counter_vec, register_histogram, CounterVec, Histogram};

/// Issued token counter, labeled by digest algorithm.
pub static TOKENS_ISSUED: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "tsa_tokens_issued_total",
        "Total number of time-stamp tokens issued",
        &["algorithm"]
    )
    .expect("Failed to register tokens_issued metric")
});

/// Rejection counter, labeled by reason.
pub static REJECTIONS: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "tsa_rejections_total",
        "Total number of rejected time-stamp requests",
        &["reason"]
    )
    .expect("Failed to register rejections metric")
});

/// Trusted time acquisition counter, labeled by outcome.
pub static TIME_SOURCE_SAMPLES: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "tsa_time_source_samples_total",
        "Total number of trusted time acquisitions",
        &["status"]
    )
    .expect("Failed to register time_source_samples metric")
});

/// Latency of canonicalizing and signing a response.
pub static SIGNING_LATENCY: Lazy<Histogram> = Lazy::new(|| {
    register_histogram!(
        "tsa_signing_latency_seconds",
        "Latency of canonicalizing and signing a response",
        vec![0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25]
    )
    .expect("Failed to register signing_latency metric")
});

/// Records an issued token.
pub fn record_token_issued(algorithm: &str) {
    TOKENS_ISSUED.with_label_values(&[algorithm]).inc();
}

/// Records a rejection.
pub fn record_rejection(reason: &str) {
    REJECTIONS.with_label_values(&[reason]).inc();
}

/// Records a time source acquisition outcome.
pub fn record_time_source_sample(status: &str) {
    TIME_SOURCE_SAMPLES.with_label_values(&[status]).inc();
}

/// Records signing latency in seconds.
pub fn record_signing_latency(seconds: f64) {
    SIGNING_LATENCY.observe(seconds);
}
