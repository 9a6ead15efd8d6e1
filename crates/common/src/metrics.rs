use once_cell::sync::Lazy;
use prometheus::{register_histogram, register_int_counter, Encoder, Histogram, IntCounter, TextEncoder};

// Prometheus metrics (default registry)
pub static LISTING_FETCH_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "chowk_listing_fetch_total",
        "Listing page fetches started"
    )
    .expect("register listing_fetch_total")
});

pub static LISTING_FETCH_FAILURES_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "chowk_listing_fetch_failures_total",
        "Listing page fetches that failed or timed out"
    )
    .expect("register listing_fetch_failures_total")
});

pub static LISTING_FETCH_SUPERSEDED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "chowk_listing_fetch_superseded_total",
        "Listing page results discarded because a newer fetch was started"
    )
    .expect("register listing_fetch_superseded_total")
});

pub static LISTING_FETCH_DURATION: Lazy<Histogram> = Lazy::new(|| {
    register_histogram!(
        "chowk_listing_fetch_duration_seconds",
        "Listing page fetch duration in seconds",
        vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 15.0]
    )
    .expect("register listing_fetch_duration")
});

pub static UPLOADS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "chowk_uploads_total",
        "Images stored through the blob uploader"
    )
    .expect("register uploads_total")
});

pub fn encode_metrics() -> (axum::http::StatusCode, String) {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return (
            axum::http::StatusCode::INTERNAL_SERVER_ERROR,
            format!("metrics encode error: {e}"),
        );
    }
    (
        axum::http::StatusCode::OK,
        String::from_utf8(buffer).unwrap_or_default(),
    )
}
