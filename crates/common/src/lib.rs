pub mod types;
pub mod utils;
pub mod env;
pub mod admin_http;
pub mod metrics;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_type_ok() {
        let h = types::Health { status: "ok" };
        assert_eq!(h.status, "ok");
    }

    #[test]
    fn metrics_encode_includes_listing_counters() {
        metrics::LISTING_FETCH_TOTAL.inc();
        let (status, body) = metrics::encode_metrics();
        assert_eq!(status, axum::http::StatusCode::OK);
        assert!(body.contains("chowk_listing_fetch_total"));
    }
}
