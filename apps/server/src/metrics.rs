//! Prometheus metrics for the listing API.

use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, register_int_gauge_vec, HistogramVec,
    IntCounterVec, IntGaugeVec,
};

lazy_static! {
    /// Total HTTP requests by method, path, and status
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "homestead_http_requests_total",
        "Total number of HTTP requests",
        &["method", "path", "status"]
    )
    .expect("Failed to register HTTP_REQUESTS_TOTAL");

    /// HTTP request duration in seconds
    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "homestead_http_request_duration_seconds",
        "HTTP request duration in seconds",
        &["method", "path"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    )
    .expect("Failed to register HTTP_REQUEST_DURATION_SECONDS");

    pub static ref HTTP_REQUESTS_IN_FLIGHT: IntGaugeVec = register_int_gauge_vec!(
        "homestead_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
        &["method", "path"]
    )
    .expect("Failed to register HTTP_REQUESTS_IN_FLIGHT");

    /// Property searches by endpoint variant and outcome
    pub static ref SEARCH_TOTAL: IntCounterVec = register_int_counter_vec!(
        "homestead_search_total",
        "Total number of property searches",
        &["variant", "status"]
    )
    .expect("Failed to register SEARCH_TOTAL");

    pub static ref SEARCH_RESULTS: HistogramVec = register_histogram_vec!(
        "homestead_search_results",
        "Number of matching properties per search",
        &["variant"],
        vec![0.0, 1.0, 5.0, 12.0, 50.0, 100.0, 500.0, 1000.0, 10000.0]
    )
    .expect("Failed to register SEARCH_RESULTS");

    /// Image host calls by operation and outcome
    pub static ref IMAGE_HOST_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "homestead_image_host_requests_total",
        "Total number of calls to the external image host",
        &["operation", "status"]
    )
    .expect("Failed to register IMAGE_HOST_REQUESTS_TOTAL");
}

/// Replace id-like path segments with `:id` to keep label cardinality low.
pub fn sanitize_path(path: &str) -> String {
    let segments: Vec<&str> = path
        .split('/')
        .map(|segment| if looks_like_id(segment) { ":id" } else { segment })
        .collect();
    segments.join("/")
}

/// API resource addressed by `path`, used to tag request spans.
pub fn resource_of(path: &str) -> Option<&'static str> {
    let rest = path.strip_prefix("/api/")?;
    match rest.split('/').next()? {
        "properties" => Some("property"),
        "upload" => Some("upload"),
        _ => None,
    }
}

fn looks_like_id(segment: &str) -> bool {
    uuid::Uuid::parse_str(segment).is_ok()
        || (!segment.is_empty() && segment.chars().all(|c| c.is_ascii_digit()))
}
