use axum::{
    extract::{MatchedPath, Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use lazy_static::lazy_static;
#[cfg(target_os = "linux")]
use prometheus::process_collector::ProcessCollector;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};
use std::sync::Arc;
use std::time::Instant;

use crate::http_server::AppState;

const UNMATCHED_ENDPOINT: &str = "unmatched";

lazy_static! {
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("http_requests_total", "Total number of HTTP requests"),
        &["method", "endpoint", "status"]
    )
    .unwrap();
    pub static ref HTTP_REQUEST_DURATION: HistogramVec = HistogramVec::new(
        HistogramOpts::new("http_request_duration_seconds", "HTTP request duration in seconds").buckets(vec![
            0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0
        ]),
        &["method", "endpoint"]
    )
    .unwrap();
    pub static ref HTTP_REQUESTS_IN_FLIGHT: IntGauge = IntGauge::new(
        "http_requests_in_flight",
        "Number of HTTP requests currently being processed"
    )
    .unwrap();
    pub static ref HTTP_REQUEST_SIZE_BYTES: HistogramVec = HistogramVec::new(
        HistogramOpts::new("http_request_size_bytes", "Size of HTTP request bodies in bytes")
            .buckets(vec![100.0, 1000.0, 10000.0, 100000.0, 1000000.0, 10000000.0]),
        &["method", "endpoint"]
    )
    .unwrap();
    pub static ref HTTP_RESPONSE_SIZE_BYTES: HistogramVec = HistogramVec::new(
        HistogramOpts::new("http_response_size_bytes", "Size of HTTP response bodies in bytes")
            .buckets(vec![100.0, 1000.0, 10000.0, 100000.0, 1000000.0, 10000000.0]),
        &["method", "endpoint"]
    )
    .unwrap();
    pub static ref HTTP_ERRORS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("http_errors_total", "Total number of HTTP errors"),
        &["method", "endpoint", "status"]
    )
    .unwrap();

    pub static ref REFERRAL_REDEMPTIONS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("referral_redemptions_total", "Referral redemption attempts by outcome"),
        &["outcome"]
    )
    .unwrap();
    pub static ref VOUCHERS_EXPIRED_TOTAL: IntCounter =
        IntCounter::new("vouchers_expired_total", "Vouchers moved to expired by the sweeper").unwrap();
}

#[derive(Debug, Clone)]
pub struct Metrics {
    pub registry: Arc<Registry>,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        // Register OS/machine metrics collector (Linux only)
        #[cfg(target_os = "linux")]
        {
            let process_collector = ProcessCollector::for_self();
            registry.register(Box::new(process_collector)).unwrap();
        }

        // Register all custom HTTP metrics
        registry.register(Box::new(HTTP_REQUESTS_TOTAL.clone())).unwrap();
        registry.register(Box::new(HTTP_REQUEST_DURATION.clone())).unwrap();
        registry.register(Box::new(HTTP_REQUESTS_IN_FLIGHT.clone())).unwrap();
        registry.register(Box::new(HTTP_REQUEST_SIZE_BYTES.clone())).unwrap();
        registry.register(Box::new(HTTP_RESPONSE_SIZE_BYTES.clone())).unwrap();
        registry.register(Box::new(HTTP_ERRORS_TOTAL.clone())).unwrap();

        registry.register(Box::new(REFERRAL_REDEMPTIONS_TOTAL.clone())).unwrap();
        registry.register(Box::new(VOUCHERS_EXPIRED_TOTAL.clone())).unwrap();

        Self {
            registry: Arc::new(registry),
        }
    }
}

/// Endpoint label for a request: the route template it matched, such as
/// `/api/users/:user_id/vouchers`. Requests no route matched share one label.
pub fn endpoint_label(req: &Request) -> String {
    req.extensions()
        .get::<MatchedPath>()
        .map(|matched| matched.as_str().to_string())
        .unwrap_or_else(|| String::from(UNMATCHED_ENDPOINT))
}

fn content_length(headers: &HeaderMap) -> Option<f64> {
    headers
        .get(header::CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<f64>().ok())
}

/// Records request count, latency, body sizes and errors per route.
pub async fn track_metrics(req: Request, next: Next) -> Response {
    if req.uri().path() == "/metrics" {
        return next.run(req).await;
    }

    let method = req.method().clone();
    let endpoint = endpoint_label(&req);
    let labels = [method.as_str(), endpoint.as_str()];

    if let Some(size) = content_length(req.headers()) {
        HTTP_REQUEST_SIZE_BYTES.with_label_values(&labels).observe(size);
    }

    HTTP_REQUESTS_IN_FLIGHT.inc();
    let start = Instant::now();
    let response = next.run(req).await;
    HTTP_REQUESTS_IN_FLIGHT.dec();

    HTTP_REQUEST_DURATION
        .with_label_values(&labels)
        .observe(start.elapsed().as_secs_f64());

    let status = response.status();
    let status_label = status.as_u16().to_string();
    let status_labels = [method.as_str(), endpoint.as_str(), status_label.as_str()];

    HTTP_REQUESTS_TOTAL.with_label_values(&status_labels).inc();
    if status.is_client_error() || status.is_server_error() {
        HTTP_ERRORS_TOTAL.with_label_values(&status_labels).inc();
    }

    if let Some(size) = content_length(response.headers()) {
        HTTP_RESPONSE_SIZE_BYTES.with_label_values(&labels).observe(size);
    }

    response
}

pub fn track_referral_redemption(outcome: &str) {
    REFERRAL_REDEMPTIONS_TOTAL.with_label_values(&[outcome]).inc();
}

pub fn track_vouchers_expired(count: u64) {
    if count > 0 {
        VOUCHERS_EXPIRED_TOTAL.inc_by(count);
    }
}

pub async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = state.metrics.registry.gather();

    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            String::from("Failed to encode metrics"),
        );
    }

    let res = match String::from_utf8(buffer) {
        Ok(v) => v,
        Err(e) => {
            tracing::error!("Metrics output is not valid UTF-8: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                String::from("Failed to encode metrics"),
            );
        }
    };

    (StatusCode::OK, res)
}
