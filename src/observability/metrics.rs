//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by method, status
//! - `gateway_request_duration_seconds` (histogram): latency distribution
//! - `gateway_key_rejections_total` (counter): bad grain keys by interface, key shape
//! - `gateway_codec_failures_total` (counter): codec errors by media type, direction
//! - `gateway_grain_activations` (gauge): live activations in the local runtime
//!
//! # Design Decisions
//! - Prometheus exporter serves its own HTTP listener, separate from the gateway
//! - Recording functions are free functions so call sites stay one line

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

use crate::routing::KeyShape;

/// Which side of a codec failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecDirection {
    Decode,
    Encode,
}

impl CodecDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            CodecDirection::Decode => "decode",
            CodecDirection::Encode => "encode",
        }
    }
}

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(method: &str, status: u16, start: Instant) {
    ::metrics::counter!(
        "gateway_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    ::metrics::histogram!("gateway_request_duration_seconds", "method" => method.to_string())
        .record(start.elapsed().as_secs_f64());
}

pub fn record_key_rejected(interface: &str, shape: KeyShape) {
    ::metrics::counter!(
        "gateway_key_rejections_total",
        "interface" => interface.to_string(),
        "key_shape" => shape.to_string()
    )
    .increment(1);
}

pub fn record_codec_failure(media_type: &str, direction: CodecDirection) {
    ::metrics::counter!(
        "gateway_codec_failures_total",
        "media_type" => media_type.to_string(),
        "direction" => direction.as_str()
    )
    .increment(1);
}

pub fn record_activations(count: usize) {
    ::metrics::gauge!("gateway_grain_activations").set(count as f64);
}
