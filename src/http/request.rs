//! Request handling helpers.
//!
//! # Responsibilities
//! - Request ID header access
//! - Pick the codec for the request body (`Content-Type`)
//! - Negotiate the codec for the response body (`Accept`)
//! - Collect route values and call parameters
//!
//! # Design Decisions
//! - Media types compare by essence: parameters are dropped, case folded
//! - A missing `Content-Type` means the default codec; an unknown one is an error
//! - `Accept` entries are tried in order; q-values are not weighed

use axum::http::{header, HeaderMap, HeaderName};
use std::collections::HashMap;
use std::sync::Arc;

use crate::codec::{CodecRegistry, MediaTypeCodec};
use crate::routing::RouteValues;

/// Header carrying the request ID.
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Read the request ID set by the request-id layer.
pub trait RequestIdExt {
    fn request_id(&self) -> &str;
}

impl RequestIdExt for HeaderMap {
    fn request_id(&self) -> &str {
        self.get(&X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unknown")
    }
}

/// `"Application/JSON; charset=utf-8"` → `"application/json"`.
pub fn media_type_essence(value: &str) -> String {
    value
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Codec for the request body.
///
/// `Ok(None)` when the request names no media type. `Err` carries the
/// unsupported value as sent.
pub fn request_codec(
    codecs: &CodecRegistry,
    headers: &HeaderMap,
) -> Result<Option<Arc<dyn MediaTypeCodec>>, String> {
    let Some(value) = headers.get(header::CONTENT_TYPE) else {
        return Ok(None);
    };
    let raw = value.to_str().map_err(|_| String::from_utf8_lossy(value.as_bytes()).into_owned())?;
    codecs
        .get(&media_type_essence(raw))
        .cloned()
        .map(Some)
        .ok_or_else(|| raw.to_string())
}

/// Codec for the response body: first acceptable registered token, else
/// `fallback`.
pub fn response_codec(
    codecs: &CodecRegistry,
    headers: &HeaderMap,
    fallback: &Arc<dyn MediaTypeCodec>,
) -> Arc<dyn MediaTypeCodec> {
    headers
        .get_all(header::ACCEPT)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .find_map(|entry| codecs.get(&media_type_essence(entry)))
        .unwrap_or(fallback)
        .clone()
}

/// Call parameters: query string merged with route values, route values win.
pub fn call_parameters(
    query: HashMap<String, String>,
    route_values: &RouteValues,
) -> HashMap<String, String> {
    let mut parameters = query;
    parameters.extend(route_values.iter().map(|(k, v)| (k.clone(), v.clone())));
    parameters
}
