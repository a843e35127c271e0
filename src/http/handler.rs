//! The grain request handler.
//!
//! # Data Flow
//! ```text
//! matched request
//!     → request codec (Content-Type) → stream body into the codec, racing
//!       the request's cancellation token
//!     → DispatchRequest (pattern, verb, route values, arguments)
//!     → GrainRouter::dispatch
//!     → response codec (Accept) → encode result
//! ```

use axum::{
    body::Body,
    extract::{MatchedPath, Query, RawPathParams, Request, State},
    http::{HeaderMap, Method},
    response::{IntoResponse, Response},
    RequestExt,
};
use futures_util::TryStreamExt;
use http_body_util::LengthLimitError;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::io::AsyncBufReadExt;
use tokio_util::io::StreamReader;
use tokio_util::sync::CancellationToken;

use crate::codec::{CodecError, MediaTypeCodec};
use crate::grain::CallArguments;
use crate::http::request::{call_parameters, request_codec, response_codec, RequestIdExt};
use crate::http::response::{encode_result, HandlerError};
use crate::http::server::AppState;
use crate::observability::metrics::{self, CodecDirection};
use crate::routing::{DispatchOutcome, DispatchRequest, RouteValues};

/// Serves every mounted grain route.
pub async fn grain_handler(
    State(state): State<AppState>,
    matched: MatchedPath,
    method: Method,
    params: RawPathParams,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    request: Request,
) -> Response {
    let start = Instant::now();
    let request_id = headers.request_id().to_string();
    let pattern = matched.as_str().to_string();
    let method_str = method.to_string();

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        route = %pattern,
        "Dispatching grain request"
    );

    let route_values: RouteValues = params
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    let body = request.with_limited_body().into_body();
    let response = match handle(&state, pattern, method, route_values, query, &headers, body).await {
        Ok(response) => response,
        Err(e) => {
            if e.status().is_server_error() {
                tracing::error!(request_id = %request_id, error = %e, "Grain request failed");
            } else {
                tracing::warn!(request_id = %request_id, error = %e, "Grain request refused");
            }
            e.into_response()
        }
    };

    metrics::record_request(&method_str, response.status().as_u16(), start);
    response
}

async fn handle(
    state: &AppState,
    pattern: String,
    method: Method,
    route_values: RouteValues,
    query: HashMap<String, String>,
    headers: &HeaderMap,
    body: Body,
) -> Result<Response, HandlerError> {
    let declared = request_codec(&state.codecs, headers).map_err(HandlerError::UnsupportedMediaType)?;

    let cancel = state.cancel.child_token();
    let mut reader = StreamReader::new(body.into_data_stream().map_err(std::io::Error::other));

    let empty = tokio::select! {
        biased;
        peek = reader.fill_buf() => peek.map(|buf| buf.is_empty()),
        _ = cancel.cancelled() => return Err(HandlerError::Decode(CodecError::Cancelled)),
    };
    let empty = empty.map_err(|e| body_error(CodecError::Io(e)))?;

    let (body, body_codec) = if empty {
        (Value::Null, None)
    } else {
        let codec = declared.unwrap_or_else(|| state.codecs.default_codec().clone());
        (decode_body(&codec, &mut reader, &cancel).await?, Some(codec))
    };

    let verb = dispatch_verb(state, &pattern, method);
    let arguments = CallArguments {
        body,
        parameters: call_parameters(query, &route_values),
    };
    let request = DispatchRequest {
        pattern,
        verb,
        route_values,
        arguments,
    };

    match state.router.dispatch(request).await? {
        DispatchOutcome::Rejected(_) => Ok(DispatchOutcome::REJECTED_STATUS.into_response()),
        DispatchOutcome::Completed(value) => {
            let fallback = body_codec.unwrap_or_else(|| state.codecs.default_codec().clone());
            let codec = response_codec(&state.codecs, headers, &fallback);
            encode_result(&value, &codec).await.inspect_err(|e| {
                if let HandlerError::Encode(_) = e {
                    metrics::record_codec_failure(codec.media_type(), CodecDirection::Encode);
                }
            })
        }
    }
}

async fn decode_body(
    codec: &Arc<dyn MediaTypeCodec>,
    reader: &mut (dyn tokio::io::AsyncRead + Unpin + Send),
    cancel: &CancellationToken,
) -> Result<Value, HandlerError> {
    codec.deserialize(reader, cancel).await.map_err(|e| {
        let error = body_error(e);
        if let HandlerError::Decode(_) = error {
            metrics::record_codec_failure(codec.media_type(), CodecDirection::Decode);
        }
        error
    })
}

/// A read that tripped the body limit answers 413, not a decode failure.
fn body_error(error: CodecError) -> HandlerError {
    let CodecError::Io(io) = &error else {
        return HandlerError::Decode(error);
    };

    let mut source = io
        .get_ref()
        .map(|inner| inner as &(dyn std::error::Error + 'static));
    while let Some(inner) = source {
        if inner.is::<LengthLimitError>() {
            return HandlerError::PayloadTooLarge;
        }
        source = inner.source();
    }
    HandlerError::Decode(error)
}

/// axum serves HEAD from GET routes; dispatch it as GET unless a HEAD
/// route exists.
fn dispatch_verb(state: &AppState, pattern: &str, method: Method) -> Method {
    if method == Method::HEAD && state.router.table().lookup(pattern, &method).is_none() {
        Method::GET
    } else {
        method
    }
}
