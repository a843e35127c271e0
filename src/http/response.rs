//! Response handling.
//!
//! # Responsibilities
//! - Map gateway failures to HTTP status codes
//! - Encode grain results with the negotiated codec
//!
//! # Design Decisions
//! - Malformed keys answer 400 with an empty body
//! - A `null` result answers 204 with no body
//! - Runtime timeouts answer 504, unavailable grains 503

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

use crate::codec::{CodecError, MediaTypeCodec};
use crate::grain::InvocationError;
use crate::routing::DispatchError;

/// Failures a grain request can end in, short of a grain result.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("unsupported media type '{0}'")]
    UnsupportedMediaType(String),

    #[error("request body exceeds the configured limit")]
    PayloadTooLarge,

    #[error(transparent)]
    Decode(CodecError),

    #[error(transparent)]
    Encode(CodecError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

impl HandlerError {
    pub fn status(&self) -> StatusCode {
        match self {
            HandlerError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            HandlerError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            HandlerError::Decode(CodecError::Cancelled) => StatusCode::SERVICE_UNAVAILABLE,
            HandlerError::Decode(_) => StatusCode::BAD_REQUEST,
            HandlerError::Encode(_) => StatusCode::INTERNAL_SERVER_ERROR,
            HandlerError::Dispatch(DispatchError::RouteNotRegistered { .. }) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            HandlerError::Dispatch(DispatchError::Invocation(e)) => invocation_status(e),
        }
    }
}

fn invocation_status(error: &InvocationError) -> StatusCode {
    match error {
        InvocationError::Remote(_) => StatusCode::INTERNAL_SERVER_ERROR,
        InvocationError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        InvocationError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        InvocationError::MethodNotFound { .. } => StatusCode::NOT_IMPLEMENTED,
    }
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}

/// Encode a grain result. `null` becomes 204.
pub async fn encode_result(
    value: &Value,
    codec: &Arc<dyn MediaTypeCodec>,
) -> Result<Response, HandlerError> {
    if value.is_null() {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }
    let body = codec.encode_to_vec(value).await.map_err(HandlerError::Encode)?;
    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, codec.media_type())],
        body,
    )
        .into_response())
}
