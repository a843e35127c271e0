//! Payload codecs.
//!
//! # Data Flow
//! ```text
//! Request body (Content-Type token)
//!     → registry.rs (exact token lookup)
//!     → MediaTypeCodec::deserialize (one message → serde_json::Value)
//!     → grain call
//!     → MediaTypeCodec::serialize (Value → one message)
//!     → Response body
//! ```
//!
//! # Design Decisions
//! - Codecs are object-safe so the registry can hold `Arc<dyn MediaTypeCodec>`;
//!   they transcode to and from `serde_json::Value`, the runtime's neutral form
//! - The target type is applied by the typed helpers `decode` / `encode`
//! - Codecs are stateless and shared by concurrent requests
//! - No framing: the reader holds exactly one message

pub mod json;
pub mod msgpack;
pub mod protobuf;
pub mod registry;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite};
use tokio_util::sync::CancellationToken;

pub use json::JsonCodec;
pub use msgpack::MsgPackCodec;
pub use protobuf::ProtobufCodec;
pub use registry::CodecRegistry;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised while encoding or decoding a payload.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("failed to decode {media_type} message: {source}")]
    Decode {
        media_type: &'static str,
        #[source]
        source: BoxError,
    },

    #[error("failed to encode {media_type} message: {source}")]
    Encode {
        media_type: &'static str,
        #[source]
        source: BoxError,
    },

    /// The message decoded, but does not fit the requested type.
    #[error("payload does not match the requested type: {0}")]
    Conversion(#[source] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("decoding was cancelled")]
    Cancelled,
}

/// Encoder/decoder for one wire format, identified by its media type.
#[async_trait]
pub trait MediaTypeCodec: Send + Sync + std::fmt::Debug {
    /// The media type token this codec handles, e.g. `application/json`.
    fn media_type(&self) -> &'static str;

    /// Read exactly one message from `reader` and decode it.
    ///
    /// Aborts with `CodecError::Cancelled` if `cancel` fires while the read
    /// is waiting for more input; input read so far is discarded.
    async fn deserialize(
        &self,
        reader: &mut (dyn AsyncRead + Unpin + Send),
        cancel: &CancellationToken,
    ) -> Result<Value, CodecError>;

    /// Encode `value` as exactly one message into `writer`.
    async fn serialize(
        &self,
        value: &Value,
        writer: &mut (dyn AsyncWrite + Unpin + Send),
    ) -> Result<(), CodecError>;
}

impl dyn MediaTypeCodec {
    /// Decode one message as `T`.
    pub async fn decode<T: DeserializeOwned>(
        &self,
        reader: &mut (dyn AsyncRead + Unpin + Send),
        cancel: &CancellationToken,
    ) -> Result<T, CodecError> {
        let value = self.deserialize(reader, cancel).await?;
        serde_json::from_value(value).map_err(CodecError::Conversion)
    }

    /// Encode `value` as one message.
    pub async fn encode<T: Serialize + ?Sized>(
        &self,
        value: &T,
        writer: &mut (dyn AsyncWrite + Unpin + Send),
    ) -> Result<(), CodecError> {
        let value = serde_json::to_value(value).map_err(CodecError::Conversion)?;
        self.serialize(&value, writer).await
    }

    /// Encode `value` into a fresh buffer.
    pub async fn encode_to_vec(&self, value: &Value) -> Result<Vec<u8>, CodecError> {
        let mut buf = Vec::new();
        self.serialize(value, &mut buf).await?;
        Ok(buf)
    }
}

/// Read the whole message from `reader`, racing `cancel`.
///
/// Input that is already available wins over a fired token; only a read
/// left waiting on the peer is cancelled.
pub(crate) async fn read_message(
    reader: &mut (dyn AsyncRead + Unpin + Send),
    cancel: &CancellationToken,
) -> Result<Vec<u8>, CodecError> {
    let mut buf = Vec::new();
    let read = tokio::select! {
        biased;
        read = reader.read_to_end(&mut buf) => read,
        _ = cancel.cancelled() => return Err(CodecError::Cancelled),
    };
    read?;
    Ok(buf)
}
