//! MessagePack codec (`application/msgpack`) backed by rmp-serde.

use async_trait::async_trait;
use serde_json::Value;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio_util::sync::CancellationToken;

use crate::codec::{read_message, CodecError, MediaTypeCodec};

/// Maps are written with field names so messages stay self-describing.
#[derive(Debug, Clone, Copy, Default)]
pub struct MsgPackCodec;

impl MsgPackCodec {
    pub const MEDIA_TYPE: &'static str = "application/msgpack";
}

#[async_trait]
impl MediaTypeCodec for MsgPackCodec {
    fn media_type(&self) -> &'static str {
        Self::MEDIA_TYPE
    }

    async fn deserialize(
        &self,
        reader: &mut (dyn AsyncRead + Unpin + Send),
        cancel: &CancellationToken,
    ) -> Result<Value, CodecError> {
        let bytes = read_message(reader, cancel).await?;
        rmp_serde::from_slice(&bytes).map_err(|e| CodecError::Decode {
            media_type: Self::MEDIA_TYPE,
            source: Box::new(e),
        })
    }

    async fn serialize(
        &self,
        value: &Value,
        writer: &mut (dyn AsyncWrite + Unpin + Send),
    ) -> Result<(), CodecError> {
        let bytes = rmp_serde::to_vec_named(value).map_err(|e| CodecError::Encode {
            media_type: Self::MEDIA_TYPE,
            source: Box::new(e),
        })?;
        writer.write_all(&bytes).await?;
        writer.flush().await?;
        Ok(())
    }
}
