//! JSON codec (`application/json`), the gateway's default.

use async_trait::async_trait;
use serde_json::Value;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio_util::sync::CancellationToken;

use crate::codec::{read_message, CodecError, MediaTypeCodec};

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl JsonCodec {
    pub const MEDIA_TYPE: &'static str = "application/json";
}

#[async_trait]
impl MediaTypeCodec for JsonCodec {
    fn media_type(&self) -> &'static str {
        Self::MEDIA_TYPE
    }

    async fn deserialize(
        &self,
        reader: &mut (dyn AsyncRead + Unpin + Send),
        cancel: &CancellationToken,
    ) -> Result<Value, CodecError> {
        let bytes = read_message(reader, cancel).await?;
        serde_json::from_slice(&bytes).map_err(|e| CodecError::Decode {
            media_type: Self::MEDIA_TYPE,
            source: Box::new(e),
        })
    }

    async fn serialize(
        &self,
        value: &Value,
        writer: &mut (dyn AsyncWrite + Unpin + Send),
    ) -> Result<(), CodecError> {
        let bytes = serde_json::to_vec(value).map_err(|e| CodecError::Encode {
            media_type: Self::MEDIA_TYPE,
            source: Box::new(e),
        })?;
        writer.write_all(&bytes).await?;
        writer.flush().await?;
        Ok(())
    }
}
