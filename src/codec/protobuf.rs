//! Protobuf codec (`application/protobuf`).
//!
//! Messages are a single `google.protobuf.Value`, the well-known type that
//! carries arbitrary JSON-shaped data without a schema. Objects travel as
//! `Struct`, arrays as `ListValue`.
//!
//! Protobuf numbers are doubles: integral numbers come back as integers,
//! and integers beyond 2^53 lose precision.

use async_trait::async_trait;
use prost::Message;
use prost_types::value::Kind;
use prost_types::{ListValue, Struct};
use serde_json::{Map, Number, Value};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio_util::sync::CancellationToken;

use crate::codec::{read_message, CodecError, MediaTypeCodec};

#[derive(Debug, Clone, Copy, Default)]
pub struct ProtobufCodec;

impl ProtobufCodec {
    pub const MEDIA_TYPE: &'static str = "application/protobuf";
}

#[async_trait]
impl MediaTypeCodec for ProtobufCodec {
    fn media_type(&self) -> &'static str {
        Self::MEDIA_TYPE
    }

    async fn deserialize(
        &self,
        reader: &mut (dyn AsyncRead + Unpin + Send),
        cancel: &CancellationToken,
    ) -> Result<Value, CodecError> {
        let bytes = read_message(reader, cancel).await?;
        let message = prost_types::Value::decode(bytes.as_slice()).map_err(|e| CodecError::Decode {
            media_type: Self::MEDIA_TYPE,
            source: Box::new(e),
        })?;
        from_proto(message)
    }

    async fn serialize(
        &self,
        value: &Value,
        writer: &mut (dyn AsyncWrite + Unpin + Send),
    ) -> Result<(), CodecError> {
        let bytes = to_proto(value).encode_to_vec();
        writer.write_all(&bytes).await?;
        writer.flush().await?;
        Ok(())
    }
}

fn to_proto(value: &Value) -> prost_types::Value {
    let kind = match value {
        Value::Null => Kind::NullValue(prost_types::NullValue::NullValue as i32),
        Value::Bool(b) => Kind::BoolValue(*b),
        Value::Number(n) => Kind::NumberValue(n.as_f64().unwrap_or_default()),
        Value::String(s) => Kind::StringValue(s.clone()),
        Value::Array(items) => Kind::ListValue(ListValue {
            values: items.iter().map(to_proto).collect(),
        }),
        Value::Object(map) => Kind::StructValue(Struct {
            fields: map.iter().map(|(k, v)| (k.clone(), to_proto(v))).collect(),
        }),
    };
    prost_types::Value { kind: Some(kind) }
}

fn from_proto(value: prost_types::Value) -> Result<Value, CodecError> {
    Ok(match value.kind {
        None | Some(Kind::NullValue(_)) => Value::Null,
        Some(Kind::BoolValue(b)) => Value::Bool(b),
        Some(Kind::NumberValue(n)) => Value::Number(number(n)?),
        Some(Kind::StringValue(s)) => Value::String(s),
        Some(Kind::ListValue(list)) => Value::Array(
            list.values
                .into_iter()
                .map(from_proto)
                .collect::<Result<_, _>>()?,
        ),
        Some(Kind::StructValue(object)) => {
            let mut map = Map::new();
            for (k, v) in object.fields {
                map.insert(k, from_proto(v)?);
            }
            Value::Object(map)
        }
    })
}

/// 2^53: beyond this not every integer is representable as a double.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

fn number(n: f64) -> Result<Number, CodecError> {
    if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        return Ok(Number::from(n as i64));
    }
    Number::from_f64(n).ok_or_else(|| CodecError::Decode {
        media_type: ProtobufCodec::MEDIA_TYPE,
        source: format!("number {n} has no JSON representation").into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_value_survives_transcoding() {
        let codec = ProtobufCodec;
        let value = json!({ "id": -3, "name": "widget", "price": 9.5, "tags": ["x", 1], "note": null, "ok": true });

        let mut out = Vec::new();
        codec.serialize(&value, &mut out).await.unwrap();

        let mut reader: &[u8] = &out;
        let decoded = codec
            .deserialize(&mut reader, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(decoded, value);
    }

    #[tokio::test]
    async fn test_wire_format_is_well_known_value() {
        let mut out = Vec::new();
        ProtobufCodec
            .serialize(&json!({ "qty": 2 }), &mut out)
            .await
            .unwrap();

        let message = prost_types::Value::decode(out.as_slice()).unwrap();
        let Some(Kind::StructValue(object)) = message.kind else {
            panic!("expected a struct, got {:?}", message.kind);
        };
        assert_eq!(
            object.fields["qty"].kind,
            Some(Kind::NumberValue(2.0))
        );
    }

    #[tokio::test]
    async fn test_non_finite_number_rejected() {
        let message = prost_types::Value {
            kind: Some(Kind::NumberValue(f64::NAN)),
        };
        let bytes = message.encode_to_vec();

        let mut reader: &[u8] = &bytes;
        let err = ProtobufCodec
            .deserialize(&mut reader, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, CodecError::Decode { media_type: "application/protobuf", .. }));
    }

    #[tokio::test]
    async fn test_garbage_input() {
        let mut reader: &[u8] = &[0xff, 0xff, 0xff];
        let err = ProtobufCodec
            .deserialize(&mut reader, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, CodecError::Decode { .. }));
    }
}
