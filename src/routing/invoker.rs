//! Bound route targets and grain key construction.
//!
//! # Responsibilities
//! - Couple a grain interface, its key shape and the target method
//! - Build a typed `GrainKey` from route values
//! - Forward the call to a resolved grain reference
//!
//! # Design Decisions
//! - Key construction returns `Result`; a malformed key never panics and
//!   never yields a placeholder key
//! - The key shape is fixed at registration; nothing is re-derived per request

use serde_json::Value;
use std::num::ParseIntError;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::grain::{CallArguments, GrainKey, GrainReference, InterfaceDescriptor, InvocationError, MethodDescriptor};
use crate::routing::{KeyShape, RouteValues, GRAIN_ID, GRAIN_ID_EXTENSION};

/// Why route values could not be turned into a grain key.
#[derive(Debug, Error)]
pub enum KeyError {
    #[error("missing route value '{0}'")]
    MissingParameter(&'static str),

    #[error("'{value}' is not a valid integer key: {source}")]
    InvalidInteger {
        value: String,
        #[source]
        source: ParseIntError,
    },

    #[error("'{value}' is not a valid UUID key: {source}")]
    InvalidUuid {
        value: String,
        #[source]
        source: uuid::Error,
    },
}

/// The grain method a route is bound to.
#[derive(Debug, Clone)]
pub struct Invoker {
    interface: Arc<InterfaceDescriptor>,
    key_shape: KeyShape,
    method: MethodDescriptor,
}

impl Invoker {
    pub fn new(method: MethodDescriptor, key_shape: KeyShape) -> Self {
        Self {
            interface: method.interface().clone(),
            key_shape,
            method,
        }
    }

    pub fn interface(&self) -> &Arc<InterfaceDescriptor> {
        &self.interface
    }

    pub fn key_shape(&self) -> KeyShape {
        self.key_shape
    }

    pub fn method(&self) -> &MethodDescriptor {
        &self.method
    }

    /// Build the grain key for this route from the request's route values.
    pub fn resolve_key(&self, values: &RouteValues) -> Result<GrainKey, KeyError> {
        build_key(self.key_shape, values)
    }

    /// Call the bound method on `grain`.
    pub async fn invoke(
        &self,
        grain: &dyn GrainReference,
        arguments: CallArguments,
    ) -> Result<Value, InvocationError> {
        grain.invoke(self.method.name(), arguments).await
    }
}

/// Construct a key of `shape` from `grainId` (and `grainIdExtension` for
/// compound shapes).
pub fn build_key(shape: KeyShape, values: &RouteValues) -> Result<GrainKey, KeyError> {
    let primary = required(values, GRAIN_ID)?;

    match shape {
        KeyShape::String => Ok(GrainKey::String(primary.to_string())),
        KeyShape::Integer => Ok(GrainKey::Integer(parse_integer(primary)?)),
        KeyShape::Uuid => Ok(GrainKey::Uuid(parse_uuid(primary)?)),
        KeyShape::IntegerCompound => {
            let id = parse_integer(primary)?;
            let extension = required(values, GRAIN_ID_EXTENSION)?;
            Ok(GrainKey::IntegerCompound(id, extension.to_string()))
        }
        KeyShape::UuidCompound => {
            let id = parse_uuid(primary)?;
            let extension = required(values, GRAIN_ID_EXTENSION)?;
            Ok(GrainKey::UuidCompound(id, extension.to_string()))
        }
    }
}

fn required<'a>(values: &'a RouteValues, name: &'static str) -> Result<&'a str, KeyError> {
    values
        .get(name)
        .map(String::as_str)
        .ok_or(KeyError::MissingParameter(name))
}

fn parse_integer(raw: &str) -> Result<i64, KeyError> {
    raw.parse::<i64>().map_err(|source| KeyError::InvalidInteger {
        value: raw.to_string(),
        source,
    })
}

fn parse_uuid(raw: &str) -> Result<Uuid, KeyError> {
    Uuid::parse_str(raw).map_err(|source| KeyError::InvalidUuid {
        value: raw.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(pairs: &[(&str, &str)]) -> RouteValues {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_string_key_passes_through() {
        let key = build_key(KeyShape::String, &values(&[(GRAIN_ID, " Mixed Case ")])).unwrap();
        assert_eq!(key, GrainKey::String(" Mixed Case ".into()));
    }

    #[test]
    fn test_integer_key() {
        let key = build_key(KeyShape::Integer, &values(&[(GRAIN_ID, "-42")])).unwrap();
        assert_eq!(key, GrainKey::Integer(-42));

        let max = i64::MAX.to_string();
        let key = build_key(KeyShape::Integer, &values(&[(GRAIN_ID, max.as_str())])).unwrap();
        assert_eq!(key, GrainKey::Integer(i64::MAX));
    }

    #[test]
    fn test_integer_key_rejects_garbage() {
        for raw in ["abc", "4.2", "", "9223372036854775808", "0x10"] {
            let err = build_key(KeyShape::Integer, &values(&[(GRAIN_ID, raw)])).unwrap_err();
            assert!(matches!(err, KeyError::InvalidInteger { .. }), "{raw}");
        }
    }

    #[test]
    fn test_uuid_key() {
        let id = Uuid::new_v4();
        let raw = id.to_string();
        let key = build_key(KeyShape::Uuid, &values(&[(GRAIN_ID, raw.as_str())])).unwrap();
        assert_eq!(key, GrainKey::Uuid(id));

        let err = build_key(KeyShape::Uuid, &values(&[(GRAIN_ID, "not-a-uuid")])).unwrap_err();
        assert!(matches!(err, KeyError::InvalidUuid { .. }));
    }

    #[test]
    fn test_compound_keys() {
        let id = Uuid::new_v4();
        let raw = id.to_string();
        let key = build_key(
            KeyShape::UuidCompound,
            &values(&[(GRAIN_ID, raw.as_str()), (GRAIN_ID_EXTENSION, "eu-west")]),
        )
        .unwrap();
        assert_eq!(key, GrainKey::UuidCompound(id, "eu-west".into()));

        let key = build_key(
            KeyShape::IntegerCompound,
            &values(&[(GRAIN_ID, "7"), (GRAIN_ID_EXTENSION, "tenant")]),
        )
        .unwrap();
        assert_eq!(key, GrainKey::IntegerCompound(7, "tenant".into()));
    }

    #[test]
    fn test_missing_values() {
        let err = build_key(KeyShape::String, &values(&[])).unwrap_err();
        assert!(matches!(err, KeyError::MissingParameter(GRAIN_ID)));

        let err = build_key(KeyShape::IntegerCompound, &values(&[(GRAIN_ID, "7")])).unwrap_err();
        assert!(matches!(err, KeyError::MissingParameter(GRAIN_ID_EXTENSION)));
    }

    #[test]
    fn test_invoker_binds_owning_interface() {
        let iface = Arc::new(InterfaceDescriptor::new("OrderGrain").with_method("get"));
        let invoker = Invoker::new(MethodDescriptor::new(iface.clone(), "get"), KeyShape::Integer);

        assert_eq!(invoker.interface(), &iface);
        assert_eq!(invoker.key_shape(), KeyShape::Integer);
        assert_eq!(
            invoker.resolve_key(&values(&[(GRAIN_ID, "42")])).unwrap(),
            GrainKey::Integer(42)
        );
    }
}
