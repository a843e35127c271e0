//! Codec registry keyed by media type token.

use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

use crate::codec::{JsonCodec, MediaTypeCodec, MsgPackCodec, ProtobufCodec};
use crate::config::CodecConfig;

/// Media types with a codec built into the gateway.
pub const BUILTIN_MEDIA_TYPES: [&str; 3] = [
    JsonCodec::MEDIA_TYPE,
    MsgPackCodec::MEDIA_TYPE,
    ProtobufCodec::MEDIA_TYPE,
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("no built-in codec for media type '{0}'")]
    UnknownMediaType(String),

    #[error("default media type '{0}' is not enabled")]
    DefaultNotEnabled(String),
}

/// Token → codec lookup with a designated default.
///
/// Lookups are exact; negotiating which token to ask for is up to the caller.
#[derive(Debug, Clone)]
pub struct CodecRegistry {
    codecs: HashMap<&'static str, Arc<dyn MediaTypeCodec>>,
    default: Arc<dyn MediaTypeCodec>,
}

impl CodecRegistry {
    /// A registry holding only `default`.
    pub fn new(default: Arc<dyn MediaTypeCodec>) -> Self {
        let mut codecs: HashMap<&'static str, Arc<dyn MediaTypeCodec>> = HashMap::new();
        codecs.insert(default.media_type(), default.clone());
        Self { codecs, default }
    }

    /// JSON (default), MessagePack and Protobuf.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new(Arc::new(JsonCodec));
        registry.register(Arc::new(MsgPackCodec));
        registry.register(Arc::new(ProtobufCodec));
        registry
    }

    /// Build from the `[codecs]` config section.
    pub fn from_config(config: &CodecConfig) -> Result<Self, RegistryError> {
        let mut enabled = Vec::with_capacity(config.enabled.len());
        for token in &config.enabled {
            enabled.push(builtin(token).ok_or_else(|| RegistryError::UnknownMediaType(token.clone()))?);
        }

        let default = enabled
            .iter()
            .find(|codec| codec.media_type() == config.default_media_type)
            .cloned()
            .ok_or_else(|| RegistryError::DefaultNotEnabled(config.default_media_type.clone()))?;

        let mut registry = Self::new(default);
        for codec in enabled {
            registry.register(codec);
        }
        Ok(registry)
    }

    /// Add a codec, replacing any codec with the same token.
    pub fn register(&mut self, codec: Arc<dyn MediaTypeCodec>) {
        let token = codec.media_type();
        if self.codecs.insert(token, codec).is_some() {
            tracing::debug!(media_type = token, "Codec replaced");
        }
    }

    /// Exact token lookup.
    pub fn get(&self, media_type: &str) -> Option<&Arc<dyn MediaTypeCodec>> {
        self.codecs.get(media_type)
    }

    pub fn default_codec(&self) -> &Arc<dyn MediaTypeCodec> {
        &self.default
    }

    /// Registered tokens, sorted.
    pub fn media_types(&self) -> Vec<&'static str> {
        let mut types: Vec<_> = self.codecs.keys().copied().collect();
        types.sort_unstable();
        types
    }

    pub fn codecs(&self) -> impl Iterator<Item = &Arc<dyn MediaTypeCodec>> {
        self.codecs.values()
    }
}

impl Default for CodecRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

/// The built-in codec for `media_type`, if there is one.
pub fn builtin(media_type: &str) -> Option<Arc<dyn MediaTypeCodec>> {
    match media_type {
        JsonCodec::MEDIA_TYPE => Some(Arc::new(JsonCodec)),
        MsgPackCodec::MEDIA_TYPE => Some(Arc::new(MsgPackCodec)),
        ProtobufCodec::MEDIA_TYPE => Some(Arc::new(ProtobufCodec)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins() {
        let registry = CodecRegistry::with_builtins();
        assert_eq!(
            registry.media_types(),
            vec!["application/json", "application/msgpack", "application/protobuf"]
        );
        assert_eq!(registry.default_codec().media_type(), "application/json");
    }

    #[test]
    fn test_every_builtin_token_resolves() {
        for token in BUILTIN_MEDIA_TYPES {
            assert_eq!(builtin(token).unwrap().media_type(), token);
        }
    }

    #[test]
    fn test_lookup_is_exact() {
        let registry = CodecRegistry::with_builtins();
        assert!(registry.get("application/msgpack").is_some());
        assert!(registry.get("Application/MsgPack").is_none());
        assert!(registry.get("application/json; charset=utf-8").is_none());
    }

    #[test]
    fn test_from_config() {
        let config = CodecConfig {
            enabled: vec!["application/msgpack".into()],
            default_media_type: "application/msgpack".into(),
        };
        let registry = CodecRegistry::from_config(&config).unwrap();
        assert_eq!(registry.media_types(), vec!["application/msgpack"]);
        assert_eq!(registry.default_codec().media_type(), "application/msgpack");
    }

    #[test]
    fn test_from_config_errors() {
        let config = CodecConfig {
            enabled: vec!["application/xml".into()],
            default_media_type: "application/json".into(),
        };
        assert_eq!(
            CodecRegistry::from_config(&config).unwrap_err(),
            RegistryError::UnknownMediaType("application/xml".into())
        );

        let config = CodecConfig {
            enabled: vec!["application/json".into()],
            default_media_type: "application/msgpack".into(),
        };
        assert_eq!(
            CodecRegistry::from_config(&config).unwrap_err(),
            RegistryError::DefaultNotEnabled("application/msgpack".into())
        );
    }
}
