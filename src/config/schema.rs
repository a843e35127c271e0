//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::grain::KeyMarker;

/// Root configuration for the grain gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Request size limits.
    pub limits: LimitsConfig,

    /// Payload codecs.
    pub codecs: CodecConfig,

    /// In-process runtime settings.
    pub runtime: RuntimeConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Admin API settings.
    pub admin: AdminConfig,

    /// Grain interfaces the gateway can address.
    pub interfaces: Vec<InterfaceConfig>,

    /// Route definitions mapping requests to grain methods.
    pub routes: Vec<RouteConfig>,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,

    /// Grace period after shutdown begins before in-flight body reads are
    /// cancelled, in seconds.
    pub drain_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: 30,
            drain_secs: 30,
        }
    }
}

/// Request size limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// Codec configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Media types to serve (must be built-in codecs).
    pub enabled: Vec<String>,

    /// Media type used when the request names none.
    pub default_media_type: String,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            enabled: vec![
                "application/json".to_string(),
                "application/msgpack".to_string(),
                "application/protobuf".to_string(),
            ],
            default_media_type: "application/json".to_string(),
        }
    }
}

/// Settings for the in-process grain runtime.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Deadline for a single grain call in milliseconds.
    pub call_timeout_ms: u64,

    /// An activation unused for this long is deactivated, in seconds.
    pub idle_timeout_secs: u64,

    /// How often idle activations are swept, in seconds.
    pub sweep_interval_secs: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            call_timeout_ms: 10_000,
            idle_timeout_secs: 300,
            sweep_interval_secs: 30,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Admin API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Enable the admin API.
    pub enabled: bool,

    /// API key for authentication (Bearer token).
    pub api_key: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            // WARNING: This is a placeholder! Change this in production.
            api_key: "CHANGE_ME_IN_PRODUCTION".to_string(),
        }
    }
}

/// A grain interface.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InterfaceConfig {
    /// Interface name, referenced by routes.
    pub name: String,

    /// Key capabilities; the key shape is picked from these by priority.
    #[serde(default)]
    pub key_markers: Vec<KeyMarker>,

    /// Methods routes may bind to.
    #[serde(default)]
    pub methods: Vec<String>,
}

/// Route binding a URL pattern and verb to a grain method.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteConfig {
    /// URL pattern, e.g. "/orders/{grainId}".
    pub pattern: String,

    /// HTTP verb, or "*" for any.
    #[serde(default = "default_verb")]
    pub verb: String,

    /// Target interface name.
    pub interface: String,

    /// Target method name.
    pub method: String,
}

fn default_verb() -> String {
    "*".to_string()
}
