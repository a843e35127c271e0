//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check referential integrity (routes reference existing interfaces and methods)
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Check that route patterns carry the key placeholders their interface needs
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Patterns are trial-mounted on a `matchit` router, the matcher axum
//!   uses, so anything axum would refuse is reported here instead
//! - Overlapping routes are not an error here; the route table keeps the
//!   first registration and logs the rest

use std::collections::HashSet;
use std::net::SocketAddr;
use thiserror::Error;

use crate::codec::registry::builtin;
use crate::config::schema::{GatewayConfig, InterfaceConfig, RouteConfig};
use crate::grain::InterfaceDescriptor;
use crate::routing::{KeyShape, KeyTypeResolver, RouteVerb, GRAIN_ID, GRAIN_ID_EXTENSION};

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: invalid socket address '{value}'")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{0} must be greater than zero")]
    ZeroValue(&'static str),

    #[error("interface '{0}' is defined more than once")]
    DuplicateInterface(String),

    #[error("route {index}: unknown interface '{interface}'")]
    UnknownInterface { index: usize, interface: String },

    #[error("route {index}: interface '{interface}' has no method '{method}'")]
    UnknownMethod {
        index: usize,
        interface: String,
        method: String,
    },

    #[error("route {index}: invalid verb '{verb}'")]
    InvalidVerb { index: usize, verb: String },

    #[error("route {index}: pattern '{pattern}' must start with '/'")]
    InvalidPattern { index: usize, pattern: String },

    #[error("route {index}: pattern '{pattern}' is missing the {{{placeholder}}} placeholder")]
    MissingPlaceholder {
        index: usize,
        pattern: String,
        placeholder: &'static str,
    },

    #[error("route {index}: pattern '{pattern}' uses segment '{segment}'; captures are written {{name}}")]
    LegacySegment {
        index: usize,
        pattern: String,
        segment: String,
    },

    #[error("route {index}: pattern '{pattern}' cannot be mounted: {reason}")]
    UnmountablePattern {
        index: usize,
        pattern: String,
        reason: String,
    },

    #[error("route {index}: pattern '{pattern}' is reserved for the admin API")]
    ReservedPattern { index: usize, pattern: String },

    #[error("codecs: no built-in codec for '{0}'")]
    UnknownCodec(String),

    #[error("codecs: default media type '{0}' is not enabled")]
    DefaultCodecNotEnabled(String),
}

/// Validate a parsed configuration, collecting every problem found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_address(&mut errors, "listener.bind_address", &config.listener.bind_address);
    if config.observability.metrics_enabled {
        check_address(
            &mut errors,
            "observability.metrics_address",
            &config.observability.metrics_address,
        );
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroValue("timeouts.request_secs"));
    }
    if config.runtime.call_timeout_ms == 0 {
        errors.push(ValidationError::ZeroValue("runtime.call_timeout_ms"));
    }
    if config.runtime.idle_timeout_secs == 0 {
        errors.push(ValidationError::ZeroValue("runtime.idle_timeout_secs"));
    }
    if config.runtime.sweep_interval_secs == 0 {
        errors.push(ValidationError::ZeroValue("runtime.sweep_interval_secs"));
    }
    if config.limits.max_body_bytes == 0 {
        errors.push(ValidationError::ZeroValue("limits.max_body_bytes"));
    }

    let mut seen = HashSet::new();
    for iface in &config.interfaces {
        if !seen.insert(iface.name.as_str()) {
            errors.push(ValidationError::DuplicateInterface(iface.name.clone()));
        }
    }

    let mut mounted = matchit::Router::new();
    let mut patterns = HashSet::new();
    for (index, route) in config.routes.iter().enumerate() {
        validate_route(&mut errors, index, route, &config.interfaces);

        if config.admin.enabled && is_admin_path(&route.pattern) {
            errors.push(ValidationError::ReservedPattern {
                index,
                pattern: route.pattern.clone(),
            });
        }

        if !route.pattern.starts_with('/') {
            continue;
        }
        if let Some(segment) = legacy_segment(&route.pattern) {
            errors.push(ValidationError::LegacySegment {
                index,
                pattern: route.pattern.clone(),
                segment: segment.to_string(),
            });
            continue;
        }
        // One mount per distinct pattern; verbs share it.
        if patterns.insert(route.pattern.as_str()) {
            if let Err(e) = mounted.insert(route.pattern.as_str(), index) {
                errors.push(ValidationError::UnmountablePattern {
                    index,
                    pattern: route.pattern.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    for token in &config.codecs.enabled {
        if builtin(token).is_none() {
            errors.push(ValidationError::UnknownCodec(token.clone()));
        }
    }
    if !config.codecs.enabled.contains(&config.codecs.default_media_type) {
        errors.push(ValidationError::DefaultCodecNotEnabled(
            config.codecs.default_media_type.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_address(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}

fn validate_route(
    errors: &mut Vec<ValidationError>,
    index: usize,
    route: &RouteConfig,
    interfaces: &[InterfaceConfig],
) {
    if route.verb.parse::<RouteVerb>().is_err() {
        errors.push(ValidationError::InvalidVerb {
            index,
            verb: route.verb.clone(),
        });
    }

    if !route.pattern.starts_with('/') {
        errors.push(ValidationError::InvalidPattern {
            index,
            pattern: route.pattern.clone(),
        });
    }

    let Some(iface) = interfaces.iter().find(|i| i.name == route.interface) else {
        errors.push(ValidationError::UnknownInterface {
            index,
            interface: route.interface.clone(),
        });
        return;
    };

    if !iface.methods.contains(&route.method) {
        errors.push(ValidationError::UnknownMethod {
            index,
            interface: route.interface.clone(),
            method: route.method.clone(),
        });
    }

    let shape = key_shape(iface);
    let mut required = vec![GRAIN_ID];
    if shape.is_compound() {
        required.push(GRAIN_ID_EXTENSION);
    }
    for placeholder in required {
        if !route.pattern.contains(&format!("{{{placeholder}}}")) {
            errors.push(ValidationError::MissingPlaceholder {
                index,
                pattern: route.pattern.clone(),
                placeholder,
            });
        }
    }
}

fn is_admin_path(pattern: &str) -> bool {
    pattern == "/admin" || pattern.starts_with("/admin/")
}

/// Segments in the `:name` / `*name` capture syntax that axum refuses.
fn legacy_segment(pattern: &str) -> Option<&str> {
    pattern
        .split('/')
        .find(|segment| segment.starts_with(':') || segment.starts_with('*'))
}

fn key_shape(iface: &InterfaceConfig) -> KeyShape {
    let descriptor = iface
        .key_markers
        .iter()
        .fold(InterfaceDescriptor::new(iface.name.clone()), |d, m| d.with_marker(*m));
    KeyTypeResolver::resolve(&descriptor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grain::KeyMarker;

    fn interface(name: &str, markers: &[KeyMarker], methods: &[&str]) -> InterfaceConfig {
        InterfaceConfig {
            name: name.to_string(),
            key_markers: markers.to_vec(),
            methods: methods.iter().map(|m| m.to_string()).collect(),
        }
    }

    fn route(pattern: &str, verb: &str, iface: &str, method: &str) -> RouteConfig {
        RouteConfig {
            pattern: pattern.to_string(),
            verb: verb.to_string(),
            interface: iface.to_string(),
            method: method.to_string(),
        }
    }

    fn base_config() -> GatewayConfig {
        let mut config = GatewayConfig::default();
        config.interfaces.push(interface("OrderGrain", &[KeyMarker::Integer], &["get"]));
        config
            .routes
            .push(route("/orders/{grainId}", "GET", "OrderGrain", "get"));
        config
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&GatewayConfig::default()).is_ok());
        assert!(validate_config(&base_config()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = base_config();
        config.listener.bind_address = "not-an-address".to_string();
        config.timeouts.request_secs = 0;
        config.runtime.sweep_interval_secs = 0;
        config.routes.push(route("orders", "", "Nope", "get"));

        let errors = validate_config(&config).unwrap_err();
        assert!(errors.contains(&ValidationError::ZeroValue("timeouts.request_secs")));
        assert!(errors.contains(&ValidationError::ZeroValue("runtime.sweep_interval_secs")));
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::InvalidAddress { .. })));
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::InvalidVerb { index: 1, .. })));
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::InvalidPattern { index: 1, .. })));
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::UnknownInterface { index: 1, .. })));
    }

    #[test]
    fn test_unknown_method() {
        let mut config = base_config();
        config.routes[0].method = "delete".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(matches!(errors[0], ValidationError::UnknownMethod { .. }));
    }

    #[test]
    fn test_duplicate_interface() {
        let mut config = base_config();
        config.interfaces.push(interface("OrderGrain", &[], &["get"]));
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors, vec![ValidationError::DuplicateInterface("OrderGrain".to_string())]);
    }

    #[test]
    fn test_compound_key_needs_extension_placeholder() {
        let mut config = base_config();
        config.interfaces.push(interface(
            "CartGrain",
            &[KeyMarker::IntegerCompound],
            &["get"],
        ));
        config.routes.push(route("/carts/{grainId}", "*", "CartGrain", "get"));

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::MissingPlaceholder {
                index: 1,
                pattern: "/carts/{grainId}".to_string(),
                placeholder: GRAIN_ID_EXTENSION,
            }]
        );

        config.routes[1].pattern = "/carts/{grainId}/{grainIdExtension}".to_string();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_conflicting_patterns() {
        let mut config = base_config();
        config.routes.push(route("/orders/{grainId}", "POST", "OrderGrain", "get"));
        assert!(validate_config(&config).is_ok());

        config.routes.push(route("/orders/{id}", "PUT", "OrderGrain", "get"));
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::UnmountablePattern { index: 2, .. })));
    }

    #[test]
    fn test_legacy_capture_syntax_rejected() {
        let mut config = base_config();
        config
            .routes
            .push(route("/legacy/:x/{grainId}", "GET", "OrderGrain", "get"));
        config
            .routes
            .push(route("/files/*rest/{grainId}", "GET", "OrderGrain", "get"));

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::LegacySegment {
                    index: 1,
                    pattern: "/legacy/:x/{grainId}".to_string(),
                    segment: ":x".to_string(),
                },
                ValidationError::LegacySegment {
                    index: 2,
                    pattern: "/files/*rest/{grainId}".to_string(),
                    segment: "*rest".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_malformed_capture_rejected() {
        let mut config = base_config();
        config
            .routes
            .push(route("/broken/{grainId}{grainIdExtension}", "GET", "OrderGrain", "get"));

        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::UnmountablePattern { index: 1, .. })));
    }

    #[test]
    fn test_admin_paths_reserved_when_enabled() {
        let mut config = base_config();
        config.routes[0].pattern = "/admin/{grainId}".to_string();
        assert!(validate_config(&config).is_ok());

        config.admin.enabled = true;
        let errors = validate_config(&config).unwrap_err();
        assert!(matches!(errors[0], ValidationError::ReservedPattern { index: 0, .. }));
    }

    #[test]
    fn test_codec_errors() {
        let mut config = base_config();
        config.codecs.enabled = vec!["application/msgpack".to_string(), "text/xml".to_string()];
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.contains(&ValidationError::UnknownCodec("text/xml".to_string())));
        assert!(errors.contains(&ValidationError::DefaultCodecNotEnabled(
            "application/json".to_string()
        )));
    }
}
