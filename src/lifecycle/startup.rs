//! Startup orchestration.
//!
//! # Responsibilities
//! - Validate configuration
//! - Build the grain catalog and the route table from it
//! - Build the codec registry and the HTTP server
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Overlapping routes are logged and skipped; the first one wins
//! - The grain provider is injected; startup does not pick a runtime

use std::sync::Arc;
use thiserror::Error;

use crate::codec::registry::RegistryError;
use crate::codec::CodecRegistry;
use crate::config::{validate_config, ConfigError, GatewayConfig};
use crate::grain::{GrainCatalog, GrainProvider};
use crate::http::GatewayServer;
use crate::routing::route::InvalidVerb;
use crate::routing::{GrainRouter, RouteTable, RouteTableBuilder, RouteVerb};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("route '{pattern}': {source}")]
    InvalidVerb {
        pattern: String,
        #[source]
        source: InvalidVerb,
    },

    #[error("route '{pattern}': no method '{method}' on interface '{interface}'")]
    UnknownMethod {
        pattern: String,
        interface: String,
        method: String,
    },

    #[error(transparent)]
    Codec(#[from] RegistryError),
}

/// Interfaces declared in config.
pub fn build_catalog(config: &GatewayConfig) -> GrainCatalog {
    let catalog = GrainCatalog::from_config(&config.interfaces);
    tracing::info!(interfaces = catalog.len(), "Grain catalog built");
    catalog
}

/// Register every configured route against `catalog`.
pub fn build_route_table(
    config: &GatewayConfig,
    catalog: &GrainCatalog,
) -> Result<RouteTable, StartupError> {
    let mut builder = RouteTableBuilder::new();
    let mut skipped = 0usize;

    for route in &config.routes {
        let verb = route.verb.parse::<RouteVerb>().map_err(|source| StartupError::InvalidVerb {
            pattern: route.pattern.clone(),
            source,
        })?;
        let method = catalog
            .method(&route.interface, &route.method)
            .ok_or_else(|| StartupError::UnknownMethod {
                pattern: route.pattern.clone(),
                interface: route.interface.clone(),
                method: route.method.clone(),
            })?;

        if !builder.register_route(route.pattern.clone(), verb, method) {
            skipped += 1;
        }
    }

    let table = builder.build();
    tracing::info!(routes = table.len(), skipped, "Route table built");
    Ok(table)
}

/// Validate `config` and assemble a server dispatching to `provider`.
pub fn build_server(
    config: &GatewayConfig,
    provider: Arc<dyn GrainProvider>,
) -> Result<GatewayServer, StartupError> {
    validate_config(config).map_err(ConfigError::Validation)?;

    let catalog = build_catalog(config);
    let table = build_route_table(config, &catalog)?;
    let codecs = CodecRegistry::from_config(&config.codecs)?;
    tracing::info!(
        media_types = ?codecs.media_types(),
        default = codecs.default_codec().media_type(),
        "Codecs registered"
    );

    let router = GrainRouter::new(Arc::new(table), provider);
    Ok(GatewayServer::new(config, router, Arc::new(codecs)))
}
