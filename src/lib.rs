//! Grain Gateway Library
//!
//! Exposes grain methods as HTTP endpoints: routes bind a URL pattern and
//! verb to a method of a grain interface, the grain key is parsed from the
//! path, and payloads are decoded and encoded by media-type codecs.

// Core subsystems
pub mod codec;
pub mod config;
pub mod grain;
pub mod http;
pub mod routing;

// Cross-cutting concerns
pub mod admin;
pub mod lifecycle;
pub mod observability;

pub use config::schema::GatewayConfig;
pub use http::GatewayServer;
pub use lifecycle::Shutdown;
