//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!     → lifecycle::startup builds catalog, route table, codecs
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; the route table cannot change while
//!   serving, so there is no hot reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    AdminConfig, CodecConfig, GatewayConfig, InterfaceConfig, LimitsConfig, ListenerConfig,
    ObservabilityConfig, RouteConfig, RuntimeConfig, TimeoutConfig,
};
pub use validation::{validate_config, ValidationError};
