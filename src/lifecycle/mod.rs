//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Validate config → GrainCatalog → RouteTable → CodecRegistry → GatewayServer
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Stop accepting → Cancel in-flight decoding → Drain → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then routes, then listeners
//! - Fail fast: an invalid config never starts serving
//! - The route table is fixed for the life of the process; no reload signal

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::{build_catalog, build_route_table, build_server, StartupError};
