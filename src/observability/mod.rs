//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured fields on every event (interface, route, key_shape, request_id)
//! - Request ID flows from the HTTP layer into dispatch logs
//! - Metrics are cheap (atomic increments); with no recorder installed they
//!   are no-ops

pub mod logging;
pub mod metrics;
