//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route Registration (at startup):
//!     (pattern, verb, MethodDescriptor)
//!     → key_type.rs (KeyShape resolved once per interface)
//!     → invoker.rs (Invoker bound to interface, shape, method)
//!     → table.rs (RouteTableBuilder → frozen RouteTable)
//!
//! Matched Request (pattern already matched by the HTTP layer):
//!     → router.rs (GrainRouter::dispatch)
//!     → table lookup (exact verb, then wildcard)
//!     → invoker.rs (route values → GrainKey)
//!     → GrainProvider → GrainReference::invoke
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - Deterministic lookup: exact verb beats wildcard
//! - Malformed keys are an outcome, not an error

pub mod invoker;
pub mod key_type;
pub mod route;
pub mod router;
pub mod table;

use std::collections::HashMap;

pub use invoker::{Invoker, KeyError};
pub use key_type::{KeyShape, KeyTypeResolver};
pub use route::{RouteKey, RouteVerb};
pub use router::{DispatchError, DispatchOutcome, DispatchRequest, GrainRouter};
pub use table::{RouteTable, RouteTableBuilder};

/// Route parameter carrying the primary grain key.
pub const GRAIN_ID: &str = "grainId";

/// Route parameter carrying the key extension of compound keys.
pub const GRAIN_ID_EXTENSION: &str = "grainIdExtension";

/// Path parameters captured by the HTTP matcher.
pub type RouteValues = HashMap<String, String>;
