//! Grain model and runtime boundary.
//!
//! # Data Flow
//! ```text
//! config [[interfaces]]
//!     → catalog.rs (InterfaceDescriptor per interface, MethodDescriptor per method)
//!     → routing (key shape resolved once per interface)
//!
//! Per request:
//!     GrainKey (key.rs)
//!     → provider.rs (GrainProvider::resolve_or_activate)
//!     → GrainReference::invoke(method, arguments)
//! ```
//!
//! # Design Decisions
//! - The distributed runtime is reached only through the narrow
//!   `GrainProvider` / `GrainReference` traits, injected at construction
//! - Arguments and results travel as `serde_json::Value`, the neutral form
//!   every codec transcodes to and from
//! - `local.rs` is an in-process runtime for development and tests

pub mod catalog;
pub mod descriptor;
pub mod key;
pub mod local;
pub mod provider;

pub use catalog::GrainCatalog;
pub use descriptor::{InterfaceDescriptor, KeyMarker, MethodDescriptor};
pub use key::GrainKey;
pub use local::{LocalGrainProvider, LoopbackGrain};
pub use provider::{CallArguments, GrainProvider, GrainReference, InvocationError};
