//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, one mount per route pattern)
//!     → request.rs (request ID, codec selection, parameters)
//!     → handler.rs (decode, dispatch to routing::GrainRouter)
//!     → response.rs (status mapping, encode result)
//!     → Send to client
//! ```

pub mod handler;
pub mod request;
pub mod response;
pub mod server;

pub use request::{RequestIdExt, X_REQUEST_ID};
pub use response::HandlerError;
pub use server::{AppState, GatewayServer};
