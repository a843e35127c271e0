//! Runtime boundary: resolving grains and invoking their methods.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::grain::descriptor::InterfaceDescriptor;
use crate::grain::key::GrainKey;

/// Errors raised by the runtime while resolving or calling a grain.
///
/// The gateway passes these through unchanged; only the HTTP layer maps
/// them to status codes.
#[derive(Debug, Error)]
pub enum InvocationError {
    /// The grain method itself failed.
    #[error("Grain call failed: {0}")]
    Remote(String),

    /// The call did not complete within the runtime's deadline.
    #[error("Grain call timed out after {0:?}")]
    Timeout(Duration),

    /// The runtime cannot activate or reach the grain.
    #[error("Grain unavailable: {0}")]
    Unavailable(String),

    /// The grain does not implement the requested method.
    #[error("Method '{method}' not found on '{interface}'")]
    MethodNotFound { interface: String, method: String },
}

/// Request-derived arguments for one grain call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallArguments {
    /// Decoded request body, `Value::Null` when the request had none.
    pub body: Value,
    /// Query string merged with route values.
    pub parameters: HashMap<String, String>,
}

/// A handle to one grain activation.
#[async_trait]
pub trait GrainReference: Send + Sync {
    /// Invoke `method` on the grain.
    async fn invoke(&self, method: &str, arguments: CallArguments) -> Result<Value, InvocationError>;
}

/// Resolves grain references from the runtime.
///
/// Implementations must be safe to share across concurrent dispatches.
pub trait GrainProvider: Send + Sync {
    /// Get a reference to the grain `(interface, key)`, activating it if needed.
    fn resolve_or_activate(
        &self,
        interface: &InterfaceDescriptor,
        key: &GrainKey,
    ) -> Result<Arc<dyn GrainReference>, InvocationError>;
}
