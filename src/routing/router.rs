//! Request dispatch onto grain methods.
//!
//! # Responsibilities
//! - Look up the invoker for a request the HTTP layer already matched
//! - Build the grain key, or reject the request when it is malformed
//! - Resolve the grain through the injected provider and call it
//!
//! # Design Decisions
//! - Per request: Matched → KeyResolving → Rejected | Invoking → Completed
//! - No retries; runtime outcomes pass through unchanged
//! - A missing route is an invariant violation, reported as an error

use axum::http::{Method, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

use crate::grain::{CallArguments, GrainProvider, InvocationError};
use crate::observability::metrics;
use crate::routing::{KeyError, RouteTable, RouteValues};

/// A request after pattern matching.
#[derive(Debug, Clone)]
pub struct DispatchRequest {
    /// Route pattern the request matched, e.g. `/orders/{grainId}`.
    pub pattern: String,
    pub verb: Method,
    pub route_values: RouteValues,
    pub arguments: CallArguments,
}

/// Result of a dispatch that reached a decision.
#[derive(Debug)]
pub enum DispatchOutcome {
    /// The grain call completed with this value.
    Completed(Value),
    /// The grain key was malformed; the grain was not called.
    Rejected(KeyError),
}

impl DispatchOutcome {
    /// Status the HTTP layer answers with for rejected requests.
    pub const REJECTED_STATUS: StatusCode = StatusCode::BAD_REQUEST;
}

/// Failures surfaced by dispatch.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The matcher accepted a route this table does not know.
    #[error("no route registered for {verb} {pattern}")]
    RouteNotRegistered { pattern: String, verb: Method },

    #[error(transparent)]
    Invocation(#[from] InvocationError),
}

/// Dispatches matched requests to grains.
#[derive(Clone)]
pub struct GrainRouter {
    table: Arc<RouteTable>,
    provider: Arc<dyn GrainProvider>,
}

impl GrainRouter {
    pub fn new(table: Arc<RouteTable>, provider: Arc<dyn GrainProvider>) -> Self {
        Self { table, provider }
    }

    pub fn table(&self) -> &Arc<RouteTable> {
        &self.table
    }

    /// Dispatch one request.
    pub async fn dispatch(&self, request: DispatchRequest) -> Result<DispatchOutcome, DispatchError> {
        let invoker = match self.table.lookup(&request.pattern, &request.verb) {
            Some(invoker) => invoker,
            None => {
                tracing::error!(
                    pattern = %request.pattern,
                    verb = %request.verb,
                    "Matched route missing from route table"
                );
                return Err(DispatchError::RouteNotRegistered {
                    pattern: request.pattern,
                    verb: request.verb,
                });
            }
        };

        let key = match invoker.resolve_key(&request.route_values) {
            Ok(key) => key,
            Err(e) => {
                tracing::warn!(
                    interface = %invoker.interface().name(),
                    key_shape = %invoker.key_shape(),
                    route = %request.pattern,
                    error = %e,
                    "Failure getting grain"
                );
                metrics::record_key_rejected(invoker.interface().name(), invoker.key_shape());
                return Ok(DispatchOutcome::Rejected(e));
            }
        };

        tracing::debug!(
            interface = %invoker.interface().name(),
            key = %key,
            method = %invoker.method().name(),
            "Invoking grain"
        );

        let grain = self.provider.resolve_or_activate(invoker.interface(), &key)?;
        let value = invoker.invoke(grain.as_ref(), request.arguments).await?;
        Ok(DispatchOutcome::Completed(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grain::{GrainKey, GrainReference, InterfaceDescriptor, KeyMarker, MethodDescriptor};
    use crate::routing::{RouteTableBuilder, RouteVerb, GRAIN_ID, GRAIN_ID_EXTENSION};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use uuid::Uuid;

    /// Records every resolution and echoes the key back.
    #[derive(Default)]
    struct RecordingProvider {
        calls: Mutex<Vec<(String, GrainKey)>>,
    }

    struct EchoKey(GrainKey);

    #[async_trait]
    impl GrainReference for EchoKey {
        async fn invoke(&self, method: &str, _arguments: CallArguments) -> Result<Value, InvocationError> {
            Ok(serde_json::json!({ "key": self.0.to_string(), "method": method }))
        }
    }

    impl GrainProvider for RecordingProvider {
        fn resolve_or_activate(
            &self,
            interface: &InterfaceDescriptor,
            key: &GrainKey,
        ) -> Result<Arc<dyn GrainReference>, InvocationError> {
            self.calls
                .lock()
                .unwrap()
                .push((interface.name().to_string(), key.clone()));
            Ok(Arc::new(EchoKey(key.clone())))
        }
    }

    struct FailingProvider;

    impl GrainProvider for FailingProvider {
        fn resolve_or_activate(
            &self,
            _interface: &InterfaceDescriptor,
            _key: &GrainKey,
        ) -> Result<Arc<dyn GrainReference>, InvocationError> {
            Err(InvocationError::Unavailable("silo down".into()))
        }
    }

    fn table() -> Arc<RouteTable> {
        let orders = Arc::new(
            InterfaceDescriptor::new("OrderGrain")
                .with_marker(KeyMarker::Integer)
                .with_method("get"),
        );
        let carts = Arc::new(
            InterfaceDescriptor::new("CartGrain")
                .with_marker(KeyMarker::UuidCompound)
                .with_method("items"),
        );

        let mut builder = RouteTableBuilder::new();
        builder.register_route("/orders/{grainId}", RouteVerb::Method(Method::GET), MethodDescriptor::new(orders, "get"));
        builder.register_route(
            "/carts/{grainId}/{grainIdExtension}",
            RouteVerb::Any,
            MethodDescriptor::new(carts, "items"),
        );
        Arc::new(builder.build())
    }

    fn request(pattern: &str, verb: Method, values: &[(&str, &str)]) -> DispatchRequest {
        DispatchRequest {
            pattern: pattern.to_string(),
            verb,
            route_values: values.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
            arguments: CallArguments::default(),
        }
    }

    #[tokio::test]
    async fn test_integer_route_dispatches() {
        let provider = Arc::new(RecordingProvider::default());
        let router = GrainRouter::new(table(), provider.clone());

        let outcome = router
            .dispatch(request("/orders/{grainId}", Method::GET, &[(GRAIN_ID, "42")]))
            .await
            .unwrap();

        match outcome {
            DispatchOutcome::Completed(value) => {
                assert_eq!(value["key"], "42");
                assert_eq!(value["method"], "get");
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        let calls = provider.calls.lock().unwrap();
        assert_eq!(calls.as_slice(), &[("OrderGrain".to_string(), GrainKey::Integer(42))]);
    }

    #[tokio::test]
    async fn test_non_numeric_key_rejected_without_calling_provider() {
        let provider = Arc::new(RecordingProvider::default());
        let router = GrainRouter::new(table(), provider.clone());

        let outcome = router
            .dispatch(request("/orders/{grainId}", Method::GET, &[(GRAIN_ID, "abc")]))
            .await
            .unwrap();

        assert!(matches!(outcome, DispatchOutcome::Rejected(KeyError::InvalidInteger { .. })));
        assert!(provider.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_uuid_compound_key_reaches_provider() {
        let provider = Arc::new(RecordingProvider::default());
        let router = GrainRouter::new(table(), provider.clone());
        let id = Uuid::new_v4();
        let raw = id.to_string();

        let outcome = router
            .dispatch(request(
                "/carts/{grainId}/{grainIdExtension}",
                Method::PUT,
                &[(GRAIN_ID, raw.as_str()), (GRAIN_ID_EXTENSION, "eu-west")],
            ))
            .await
            .unwrap();

        assert!(matches!(outcome, DispatchOutcome::Completed(_)));
        let calls = provider.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "CartGrain");
        assert_eq!(calls[0].1, GrainKey::UuidCompound(id, "eu-west".into()));
    }

    #[tokio::test]
    async fn test_wildcard_route_accepts_any_verb() {
        let provider = Arc::new(RecordingProvider::default());
        let router = GrainRouter::new(table(), provider.clone());
        let raw = Uuid::new_v4().to_string();

        for verb in [Method::GET, Method::POST, Method::DELETE] {
            let outcome = router
                .dispatch(request(
                    "/carts/{grainId}/{grainIdExtension}",
                    verb,
                    &[(GRAIN_ID, raw.as_str()), (GRAIN_ID_EXTENSION, "x")],
                ))
                .await
                .unwrap();
            assert!(matches!(outcome, DispatchOutcome::Completed(_)));
        }
        assert_eq!(provider.calls.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_unregistered_route_is_an_error() {
        let router = GrainRouter::new(table(), Arc::new(RecordingProvider::default()));

        let err = router
            .dispatch(request("/orders/{grainId}", Method::POST, &[(GRAIN_ID, "1")]))
            .await
            .unwrap_err();

        assert!(matches!(err, DispatchError::RouteNotRegistered { .. }));
    }

    #[tokio::test]
    async fn test_provider_failure_passes_through() {
        let router = GrainRouter::new(table(), Arc::new(FailingProvider));

        let err = router
            .dispatch(request("/orders/{grainId}", Method::GET, &[(GRAIN_ID, "1")]))
            .await
            .unwrap_err();

        assert!(matches!(err, DispatchError::Invocation(InvocationError::Unavailable(_))));
    }
}
