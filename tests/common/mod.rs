//! Shared utilities for integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::Router;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

use grain_gateway::config::{GatewayConfig, InterfaceConfig, RouteConfig};
use grain_gateway::grain::{
    CallArguments, GrainKey, GrainProvider, GrainReference, InterfaceDescriptor, InvocationError,
    KeyMarker,
};
use grain_gateway::lifecycle::{build_server, Shutdown};

/// Provider that records every resolution.
///
/// Grains answer by method name: `noop` returns `null`, `fail` a remote
/// error, `stall` a timeout; anything else echoes the call.
#[derive(Default)]
pub struct RecordingProvider {
    calls: Mutex<Vec<(String, GrainKey)>>,
}

impl RecordingProvider {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> Vec<(String, GrainKey)> {
        self.calls.lock().unwrap().clone()
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
        Ok(Arc::new(ScriptedGrain { key: key.clone() }))
    }
}

struct ScriptedGrain {
    key: GrainKey,
}

#[async_trait]
impl GrainReference for ScriptedGrain {
    async fn invoke(&self, method: &str, arguments: CallArguments) -> Result<Value, InvocationError> {
        match method {
            "noop" => Ok(Value::Null),
            "fail" => Err(InvocationError::Remote("grain exploded".into())),
            "stall" => Err(InvocationError::Timeout(Duration::from_millis(10))),
            _ => Ok(json!({
                "key": self.key.to_string(),
                "method": method,
                "body": arguments.body,
                "parameters": arguments.parameters,
            })),
        }
    }
}

pub fn interface(name: &str, markers: &[KeyMarker], methods: &[&str]) -> InterfaceConfig {
    InterfaceConfig {
        name: name.to_string(),
        key_markers: markers.to_vec(),
        methods: methods.iter().map(|m| m.to_string()).collect(),
    }
}

pub fn route(pattern: &str, verb: &str, interface: &str, method: &str) -> RouteConfig {
    RouteConfig {
        pattern: pattern.to_string(),
        verb: verb.to_string(),
        interface: interface.to_string(),
        method: method.to_string(),
    }
}

/// Orders (integer keys), profiles (uuid keys) and carts (uuid + extension).
pub fn gateway_config() -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.admin.enabled = true;
    config.admin.api_key = "test-key".to_string();

    config.interfaces = vec![
        interface(
            "OrderGrain",
            &[KeyMarker::Integer],
            &["get", "update", "noop", "fail", "stall"],
        ),
        interface("ProfileGrain", &[KeyMarker::Uuid, KeyMarker::Integer], &["get"]),
        interface("CartGrain", &[KeyMarker::UuidCompound], &["get"]),
    ];
    config.routes = vec![
        route("/orders/{grainId}", "GET", "OrderGrain", "get"),
        route("/orders/{grainId}", "PUT", "OrderGrain", "update"),
        route("/orders/{grainId}/noop", "*", "OrderGrain", "noop"),
        route("/orders/{grainId}/fail", "POST", "OrderGrain", "fail"),
        route("/orders/{grainId}/stall", "POST", "OrderGrain", "stall"),
        route("/profiles/{grainId}", "*", "ProfileGrain", "get"),
        route("/carts/{grainId}/{grainIdExtension}", "GET", "CartGrain", "get"),
    ];
    config
}

pub fn build_router(config: &GatewayConfig, provider: Arc<RecordingProvider>) -> Router {
    build_server(config, provider).unwrap().router()
}

/// Serve on an ephemeral port. Trigger the returned `Shutdown` to stop.
pub async fn start_gateway(
    config: &GatewayConfig,
    provider: Arc<RecordingProvider>,
) -> (SocketAddr, Shutdown) {
    let server = build_server(config, provider).unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });

    (addr, shutdown)
}
