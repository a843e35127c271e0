//! In-process grain runtime.
//!
//! # Responsibilities
//! - Activate grains on first use and reuse the activation afterwards
//! - Deactivate grains that sat idle past a timeout
//! - Enforce a per-call deadline
//! - Provide a loopback grain for running the gateway without a cluster
//!
//! # Design Decisions
//! - Activation directory is a `DashMap` so concurrent dispatches never
//!   serialize on a global lock
//! - Factories are registered per interface, with an optional fallback
//! - Last use is an atomic timestamp, so touching an activation only needs
//!   the shard read lock; a periodic sweep drops idle ones
//! - A call already holding a reference finishes even if its activation is
//!   swept; the next call activates afresh

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::broadcast;
use tokio::time::MissedTickBehavior;

use crate::grain::descriptor::InterfaceDescriptor;
use crate::grain::key::GrainKey;
use crate::grain::provider::{CallArguments, GrainProvider, GrainReference, InvocationError};
use crate::observability::metrics;

/// Creates the activation for a grain.
pub type GrainFactory =
    Arc<dyn Fn(&InterfaceDescriptor, &GrainKey) -> Arc<dyn GrainReference> + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ActivationKey {
    interface: String,
    key: GrainKey,
}

struct Activation {
    grain: Arc<dyn GrainReference>,
    /// Milliseconds since the provider's epoch.
    last_used: AtomicU64,
}

impl Activation {
    fn touch(&self, now: u64) {
        self.last_used.store(now, Ordering::Relaxed);
    }
}

/// A `GrainProvider` that hosts grains inside the gateway process.
pub struct LocalGrainProvider {
    factories: HashMap<String, GrainFactory>,
    fallback: Option<GrainFactory>,
    activations: DashMap<ActivationKey, Activation>,
    call_timeout: Duration,
    epoch: Instant,
}

impl LocalGrainProvider {
    /// Create a provider with no factories.
    pub fn new(call_timeout: Duration) -> Self {
        Self {
            factories: HashMap::new(),
            fallback: None,
            activations: DashMap::new(),
            call_timeout,
            epoch: Instant::now(),
        }
    }

    /// A provider that answers every interface with a `LoopbackGrain`.
    pub fn loopback(call_timeout: Duration) -> Self {
        Self::new(call_timeout).with_fallback(|iface, key| {
            Arc::new(LoopbackGrain::new(iface.name(), key.clone()))
        })
    }

    /// Register the factory for one interface.
    pub fn with_factory<F>(mut self, interface: impl Into<String>, factory: F) -> Self
    where
        F: Fn(&InterfaceDescriptor, &GrainKey) -> Arc<dyn GrainReference> + Send + Sync + 'static,
    {
        self.factories.insert(interface.into(), Arc::new(factory));
        self
    }

    /// Register the factory used for interfaces without their own.
    pub fn with_fallback<F>(mut self, factory: F) -> Self
    where
        F: Fn(&InterfaceDescriptor, &GrainKey) -> Arc<dyn GrainReference> + Send + Sync + 'static,
    {
        self.fallback = Some(Arc::new(factory));
        self
    }

    /// Number of live activations.
    pub fn activation_count(&self) -> usize {
        self.activations.len()
    }

    pub fn call_timeout(&self) -> Duration {
        self.call_timeout
    }

    fn now_ms(&self) -> u64 {
        self.epoch.elapsed().as_millis() as u64
    }

    /// Drop activations unused for at least `idle`. Returns how many went.
    pub fn deactivate_idle(&self, idle: Duration) -> usize {
        let now = self.now_ms();
        let idle_ms = idle.as_millis() as u64;
        let mut removed = 0usize;

        self.activations.retain(|_, activation| {
            let keep = now.saturating_sub(activation.last_used.load(Ordering::Relaxed)) < idle_ms;
            if !keep {
                removed += 1;
            }
            keep
        });

        let remaining = self.activations.len();
        if removed > 0 {
            tracing::debug!(removed, remaining, "Deactivated idle grains");
        }
        metrics::record_activations(remaining);
        removed
    }

    /// Sweep idle activations every `every` until `shutdown` fires.
    pub async fn run_deactivation(
        self: Arc<Self>,
        idle: Duration,
        every: Duration,
        mut shutdown: broadcast::Receiver<()>,
    ) {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.deactivate_idle(idle);
                }
                _ = shutdown.recv() => {
                    tracing::debug!("Deactivation sweep stopped");
                    break;
                }
            }
        }
    }
}

impl GrainProvider for LocalGrainProvider {
    fn resolve_or_activate(
        &self,
        interface: &InterfaceDescriptor,
        key: &GrainKey,
    ) -> Result<Arc<dyn GrainReference>, InvocationError> {
        let activation_key = ActivationKey {
            interface: interface.name().to_string(),
            key: key.clone(),
        };

        let now = self.now_ms();
        let existing = self.activations.get(&activation_key).map(|activation| {
            activation.touch(now);
            activation.grain.clone()
        });

        let grain = match existing {
            Some(grain) => grain,
            None => {
                let factory = self
                    .factories
                    .get(interface.name())
                    .or(self.fallback.as_ref())
                    .ok_or_else(|| {
                        InvocationError::Unavailable(format!(
                            "no activation factory for '{}'",
                            interface.name()
                        ))
                    })?;

                // Guard must be released before reading the map length.
                let grain = {
                    let activation = self.activations.entry(activation_key).or_insert_with(|| {
                        tracing::debug!(
                            interface = %interface.name(),
                            key = %key,
                            "Activating grain"
                        );
                        Activation {
                            grain: factory(interface, key),
                            last_used: AtomicU64::new(now),
                        }
                    });
                    activation.touch(now);
                    activation.grain.clone()
                };
                metrics::record_activations(self.activations.len());
                grain
            }
        };

        Ok(Arc::new(TimedReference {
            inner: grain,
            timeout: self.call_timeout,
        }))
    }
}

/// Applies the provider's call deadline to an activation.
struct TimedReference {
    inner: Arc<dyn GrainReference>,
    timeout: Duration,
}

#[async_trait]
impl GrainReference for TimedReference {
    async fn invoke(&self, method: &str, arguments: CallArguments) -> Result<Value, InvocationError> {
        match tokio::time::timeout(self.timeout, self.inner.invoke(method, arguments)).await {
            Ok(result) => result,
            Err(_) => Err(InvocationError::Timeout(self.timeout)),
        }
    }
}

/// Echoes every call back to the caller.
#[derive(Debug, Clone)]
pub struct LoopbackGrain {
    interface: String,
    key: GrainKey,
}

impl LoopbackGrain {
    pub fn new(interface: impl Into<String>, key: GrainKey) -> Self {
        Self {
            interface: interface.into(),
            key,
        }
    }
}

#[async_trait]
impl GrainReference for LoopbackGrain {
    async fn invoke(&self, method: &str, arguments: CallArguments) -> Result<Value, InvocationError> {
        Ok(json!({
            "interface": self.interface,
            "key": self.key.to_string(),
            "method": method,
            "body": arguments.body,
            "parameters": arguments.parameters,
        }))
    }
}
