//! Route table: built once at startup, read-only while serving.
//!
//! # Responsibilities
//! - Reject colliding registrations
//! - Resolve and cache the key shape of each interface
//! - Look up the invoker for a matched `(pattern, verb)`
//!
//! # Design Decisions
//! - Two types for the two phases: `RouteTableBuilder` is mutated through
//!   `&mut self` during startup; `RouteTable` has no mutators and is shared
//!   via `Arc`, so concurrent lookups need no locks
//! - Lookup is two-tier: exact verb first, `*` only as fallback
//! - A registration that overlaps an existing one (same pattern, equal verbs
//!   or either verb `*`) is refused, so the first registration wins

use axum::http::Method;
use std::collections::HashMap;
use std::sync::Arc;

use crate::grain::MethodDescriptor;
use crate::routing::{Invoker, KeyShape, KeyTypeResolver, RouteKey, RouteVerb};

#[derive(Debug, Default, Clone)]
struct PatternRoutes {
    exact: HashMap<Method, Arc<Invoker>>,
    wildcard: Option<Arc<Invoker>>,
}

/// Mutable route table used during registration.
#[derive(Debug, Default)]
pub struct RouteTableBuilder {
    registered: Vec<(RouteKey, Arc<Invoker>)>,
    key_shapes: HashMap<String, KeyShape>,
}

impl RouteTableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `(pattern, verb)` to `method`.
    ///
    /// Returns `false`, leaving the table untouched, when an overlapping
    /// route is already registered.
    pub fn register_route(
        &mut self,
        pattern: impl Into<String>,
        verb: RouteVerb,
        method: MethodDescriptor,
    ) -> bool {
        let key = RouteKey::new(pattern, verb);

        if let Some((existing, invoker)) = self.registered.iter().find(|(k, _)| k.overlaps(&key)) {
            tracing::warn!(
                route = %key,
                existing = %existing,
                bound_to = %invoker.method(),
                "Route already registered"
            );
            return false;
        }

        let interface = method.interface().clone();
        let key_shape = *self
            .key_shapes
            .entry(interface.name().to_string())
            .or_insert_with(|| KeyTypeResolver::resolve(&interface));

        tracing::debug!(
            route = %key,
            method = %method,
            key_shape = %key_shape,
            "Route registered"
        );

        self.registered
            .push((key, Arc::new(Invoker::new(method, key_shape))));
        true
    }

    /// Number of registered routes.
    pub fn len(&self) -> usize {
        self.registered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registered.is_empty()
    }

    /// Freeze the table for serving.
    pub fn build(self) -> RouteTable {
        let mut routes: HashMap<String, PatternRoutes> = HashMap::new();
        for (key, invoker) in &self.registered {
            let entry = routes.entry(key.pattern.clone()).or_default();
            match &key.verb {
                RouteVerb::Any => entry.wildcard = Some(invoker.clone()),
                RouteVerb::Method(m) => {
                    entry.exact.insert(m.clone(), invoker.clone());
                }
            }
        }

        RouteTable {
            routes,
            entries: self.registered,
        }
    }
}

/// Immutable route table.
#[derive(Debug, Default, Clone)]
pub struct RouteTable {
    routes: HashMap<String, PatternRoutes>,
    entries: Vec<(RouteKey, Arc<Invoker>)>,
}

impl RouteTable {
    /// Find the invoker for a matched pattern and request method.
    pub fn lookup(&self, pattern: &str, method: &Method) -> Option<&Arc<Invoker>> {
        let routes = self.routes.get(pattern)?;
        routes.exact.get(method).or(routes.wildcard.as_ref())
    }

    /// All routes, in registration order.
    pub fn entries(&self) -> impl Iterator<Item = (&RouteKey, &Arc<Invoker>)> {
        self.entries.iter().map(|(k, i)| (k, i))
    }

    /// Distinct patterns with the verbs registered for each.
    pub fn patterns(&self) -> Vec<(&str, Vec<RouteVerb>)> {
        let mut patterns: Vec<(&str, Vec<RouteVerb>)> = Vec::new();
        for (key, _) in &self.entries {
            match patterns.iter_mut().find(|(p, _)| *p == key.pattern) {
                Some((_, verbs)) => verbs.push(key.verb.clone()),
                None => patterns.push((key.pattern.as_str(), vec![key.verb.clone()])),
            }
        }
        patterns
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
