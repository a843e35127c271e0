//! Catalog of grain interfaces known to the gateway.

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::InterfaceConfig;
use crate::grain::descriptor::{InterfaceDescriptor, MethodDescriptor};

/// Interfaces indexed by name.
///
/// Built once at startup and only read afterwards.
#[derive(Debug, Default, Clone)]
pub struct GrainCatalog {
    interfaces: HashMap<String, Arc<InterfaceDescriptor>>,
}

impl GrainCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from the `[[interfaces]]` config section.
    /// Later entries with a repeated name replace earlier ones; validation
    /// rejects such configs before they get here.
    pub fn from_config(configs: &[InterfaceConfig]) -> Self {
        let mut catalog = Self::new();
        for config in configs {
            let mut iface = InterfaceDescriptor::new(config.name.clone());
            for marker in &config.key_markers {
                iface = iface.with_marker(*marker);
            }
            for method in &config.methods {
                iface = iface.with_method(method.clone());
            }
            catalog.insert(iface);
        }
        catalog
    }

    /// Add an interface, returning the shared descriptor.
    pub fn insert(&mut self, iface: InterfaceDescriptor) -> Arc<InterfaceDescriptor> {
        let iface = Arc::new(iface);
        self.interfaces
            .insert(iface.name().to_string(), iface.clone());
        iface
    }

    pub fn interface(&self, name: &str) -> Option<&Arc<InterfaceDescriptor>> {
        self.interfaces.get(name)
    }

    /// Resolve `interface.method` to a descriptor, if both exist.
    pub fn method(&self, interface: &str, method: &str) -> Option<MethodDescriptor> {
        let iface = self.interfaces.get(interface)?;
        if !iface.has_method(method) {
            return None;
        }
        Some(MethodDescriptor::new(iface.clone(), method))
    }

    pub fn interfaces(&self) -> impl Iterator<Item = &Arc<InterfaceDescriptor>> {
        self.interfaces.values()
    }

    pub fn len(&self) -> usize {
        self.interfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interfaces.is_empty()
    }
}
