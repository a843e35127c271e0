//! Grain interface and method descriptors.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Key capability declared by a grain interface.
///
/// An interface may declare several markers; the routing layer picks one
/// key shape from them by fixed priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyMarker {
    Uuid,
    UuidCompound,
    Integer,
    IntegerCompound,
    String,
}

impl fmt::Display for KeyMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            KeyMarker::Uuid => "uuid",
            KeyMarker::UuidCompound => "uuid_compound",
            KeyMarker::Integer => "integer",
            KeyMarker::IntegerCompound => "integer_compound",
            KeyMarker::String => "string",
        };
        f.write_str(name)
    }
}

/// Describes a grain interface: its name, key markers and callable methods.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceDescriptor {
    name: String,
    markers: Vec<KeyMarker>,
    methods: Vec<String>,
}

impl InterfaceDescriptor {
    /// Create an interface with no markers and no methods.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            markers: Vec::new(),
            methods: Vec::new(),
        }
    }

    /// Declare a key marker. Duplicates are ignored.
    pub fn with_marker(mut self, marker: KeyMarker) -> Self {
        if !self.markers.contains(&marker) {
            self.markers.push(marker);
        }
        self
    }

    /// Declare a callable method.
    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        let method = method.into();
        if !self.methods.contains(&method) {
            self.methods.push(method);
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn markers(&self) -> &[KeyMarker] {
        &self.markers
    }

    pub fn has_marker(&self, marker: KeyMarker) -> bool {
        self.markers.contains(&marker)
    }

    pub fn methods(&self) -> &[String] {
        &self.methods
    }

    pub fn has_method(&self, method: &str) -> bool {
        self.methods.iter().any(|m| m == method)
    }
}

/// A method bound to its owning interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDescriptor {
    interface: Arc<InterfaceDescriptor>,
    name: String,
}

impl MethodDescriptor {
    pub fn new(interface: Arc<InterfaceDescriptor>, name: impl Into<String>) -> Self {
        Self {
            interface,
            name: name.into(),
        }
    }

    /// The interface that declares this method.
    pub fn interface(&self) -> &Arc<InterfaceDescriptor> {
        &self.interface
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.interface.name(), self.name)
    }
}
