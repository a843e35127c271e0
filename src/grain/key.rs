//! Typed grain identity.

use std::fmt;
use uuid::Uuid;

use crate::routing::KeyShape;

/// The key that identifies one grain activation within its interface.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GrainKey {
    Uuid(Uuid),
    String(String),
    Integer(i64),
    IntegerCompound(i64, String),
    UuidCompound(Uuid, String),
}

impl GrainKey {
    /// The key shape this key satisfies.
    pub fn shape(&self) -> KeyShape {
        match self {
            GrainKey::Uuid(_) => KeyShape::Uuid,
            GrainKey::String(_) => KeyShape::String,
            GrainKey::Integer(_) => KeyShape::Integer,
            GrainKey::IntegerCompound(..) => KeyShape::IntegerCompound,
            GrainKey::UuidCompound(..) => KeyShape::UuidCompound,
        }
    }

    /// The key extension, for compound keys.
    pub fn extension(&self) -> Option<&str> {
        match self {
            GrainKey::IntegerCompound(_, ext) | GrainKey::UuidCompound(_, ext) => Some(ext),
            _ => None,
        }
    }
}

impl fmt::Display for GrainKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GrainKey::Uuid(id) => write!(f, "{}", id),
            GrainKey::String(id) => f.write_str(id),
            GrainKey::Integer(id) => write!(f, "{}", id),
            GrainKey::IntegerCompound(id, ext) => write!(f, "{}+{}", id, ext),
            GrainKey::UuidCompound(id, ext) => write!(f, "{}+{}", id, ext),
        }
    }
}
