//! Key shape inference for grain interfaces.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::grain::{InterfaceDescriptor, KeyMarker};

/// The identifier structure an interface requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyShape {
    Uuid,
    String,
    Integer,
    IntegerCompound,
    UuidCompound,
}

impl KeyShape {
    /// Whether keys of this shape carry an extension string.
    pub fn is_compound(self) -> bool {
        matches!(self, KeyShape::IntegerCompound | KeyShape::UuidCompound)
    }
}

impl fmt::Display for KeyShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            KeyShape::Uuid => "uuid",
            KeyShape::String => "string",
            KeyShape::Integer => "integer",
            KeyShape::IntegerCompound => "integer_compound",
            KeyShape::UuidCompound => "uuid_compound",
        };
        f.write_str(name)
    }
}

/// Markers checked in priority order, highest first.
const PRIORITY: [(KeyMarker, KeyShape); 4] = [
    (KeyMarker::Uuid, KeyShape::Uuid),
    (KeyMarker::UuidCompound, KeyShape::UuidCompound),
    (KeyMarker::Integer, KeyShape::Integer),
    (KeyMarker::IntegerCompound, KeyShape::IntegerCompound),
];

/// Infers the key shape of an interface from its declared markers.
pub struct KeyTypeResolver;

impl KeyTypeResolver {
    /// Pick the highest-priority marker; `String` when none applies.
    pub fn resolve(interface: &InterfaceDescriptor) -> KeyShape {
        PRIORITY
            .iter()
            .find(|(marker, _)| interface.has_marker(*marker))
            .map(|(_, shape)| *shape)
            .unwrap_or(KeyShape::String)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_markers(markers: &[KeyMarker]) -> InterfaceDescriptor {
        markers
            .iter()
            .fold(InterfaceDescriptor::new("Grain"), |iface, m| iface.with_marker(*m))
    }

    #[test]
    fn test_single_markers() {
        assert_eq!(KeyTypeResolver::resolve(&with_markers(&[KeyMarker::Uuid])), KeyShape::Uuid);
        assert_eq!(KeyTypeResolver::resolve(&with_markers(&[KeyMarker::Integer])), KeyShape::Integer);
        assert_eq!(
            KeyTypeResolver::resolve(&with_markers(&[KeyMarker::IntegerCompound])),
            KeyShape::IntegerCompound
        );
        assert_eq!(
            KeyTypeResolver::resolve(&with_markers(&[KeyMarker::UuidCompound])),
            KeyShape::UuidCompound
        );
        assert_eq!(KeyTypeResolver::resolve(&with_markers(&[KeyMarker::String])), KeyShape::String);
    }

    #[test]
    fn test_no_marker_falls_back_to_string() {
        assert_eq!(KeyTypeResolver::resolve(&with_markers(&[])), KeyShape::String);
    }

    #[test]
    fn test_uuid_beats_integer() {
        let iface = with_markers(&[KeyMarker::Integer, KeyMarker::Uuid]);
        assert_eq!(KeyTypeResolver::resolve(&iface), KeyShape::Uuid);
    }

    #[test]
    fn test_overlapping_markers_follow_priority() {
        let cases: &[(&[KeyMarker], KeyShape)] = &[
            (&[KeyMarker::UuidCompound, KeyMarker::Uuid], KeyShape::Uuid),
            (&[KeyMarker::Integer, KeyMarker::UuidCompound], KeyShape::UuidCompound),
            (&[KeyMarker::IntegerCompound, KeyMarker::Integer], KeyShape::Integer),
            (&[KeyMarker::String, KeyMarker::IntegerCompound], KeyShape::IntegerCompound),
            (&[KeyMarker::String, KeyMarker::Integer, KeyMarker::Uuid], KeyShape::Uuid),
            (
                &[
                    KeyMarker::IntegerCompound,
                    KeyMarker::Integer,
                    KeyMarker::UuidCompound,
                    KeyMarker::String,
                ],
                KeyShape::UuidCompound,
            ),
        ];

        for (markers, expected) in cases {
            assert_eq!(
                KeyTypeResolver::resolve(&with_markers(markers)),
                *expected,
                "markers {:?}",
                markers
            );
        }
    }

    #[test]
    fn test_compound_shapes() {
        assert!(KeyShape::IntegerCompound.is_compound());
        assert!(KeyShape::UuidCompound.is_compound());
        assert!(!KeyShape::Integer.is_compound());
    }
}
