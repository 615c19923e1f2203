//! Opaque content carried by the graph
//!
//! The deduplication core never interprets geometry; it only copies it
//! wholesale when a definition is cloned. Placement math beyond the identity
//! transform is the host's concern.

use serde::{Deserialize, Serialize};

/// Placement of an instance relative to its container, as a row-major 4x4
/// matrix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform(pub [[f64; 4]; 4]);

impl Transform {
    /// The identity placement
    pub const IDENTITY: Self = Self([
        [1.0, 0.0, 0.0, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ]);

    /// A pure translation
    #[inline]
    #[must_use]
    pub fn translation(x: f64, y: f64, z: f64) -> Self {
        let mut m = Self::IDENTITY;
        m.0[0][3] = x;
        m.0[1][3] = y;
        m.0[2][3] = z;
        m
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Opaque content payload owned by a definition
///
/// A label for humans plus an uninterpreted byte blob. Cloning a definition
/// duplicates this wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Geometry {
    /// Human-readable description of the content
    pub label: String,

    /// Uninterpreted content bytes
    pub data: Vec<u8>,
}

impl Geometry {
    /// Content with a label and no bytes
    #[inline]
    #[must_use]
    pub fn labeled(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            data: Vec::new(),
        }
    }

    /// Content with a label and a byte payload
    #[inline]
    #[must_use]
    pub fn with_data(label: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            label: label.into(),
            data,
        }
    }
}
