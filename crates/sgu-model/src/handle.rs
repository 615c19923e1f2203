//! Stable handles into the scene-graph arena
//!
//! Arena entries are never removed while a [`crate::SceneGraph`] is alive
//! (unreferenced definitions are left for the host to garbage-collect), so a
//! handle stays valid for the life of the graph it came from.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Handle to a reusable content blueprint
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct DefinitionId(pub(crate) u32);

impl DefinitionId {
    /// Handle from a raw arena index; only meaningful for the graph it came
    /// from
    #[inline]
    #[must_use]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Arena slot index
    #[inline]
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl Display for DefinitionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "def#{}", self.0)
    }
}

/// Handle to one placement of a definition
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct InstanceId(pub(crate) u32);

impl InstanceId {
    /// Handle from a raw arena index; only meaningful for the graph it came
    /// from
    #[inline]
    #[must_use]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Arena slot index
    #[inline]
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl Display for InstanceId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "inst#{}", self.0)
    }
}

/// Where an instance is nested
///
/// The model root is a sentinel, not a definition: an upward walk terminates
/// when it reaches [`Container::Root`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Container {
    /// Directly in the model root
    Root,

    /// Inside another definition's content
    Definition(DefinitionId),
}

impl Container {
    /// True for the model-root sentinel
    #[inline]
    #[must_use]
    pub fn is_root(self) -> bool {
        matches!(self, Self::Root)
    }

    /// The containing definition, if any
    #[inline]
    #[must_use]
    pub fn definition(self) -> Option<DefinitionId> {
        match self {
            Self::Root => None,
            Self::Definition(id) => Some(id),
        }
    }
}

impl Display for Container {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Root => write!(f, "root"),
            Self::Definition(id) => write!(f, "{id}"),
        }
    }
}
