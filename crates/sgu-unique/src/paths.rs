//! Instance path enumeration
//!
//! Provides [`InstancePath`] and [`enumerate_paths`], the read-only walk the
//! scope oracle and the deduplication engine are built on.

use crate::error::UniqueError;
use serde::{Deserialize, Serialize};
use sgu_model::{Container, DefinitionId, InstanceId, SceneGraph};
use smallvec::SmallVec;
use std::fmt::{self, Display, Formatter};

/// Upward walks past this depth are treated as host-model corruption.
///
/// The containment graph is acyclic by contract, so no cycle guard is needed
/// for a well-formed model; the cap turns a corrupt model into a fatal error
/// instead of an unbounded walk.
pub const MAX_NESTING_DEPTH: usize = 1024;

/// An entity whose root-reachable occurrences can be enumerated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Entity {
    /// One placement
    Instance(InstanceId),

    /// A blueprint; its occurrences are the union over its placements
    Definition(DefinitionId),
}

/// Ordered, root-first chain of instances identifying one concrete
/// occurrence of an entity.
///
/// Immutable value type. Each element is nested in the previous element's
/// definition; the first element sits in the model root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InstancePath(SmallVec<[InstanceId; 8]>);

impl InstancePath {
    /// Path from root-first elements
    #[inline]
    #[must_use]
    pub fn new(elements: impl IntoIterator<Item = InstanceId>) -> Self {
        Self(elements.into_iter().collect())
    }

    /// Root-first elements
    #[inline]
    #[must_use]
    pub fn elements(&self) -> &[InstanceId] {
        &self.0
    }

    /// Number of elements; equals the nesting depth of the occurrence
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True for a path with no elements
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The innermost instance
    #[inline]
    #[must_use]
    pub fn leaf(&self) -> Option<InstanceId> {
        self.0.last().copied()
    }

    /// The root-level instance
    #[inline]
    #[must_use]
    pub fn root(&self) -> Option<InstanceId> {
        self.0.first().copied()
    }

    /// True if `other` begins with exactly this path, in order
    ///
    /// Order matters: the acyclic model admits only one nesting order, so a
    /// reordered prefix identifies a different (impossible) occurrence.
    #[inline]
    #[must_use]
    pub fn is_prefix_of(&self, other: &Self) -> bool {
        if self.0.len() > other.0.len() {
            return false;
        }
        self.0[..] == other.0[..self.0.len()]
    }
}

impl Display for InstancePath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for id in &self.0 {
            if !first {
                write!(f, " / ")?;
            }
            write!(f, "{id}")?;
            first = false;
        }
        Ok(())
    }
}

impl FromIterator<InstanceId> for InstancePath {
    fn from_iter<T: IntoIterator<Item = InstanceId>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Enumerate every root-to-entity path through the shared-definition graph.
///
/// For an instance, walks upward through its container chain, branching
/// across every placement of each ancestor definition; sharing multiplies
/// the number of routes from the root. For a definition, the result is the
/// union over its own placements.
///
/// The output size is combinatorial in the degree of sharing along the route
/// to root. That is an intrinsic cost of shared-definition graphs, not a
/// defect: every returned path is a distinct concrete occurrence.
///
/// A detached entity (unreachable from the root) yields an empty list.
///
/// # Errors
/// [`UniqueError::TypeMismatch`] if the entity does not resolve in `graph`;
/// [`UniqueError::DepthLimitExceeded`] if the walk passes
/// [`MAX_NESTING_DEPTH`] (host-model corruption).
pub fn enumerate_paths(graph: &SceneGraph, entity: Entity) -> Result<Vec<InstancePath>, UniqueError> {
    match entity {
        Entity::Instance(instance) => paths_to_instance(graph, instance),
        Entity::Definition(definition) => {
            let placements = graph.instances_of(definition).map_err(UniqueError::stale)?;
            let mut all = Vec::new();
            for &placed in placements {
                all.extend(paths_to_instance(graph, placed)?);
            }
            Ok(all)
        }
    }
}

/// Upward walk from one instance, explicit work-stack, no native recursion.
fn paths_to_instance(
    graph: &SceneGraph,
    leaf: InstanceId,
) -> Result<Vec<InstancePath>, UniqueError> {
    // Validate the argument up front so a stale handle is a TypeMismatch,
    // not a silent empty result.
    graph.container_of(leaf).map_err(UniqueError::stale)?;

    let mut complete = Vec::new();
    let mut stack: Vec<Vec<InstanceId>> = vec![vec![leaf]];

    while let Some(chain) = stack.pop() {
        if chain.len() > MAX_NESTING_DEPTH {
            return Err(UniqueError::DepthLimitExceeded { depth: chain.len() });
        }
        let top = chain[0];
        match graph.container_of(top).map_err(UniqueError::stale)? {
            Container::Root => complete.push(InstancePath::new(chain)),
            Container::Definition(parent) => {
                let placements = graph.instances_of(parent).map_err(UniqueError::stale)?;
                // A parent definition with no placements drops the chain:
                // the occurrence is detached, not an error.
                for &placed in placements.iter().rev() {
                    let mut extended = Vec::with_capacity(chain.len() + 1);
                    extended.push(placed);
                    extended.extend_from_slice(&chain);
                    stack.push(extended);
                }
            }
        }
    }

    Ok(complete)
}
