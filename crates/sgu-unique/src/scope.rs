//! Scope membership oracle
//!
//! A [`Scope`] is the caller-supplied boundary uniqueness is measured
//! against; [`is_unique_to`] is the sole admission test the deduplication
//! engine uses to decide whether cloning is required.

use crate::error::UniqueError;
use crate::paths::{enumerate_paths, Entity, InstancePath};
use serde::{Deserialize, Serialize};
use sgu_model::{DefinitionId, InstanceId, SceneGraph};

/// One element of a scope, a closed tagged variant with one coverage rule
/// per case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScopeElement {
    /// Covers a path when it is the definition of any instance on the path,
    /// the queried occurrence's own definition included.
    Definition(DefinitionId),

    /// Covers a path containing this instance literally.
    Instance(InstanceId),

    /// Covers a path it is an exact, ordered prefix of.
    Path(InstancePath),
}

/// Non-empty set of scope elements, supplied per invocation and never
/// persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scope {
    elements: Vec<ScopeElement>,
}

impl Scope {
    /// Scope from elements
    ///
    /// # Errors
    /// [`UniqueError::InvalidScope`] if `elements` is empty or contains an
    /// empty path element (an empty prefix would cover everything, which is
    /// never what a caller means).
    pub fn new(elements: Vec<ScopeElement>) -> Result<Self, UniqueError> {
        if elements.is_empty() {
            return Err(UniqueError::InvalidScope("scope is empty".into()));
        }
        for element in &elements {
            if let ScopeElement::Path(path) = element {
                if path.is_empty() {
                    return Err(UniqueError::InvalidScope(
                        "scope contains an empty instance path".into(),
                    ));
                }
            }
        }
        Ok(Self { elements })
    }

    /// Scope consisting of instance elements
    ///
    /// # Errors
    /// [`UniqueError::InvalidScope`] if `instances` is empty.
    pub fn of_instances(instances: &[InstanceId]) -> Result<Self, UniqueError> {
        Self::new(instances.iter().copied().map(ScopeElement::Instance).collect())
    }

    /// The elements, in supplied order
    #[inline]
    #[must_use]
    pub fn elements(&self) -> &[ScopeElement] {
        &self.elements
    }
}

/// Is every root-reachable occurrence of `definition` covered by `scope`?
///
/// A definition with zero reachable paths is vacuously unique to any scope:
/// an orphan has no occurrence an edit could leak to.
///
/// # Errors
/// [`UniqueError::TypeMismatch`] for handles that do not resolve in `graph`;
/// [`UniqueError::DepthLimitExceeded`] from the underlying path walk.
pub fn is_unique_to(
    graph: &SceneGraph,
    definition: DefinitionId,
    scope: &Scope,
) -> Result<bool, UniqueError> {
    let paths = enumerate_paths(graph, Entity::Definition(definition))?;
    for path in &paths {
        let mut covered = false;
        for element in scope.elements() {
            if covers(graph, element, path)? {
                covered = true;
                break;
            }
        }
        if !covered {
            return Ok(false);
        }
    }
    Ok(true)
}

/// One coverage predicate per scope-element kind.
fn covers(
    graph: &SceneGraph,
    element: &ScopeElement,
    path: &InstancePath,
) -> Result<bool, UniqueError> {
    match element {
        ScopeElement::Definition(definition) => {
            for &instance in path.elements() {
                if graph.definition_of(instance).map_err(UniqueError::stale)? == *definition {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        ScopeElement::Instance(instance) => Ok(path.elements().contains(instance)),
        ScopeElement::Path(prefix) => Ok(prefix.is_prefix_of(path)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sgu_model::{Container, Geometry, Transform};

    struct Nested {
        graph: SceneGraph,
        outer_def: DefinitionId,
        inner_def: DefinitionId,
        outer_a: InstanceId,
        outer_b: InstanceId,
        inner: InstanceId,
    }

    /// Two root placements of "outer", each containing the same "inner"
    /// child instance.
    fn nested() -> Nested {
        let mut graph = SceneGraph::new();
        let outer_def = graph.add_definition("outer", Geometry::default());
        let inner_def = graph.add_definition("inner", Geometry::default());
        let inner = graph
            .add_instance(inner_def, Container::Definition(outer_def), Transform::IDENTITY)
            .unwrap();
        let outer_a = graph
            .add_instance(outer_def, Container::Root, Transform::IDENTITY)
            .unwrap();
        let outer_b = graph
            .add_instance(outer_def, Container::Root, Transform::IDENTITY)
            .unwrap();
        Nested {
            graph,
            outer_def,
            inner_def,
            outer_a,
            outer_b,
            inner,
        }
    }

    #[test]
    fn empty_scope_rejected() {
        let err = Scope::new(Vec::new()).unwrap_err();
        assert!(matches!(err, UniqueError::InvalidScope(_)));

        let err = Scope::of_instances(&[]).unwrap_err();
        assert!(matches!(err, UniqueError::InvalidScope(_)));
    }

    #[test]
    fn empty_path_element_rejected() {
        let err = Scope::new(vec![ScopeElement::Path(InstancePath::new(Vec::new()))]).unwrap_err();
        assert!(matches!(err, UniqueError::InvalidScope(_)));
    }

    #[test]
    fn instance_element_covers_literal_member() {
        let m = nested();
        // Only one of the two routes to inner goes through outer_a.
        let partial = Scope::new(vec![ScopeElement::Instance(m.outer_a)]).unwrap();
        assert!(!is_unique_to(&m.graph, m.inner_def, &partial).unwrap());

        let full = Scope::new(vec![
            ScopeElement::Instance(m.outer_a),
            ScopeElement::Instance(m.outer_b),
        ])
        .unwrap();
        assert!(is_unique_to(&m.graph, m.inner_def, &full).unwrap());

        // The shared child instance itself appears on every route.
        let by_child = Scope::new(vec![ScopeElement::Instance(m.inner)]).unwrap();
        assert!(is_unique_to(&m.graph, m.inner_def, &by_child).unwrap());
    }

    #[test]
    fn definition_element_covers_ancestor_containment() {
        let m = nested();
        let scope = Scope::new(vec![ScopeElement::Definition(m.outer_def)]).unwrap();
        assert!(is_unique_to(&m.graph, m.inner_def, &scope).unwrap());
    }

    #[test]
    fn definition_element_matches_own_identity() {
        let m = nested();
        // The leaf of every path to inner_def is an instance of inner_def
        // itself, so the queried definition's own identity covers all paths.
        let scope = Scope::new(vec![ScopeElement::Definition(m.inner_def)]).unwrap();
        assert!(is_unique_to(&m.graph, m.inner_def, &scope).unwrap());
    }

    #[test]
    fn path_prefix_semantics() {
        let m = nested();
        let path_a = InstancePath::new([m.outer_a]);
        let path_b = InstancePath::new([m.outer_b]);
        let full_a = InstancePath::new([m.outer_a, m.inner]);

        // [outer_a] covers [outer_a, inner]; [outer_a, other] would not.
        assert!(path_a.is_prefix_of(&full_a));
        assert!(!path_b.is_prefix_of(&full_a));

        let partial = Scope::new(vec![ScopeElement::Path(path_a.clone())]).unwrap();
        assert!(!is_unique_to(&m.graph, m.inner_def, &partial).unwrap());

        let full = Scope::new(vec![
            ScopeElement::Path(path_a),
            ScopeElement::Path(path_b),
        ])
        .unwrap();
        assert!(is_unique_to(&m.graph, m.inner_def, &full).unwrap());
    }

    #[test]
    fn orphan_definition_is_vacuously_unique() {
        let mut m = nested();
        let orphan = m.graph.add_definition("orphan", Geometry::default());
        let scope = Scope::new(vec![ScopeElement::Instance(m.outer_a)]).unwrap();
        assert!(is_unique_to(&m.graph, orphan, &scope).unwrap());
    }

    #[test]
    fn single_path_definition_unique_to_any_covering_scope() {
        let mut graph = SceneGraph::new();
        let d = graph.add_definition("solo", Geometry::default());
        let i = graph.add_instance(d, Container::Root, Transform::IDENTITY).unwrap();

        for scope in [
            Scope::new(vec![ScopeElement::Instance(i)]).unwrap(),
            Scope::new(vec![ScopeElement::Definition(d)]).unwrap(),
            Scope::new(vec![ScopeElement::Path(InstancePath::new([i]))]).unwrap(),
        ] {
            assert!(is_unique_to(&graph, d, &scope).unwrap());
        }
    }

    #[test]
    fn stale_definition_is_type_mismatch() {
        let m = nested();
        let scope = Scope::new(vec![ScopeElement::Instance(m.outer_a)]).unwrap();
        let err = is_unique_to(&m.graph, DefinitionId::from_raw(99), &scope).unwrap_err();
        assert!(matches!(err, UniqueError::TypeMismatch(_)));
    }

    #[test]
    fn scope_elements_keep_supplied_order() {
        let m = nested();
        let scope = Scope::new(vec![
            ScopeElement::Instance(m.outer_b),
            ScopeElement::Instance(m.outer_a),
        ])
        .unwrap();
        assert_eq!(
            scope.elements(),
            &[
                ScopeElement::Instance(m.outer_b),
                ScopeElement::Instance(m.outer_a),
            ]
        );
    }
}
