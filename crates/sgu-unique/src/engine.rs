//! Deduplication engine
//!
//! Walks an instance subtree depth-first, asks the scope oracle whether each
//! definition leaks outside scope, clones the leaking ones through the
//! model's clone primitive, and memoizes clones in a replacement table so
//! instances that shared a definition keep sharing its clone.

use crate::error::UniqueError;
use crate::scope::{is_unique_to, Scope, ScopeElement};
use indexmap::IndexMap;
use sgu_model::{DefinitionId, InstanceId, SceneGraph};

/// Make every definition reachable from `scope_instances` unique to that
/// scope.
///
/// One synchronous depth-first pass over an explicit work-stack: seeds in
/// argument order, then children in enumeration order, so results are
/// deterministic: the first instance encountered for a definition decides
/// whether and when that definition is cloned. The number of clones is
/// bounded by the number of distinct definitions that violate
/// scope-uniqueness, independent of how many instances reference them.
///
/// Must run inside an open transaction: the model rejects cloning outside
/// one, and on error the caller is expected to abort so no half-cloned graph
/// is ever observable. See [`deep_make_unique_in_transaction`] for the
/// wrapped form.
///
/// # Errors
/// [`UniqueError::InvalidScope`] for an empty seed list;
/// [`UniqueError::HostCloneFailure`] if the clone primitive fails (the walk
/// stops immediately); [`UniqueError::TypeMismatch`] for stale handles.
pub fn deep_make_unique(
    graph: &mut SceneGraph,
    scope_instances: &[InstanceId],
) -> Result<(), UniqueError> {
    let scope = Scope::of_instances(scope_instances)?;
    run(graph, scope_instances.to_vec(), &scope)
}

/// [`deep_make_unique`] generalized to a full [`Scope`].
///
/// Seeds the walk from every element: instance elements directly, definition
/// elements through each of their placements, path elements through their
/// root instance. The oracle sees the same scope.
///
/// Path elements must seed from the root, not the leaf: a deep leaf is a
/// child of a still-shared ancestor definition, and rebinding it directly
/// would rewrite every occurrence routed through that ancestor. Walking
/// from the root clones leaking ancestors top-down before any shared child
/// is touched.
///
/// # Errors
/// As [`deep_make_unique`].
pub fn deep_make_unique_scoped(graph: &mut SceneGraph, scope: &Scope) -> Result<(), UniqueError> {
    let mut seeds = Vec::new();
    for element in scope.elements() {
        match element {
            ScopeElement::Instance(instance) => seeds.push(*instance),
            ScopeElement::Definition(definition) => {
                let placements = graph.instances_of(*definition).map_err(UniqueError::stale)?;
                seeds.extend_from_slice(placements);
            }
            ScopeElement::Path(path) => {
                if let Some(root) = path.root() {
                    seeds.push(root);
                }
            }
        }
    }
    run(graph, seeds, scope)
}

/// [`deep_make_unique`] wrapped in its own transaction: commits on success,
/// aborts (restoring the pre-call graph) on any failure.
///
/// # Errors
/// As [`deep_make_unique`], plus [`UniqueError::Transaction`] if the
/// transaction cannot be opened or committed.
pub fn deep_make_unique_in_transaction(
    graph: &mut SceneGraph,
    scope_instances: &[InstanceId],
) -> Result<(), UniqueError> {
    graph.begin_transaction().map_err(UniqueError::Transaction)?;
    match deep_make_unique(graph, scope_instances) {
        Ok(()) => graph.commit_transaction().map_err(UniqueError::Transaction),
        Err(err) => {
            // Abort can only fail if no transaction is open, which begin just
            // ruled out; the walk's own error is the one worth reporting.
            if let Err(abort_err) = graph.abort_transaction() {
                tracing::error!("abort after failed deduplication also failed: {abort_err}");
            }
            tracing::warn!("deep_make_unique aborted: {err}");
            Err(err)
        }
    }
}

fn run(
    graph: &mut SceneGraph,
    seeds: Vec<InstanceId>,
    scope: &Scope,
) -> Result<(), UniqueError> {
    // Original definition -> its clone, local to this call.
    let mut replacements: IndexMap<DefinitionId, DefinitionId> = IndexMap::new();

    // Seeds pop in argument order, children in enumeration order.
    let mut stack: Vec<InstanceId> = seeds;
    stack.reverse();

    while let Some(instance) = stack.pop() {
        let definition = graph.definition_of(instance).map_err(UniqueError::stale)?;

        // N sibling instances sharing a definition end up sharing exactly
        // one clone, never N separate clones. No descent from a memo hit:
        // the clone's subtree was already walked when the clone was made.
        if let Some(&clone) = replacements.get(&definition) {
            graph.rebind_instance(instance, clone).map_err(UniqueError::stale)?;
            tracing::trace!("rebound {instance} to memoized clone {clone}");
            continue;
        }

        let descend_into = if is_unique_to(graph, definition, scope)? {
            // Unique at this level, but deeper nesting levels can still
            // leak; keep walking the original's children.
            definition
        } else {
            let clone = graph
                .clone_definition(instance)
                .map_err(UniqueError::HostCloneFailure)?;
            replacements.insert(definition, clone);
            tracing::debug!("made {definition} unique as {clone} at {instance}");
            clone
        };

        let children = graph.children_of(descend_into).map_err(UniqueError::stale)?;
        for &child in children.iter().rev() {
            stack.push(child);
        }
    }

    if !replacements.is_empty() {
        tracing::debug!("deduplication created {} clone(s)", replacements.len());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sgu_model::{Container, Geometry, Transform};

    #[test]
    fn empty_seed_list_is_invalid_scope() {
        let mut graph = SceneGraph::new();
        let err = deep_make_unique(&mut graph, &[]).unwrap_err();
        assert!(matches!(err, UniqueError::InvalidScope(_)));
    }

    #[test]
    fn clone_outside_transaction_is_host_failure() {
        let mut graph = SceneGraph::new();
        let d = graph.add_definition("d", Geometry::default());
        let a = graph.add_instance(d, Container::Root, Transform::IDENTITY).unwrap();
        graph.add_instance(d, Container::Root, Transform::IDENTITY).unwrap();

        // Shared definition, scope covers only one placement: a clone is
        // needed, and without a transaction the primitive refuses.
        let err = deep_make_unique(&mut graph, &[a]).unwrap_err();
        assert!(matches!(err, UniqueError::HostCloneFailure(_)));
    }

    #[test]
    fn already_unique_definition_is_left_alone() {
        let mut graph = SceneGraph::new();
        let d = graph.add_definition("solo", Geometry::default());
        let i = graph.add_instance(d, Container::Root, Transform::IDENTITY).unwrap();

        deep_make_unique_in_transaction(&mut graph, &[i]).unwrap();
        assert_eq!(graph.definition_count(), 1);
        assert_eq!(graph.definition_of(i).unwrap(), d);
    }

    #[test]
    fn shared_definition_cloned_once_for_scope() {
        let mut graph = SceneGraph::new();
        let d = graph.add_definition("vase", Geometry::default());
        let inside = graph.add_instance(d, Container::Root, Transform::IDENTITY).unwrap();
        let outside = graph.add_instance(d, Container::Root, Transform::IDENTITY).unwrap();

        deep_make_unique_in_transaction(&mut graph, &[inside]).unwrap();

        // Non-leak: the out-of-scope instance still uses the original.
        assert_ne!(graph.definition_of(inside).unwrap(), d);
        assert_eq!(graph.definition_of(outside).unwrap(), d);
        assert_eq!(graph.definition_count(), 2);
    }

    #[test]
    fn memoization_keeps_scope_instances_shared() {
        let mut graph = SceneGraph::new();
        let d = graph.add_definition("chair", Geometry::default());
        let a = graph.add_instance(d, Container::Root, Transform::IDENTITY).unwrap();
        let b = graph.add_instance(d, Container::Root, Transform::IDENTITY).unwrap();
        let outside = graph.add_instance(d, Container::Root, Transform::IDENTITY).unwrap();

        deep_make_unique_in_transaction(&mut graph, &[a, b]).unwrap();

        let def_a = graph.definition_of(a).unwrap();
        let def_b = graph.definition_of(b).unwrap();
        assert_eq!(def_a, def_b);
        assert_ne!(def_a, d);
        assert_eq!(graph.definition_of(outside).unwrap(), d);
        // Exactly one clone despite two in-scope instances.
        assert_eq!(graph.definition_count(), 2);
    }

    #[test]
    fn idempotent_second_run_makes_no_clones() {
        let mut graph = SceneGraph::new();
        let d = graph.add_definition("lamp", Geometry::default());
        let a = graph.add_instance(d, Container::Root, Transform::IDENTITY).unwrap();
        graph.add_instance(d, Container::Root, Transform::IDENTITY).unwrap();

        deep_make_unique_in_transaction(&mut graph, &[a]).unwrap();
        let count_after_first = graph.definition_count();

        deep_make_unique_in_transaction(&mut graph, &[a]).unwrap();
        assert_eq!(graph.definition_count(), count_after_first);
    }

    #[test]
    fn failure_mid_walk_rolls_back_wholesale() {
        let mut graph = SceneGraph::new();
        let d = graph.add_definition("shared", Geometry::default());
        let a = graph.add_instance(d, Container::Root, Transform::IDENTITY).unwrap();
        graph.add_instance(d, Container::Root, Transform::IDENTITY).unwrap();
        let stale = InstanceId::from_raw(999);

        // The first seed forces a clone, the stale second seed then fails
        // the walk; the wrapper must restore the pre-call graph.
        let err = deep_make_unique_in_transaction(&mut graph, &[a, stale]).unwrap_err();
        assert!(matches!(err, UniqueError::TypeMismatch(_)));
        assert_eq!(graph.definition_count(), 1);
        assert_eq!(graph.definition_of(a).unwrap(), d);
    }

    #[test]
    fn path_seeded_scope_leaves_out_of_scope_occurrences_untouched() {
        use crate::paths::InstancePath;

        let mut graph = SceneGraph::new();
        let outer_def = graph.add_definition("outer", Geometry::default());
        let inner_def = graph.add_definition("inner", Geometry::default());
        let inner = graph
            .add_instance(inner_def, Container::Definition(outer_def), Transform::IDENTITY)
            .unwrap();
        let outer_a = graph.add_instance(outer_def, Container::Root, Transform::IDENTITY).unwrap();
        let outer_b = graph.add_instance(outer_def, Container::Root, Transform::IDENTITY).unwrap();

        // Scope is the single occurrence [outer_a, inner]; the occurrence
        // [outer_b, inner] routed through the shared outer definition is
        // outside it.
        let scope = Scope::new(vec![ScopeElement::Path(InstancePath::new([outer_a, inner]))])
            .unwrap();
        graph.begin_transaction().unwrap();
        deep_make_unique_scoped(&mut graph, &scope).unwrap();
        graph.commit_transaction().unwrap();

        // The shared chain under outer_b is untouched.
        assert_eq!(graph.definition_of(outer_b).unwrap(), outer_def);
        assert_eq!(graph.definition_of(inner).unwrap(), inner_def);
        assert_eq!(graph.children_of(outer_def).unwrap(), &[inner]);

        // The in-scope occurrence got its own top-down chain of clones.
        let outer_clone = graph.definition_of(outer_a).unwrap();
        assert_ne!(outer_clone, outer_def);
        let clone_children = graph.children_of(outer_clone).unwrap().to_vec();
        assert_eq!(clone_children.len(), 1);
        assert_ne!(graph.definition_of(clone_children[0]).unwrap(), inner_def);
    }

    #[test]
    fn definition_seeded_scope_expands_to_placements() {
        let mut graph = SceneGraph::new();
        let shelf = graph.add_definition("shelf", Geometry::default());
        let bx = graph.add_definition("box", Geometry::default());
        graph
            .add_instance(bx, Container::Definition(shelf), Transform::IDENTITY)
            .unwrap();
        let shelf_a = graph.add_instance(shelf, Container::Root, Transform::IDENTITY).unwrap();
        let shelf_b = graph.add_instance(shelf, Container::Root, Transform::IDENTITY).unwrap();
        // The box definition is also placed at root, outside the shelves.
        let loose_box = graph.add_instance(bx, Container::Root, Transform::IDENTITY).unwrap();

        let scope = Scope::new(vec![ScopeElement::Definition(shelf)]).unwrap();
        graph.begin_transaction().unwrap();
        deep_make_unique_scoped(&mut graph, &scope).unwrap();
        graph.commit_transaction().unwrap();

        // Shelf itself: every path to it ends in a shelf instance, so it is
        // unique to its own definition scope. The shared box leaks (the
        // loose placement) and is cloned exactly once for both shelves.
        assert_eq!(graph.definition_of(shelf_a).unwrap(), shelf);
        assert_eq!(graph.definition_of(shelf_b).unwrap(), shelf);
        let shelf_children = graph.children_of(shelf).unwrap().to_vec();
        assert_eq!(shelf_children.len(), 1);
        let boxed = graph.definition_of(shelf_children[0]).unwrap();
        assert_ne!(boxed, bx);
        assert_eq!(graph.definition_of(loose_box).unwrap(), bx);
        assert_eq!(graph.definition_count(), 3);
    }
}
