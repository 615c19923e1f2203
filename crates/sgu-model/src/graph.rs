//! The scene-graph arena
//!
//! Definitions and instances live in two append-only arenas. Structural
//! edits rewrite single edges (one Instance→Definition reference at a time);
//! nothing is ever duplicated wholesale except by [`SceneGraph::clone_definition`],
//! whose whole point is a content-preserving copy.

use crate::error::ModelError;
use crate::geometry::{Geometry, Transform};
use crate::handle::{Container, DefinitionId, InstanceId};

#[derive(Debug, Clone)]
struct DefinitionRecord {
    name: String,
    geometry: Geometry,
    /// Every placement referencing this definition, in creation order.
    instances: Vec<InstanceId>,
    /// Instances nested directly in this definition's content, in creation
    /// order. This order is the child-enumeration contract consumers rely on
    /// for deterministic traversal.
    children: Vec<InstanceId>,
}

#[derive(Debug, Clone)]
struct InstanceRecord {
    definition: DefinitionId,
    container: Container,
    transform: Transform,
}

#[derive(Debug, Clone)]
struct Snapshot {
    definitions: Vec<DefinitionRecord>,
    instances: Vec<InstanceRecord>,
    root_children: Vec<InstanceId>,
}

/// Arena of definitions and instances, threaded explicitly through every
/// consumer; there is no ambient "current model".
///
/// The containment graph is expected to be acyclic: a definition never
/// (transitively) contains an instance of itself. The graph does not detect
/// cycles itself; traversal code defends against corruption with a depth
/// cap.
#[derive(Debug, Clone, Default)]
pub struct SceneGraph {
    definitions: Vec<DefinitionRecord>,
    instances: Vec<InstanceRecord>,
    root_children: Vec<InstanceId>,
    snapshot: Option<Snapshot>,
}

impl SceneGraph {
    /// Empty graph
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of definitions, including unreferenced ones
    #[inline]
    #[must_use]
    pub fn definition_count(&self) -> usize {
        self.definitions.len()
    }

    /// Number of instances
    #[inline]
    #[must_use]
    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    /// Create a definition with no instances and no children
    ///
    /// # Panics
    /// Each arena holds at most `u32::MAX` entries; exceeding that capacity
    /// panics rather than aliasing handles.
    pub fn add_definition(&mut self, name: impl Into<String>, geometry: Geometry) -> DefinitionId {
        let id = DefinitionId(
            u32::try_from(self.definitions.len()).expect("definition arena exceeds u32 handle space"),
        );
        self.definitions.push(DefinitionRecord {
            name: name.into(),
            geometry,
            instances: Vec::new(),
            children: Vec::new(),
        });
        id
    }

    /// Place an instance of `definition` inside `container`
    ///
    /// # Errors
    /// Fails if either handle does not resolve in this graph.
    ///
    /// # Panics
    /// Each arena holds at most `u32::MAX` entries; exceeding that capacity
    /// panics rather than aliasing handles.
    pub fn add_instance(
        &mut self,
        definition: DefinitionId,
        container: Container,
        transform: Transform,
    ) -> Result<InstanceId, ModelError> {
        self.def(definition)?;
        if let Container::Definition(parent) = container {
            self.def(parent)?;
        }

        let id = InstanceId(
            u32::try_from(self.instances.len()).expect("instance arena exceeds u32 handle space"),
        );
        self.instances.push(InstanceRecord {
            definition,
            container,
            transform,
        });
        self.definitions[definition.index()].instances.push(id);
        match container {
            Container::Root => self.root_children.push(id),
            Container::Definition(parent) => {
                self.definitions[parent.index()].children.push(id);
            }
        }
        Ok(id)
    }

    /// The definition an instance is bound to
    ///
    /// # Errors
    /// Fails if the handle does not resolve in this graph.
    pub fn definition_of(&self, instance: InstanceId) -> Result<DefinitionId, ModelError> {
        Ok(self.inst(instance)?.definition)
    }

    /// The container an instance is nested in
    ///
    /// # Errors
    /// Fails if the handle does not resolve in this graph.
    pub fn container_of(&self, instance: InstanceId) -> Result<Container, ModelError> {
        Ok(self.inst(instance)?.container)
    }

    /// An instance's placement transform
    ///
    /// # Errors
    /// Fails if the handle does not resolve in this graph.
    pub fn transform_of(&self, instance: InstanceId) -> Result<Transform, ModelError> {
        Ok(self.inst(instance)?.transform)
    }

    /// A definition's name
    ///
    /// # Errors
    /// Fails if the handle does not resolve in this graph.
    pub fn name_of(&self, definition: DefinitionId) -> Result<&str, ModelError> {
        Ok(self.def(definition)?.name.as_str())
    }

    /// A definition's content payload
    ///
    /// # Errors
    /// Fails if the handle does not resolve in this graph.
    pub fn geometry_of(&self, definition: DefinitionId) -> Result<&Geometry, ModelError> {
        Ok(&self.def(definition)?.geometry)
    }

    /// Every placement of a definition, in creation order
    ///
    /// # Errors
    /// Fails if the handle does not resolve in this graph.
    pub fn instances_of(&self, definition: DefinitionId) -> Result<&[InstanceId], ModelError> {
        Ok(self.def(definition)?.instances.as_slice())
    }

    /// Instances nested directly in a definition's content, in creation order
    ///
    /// # Errors
    /// Fails if the handle does not resolve in this graph.
    pub fn children_of(&self, definition: DefinitionId) -> Result<&[InstanceId], ModelError> {
        Ok(self.def(definition)?.children.as_slice())
    }

    /// Instances nested directly in the model root, in creation order
    #[inline]
    #[must_use]
    pub fn root_instances(&self) -> &[InstanceId] {
        &self.root_children
    }

    /// Look up a definition by name
    #[must_use]
    pub fn find_definition(&self, name: &str) -> Option<DefinitionId> {
        self.definitions
            .iter()
            .position(|d| d.name == name)
            // Positions index an arena that add_definition already bounded
            // to u32 handle space.
            .map(|i| DefinitionId(u32::try_from(i).expect("definition arena exceeds u32 handle space")))
    }

    /// Rewrite one Instance→Definition edge
    ///
    /// Removes the instance from its old definition's placement list and
    /// appends it to the new one. Containment is untouched.
    ///
    /// # Errors
    /// Fails if either handle does not resolve in this graph.
    pub fn rebind_instance(
        &mut self,
        instance: InstanceId,
        new_definition: DefinitionId,
    ) -> Result<(), ModelError> {
        let old_definition = self.inst(instance)?.definition;
        self.def(new_definition)?;
        if old_definition == new_definition {
            return Ok(());
        }

        let old = &mut self.definitions[old_definition.index()].instances;
        if let Some(pos) = old.iter().position(|&i| i == instance) {
            old.remove(pos);
        }
        self.definitions[new_definition.index()].instances.push(instance);
        self.instances[instance.index()].definition = new_definition;
        Ok(())
    }

    /// Content-preserving clone of an instance's definition, rebinding that
    /// instance to the clone.
    ///
    /// The clone gets a fresh `name#N` uniquing suffix, a copy of the
    /// geometry, and a fresh child instance for each child of the original,
    /// each referencing the *same* sub-definition as before. All other
    /// structure stays shared.
    ///
    /// # Errors
    /// Fails with [`ModelError::TransactionRequired`] outside an open
    /// transaction, or if the instance handle does not resolve.
    pub fn clone_definition(&mut self, instance: InstanceId) -> Result<DefinitionId, ModelError> {
        if self.snapshot.is_none() {
            return Err(ModelError::TransactionRequired);
        }

        let original = self.inst(instance)?.definition;
        let record = &self.definitions[original.index()];
        let name = self.uniquing_name(&record.name);
        let geometry = record.geometry.clone();
        let children = record.children.clone();

        let clone = self.add_definition(name, geometry);
        for child in children {
            let child_record = &self.instances[child.index()];
            let (definition, transform) = (child_record.definition, child_record.transform);
            self.add_instance(definition, Container::Definition(clone), transform)?;
        }
        self.rebind_instance(instance, clone)?;

        tracing::debug!(
            "cloned {original} ({}) as {clone}",
            self.definitions[original.index()].name
        );
        Ok(clone)
    }

    /// Open a transaction by snapshotting the arena
    ///
    /// # Errors
    /// Fails if a transaction is already open.
    pub fn begin_transaction(&mut self) -> Result<(), ModelError> {
        if self.snapshot.is_some() {
            return Err(ModelError::NestedTransaction);
        }
        self.snapshot = Some(Snapshot {
            definitions: self.definitions.clone(),
            instances: self.instances.clone(),
            root_children: self.root_children.clone(),
        });
        Ok(())
    }

    /// Commit the open transaction, discarding the snapshot
    ///
    /// # Errors
    /// Fails if no transaction is open.
    pub fn commit_transaction(&mut self) -> Result<(), ModelError> {
        if self.snapshot.take().is_none() {
            return Err(ModelError::NoOpenTransaction);
        }
        Ok(())
    }

    /// Abort the open transaction, restoring the pre-transaction arena
    ///
    /// # Errors
    /// Fails if no transaction is open.
    pub fn abort_transaction(&mut self) -> Result<(), ModelError> {
        let Some(snapshot) = self.snapshot.take() else {
            return Err(ModelError::NoOpenTransaction);
        };
        self.definitions = snapshot.definitions;
        self.instances = snapshot.instances;
        self.root_children = snapshot.root_children;
        tracing::debug!("transaction aborted, arena restored");
        Ok(())
    }

    /// Run `f` inside a transaction: commit on `Ok`, restore on `Err`
    ///
    /// # Errors
    /// Returns `f`'s error after restoring the arena, or a converted
    /// [`ModelError`] if the transaction itself cannot be opened.
    pub fn transact<T, E>(&mut self, f: impl FnOnce(&mut Self) -> Result<T, E>) -> Result<T, E>
    where
        E: From<ModelError>,
    {
        self.begin_transaction()?;
        match f(self) {
            Ok(value) => {
                self.commit_transaction()?;
                Ok(value)
            }
            Err(err) => {
                self.abort_transaction()?;
                Err(err)
            }
        }
    }

    /// Smallest unused `base#N` name, N >= 1
    fn uniquing_name(&self, base: &str) -> String {
        let base = base.split('#').next().unwrap_or(base);
        let mut n = 1;
        loop {
            let candidate = format!("{base}#{n}");
            if !self.definitions.iter().any(|d| d.name == candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    fn def(&self, id: DefinitionId) -> Result<&DefinitionRecord, ModelError> {
        self.definitions
            .get(id.index())
            .ok_or(ModelError::UnknownDefinition(id))
    }

    fn inst(&self, id: InstanceId) -> Result<&InstanceRecord, ModelError> {
        self.instances
            .get(id.index())
            .ok_or(ModelError::UnknownInstance(id))
    }
}
