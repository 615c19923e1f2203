//! SGU Scene-Graph Model
//!
//! Arena-backed scene graph of reusable [`Definition`]s and their placed
//! [`Instance`]s, addressed by stable copyable handles.
//!
//! # Core Concepts
//!
//! - [`SceneGraph`]: the explicit graph context, no ambient "current model"
//! - [`DefinitionId`] / [`InstanceId`]: stable arena handles
//! - [`Container`]: where an instance lives (the model root or a definition)
//! - [`SceneGraph::clone_definition`]: content-preserving clone that rebinds
//!   one instance, the primitive the deduplication engine is built on
//! - Transactions: [`SceneGraph::begin_transaction`] /
//!   [`SceneGraph::commit_transaction`] / [`SceneGraph::abort_transaction`]
//!   make a whole edit all-or-nothing
//!
//! # Example
//!
//! ```rust,ignore
//! use sgu_model::{Container, Geometry, SceneGraph, Transform};
//!
//! let mut graph = SceneGraph::new();
//! let leg = graph.add_definition("leg", Geometry::labeled("leg mesh"));
//! let table = graph.add_definition("table", Geometry::labeled("table top"));
//! let placed = graph.add_instance(leg, Container::Definition(table), Transform::IDENTITY)?;
//! assert_eq!(graph.definition_of(placed)?, leg);
//! ```

#![warn(unreachable_pub)]

// Core modules
mod error;
mod geometry;
mod graph;
mod handle;

// Re-exports
pub use error::ModelError;
pub use geometry::{Geometry, Transform};
pub use graph::SceneGraph;
pub use handle::{Container, DefinitionId, InstanceId};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
