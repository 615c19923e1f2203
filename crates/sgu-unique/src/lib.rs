//! SGU Uniqueness Core
//!
//! Decides when shared scene-graph definitions must be split so an edit to
//! one occurrence does not leak into others, and performs the split.
//!
//! # Core Concepts
//!
//! - [`enumerate_paths`]: every root-to-entity route through a web of shared
//!   definitions
//! - [`Scope`] / [`ScopeElement`]: the caller-supplied boundary uniqueness is
//!   measured against
//! - [`is_unique_to`]: is a definition's entire usage contained in a scope?
//! - [`deep_make_unique`]: clone leaking definitions on demand, memoized so
//!   instances that shared a definition keep sharing its clone
//!
//! # Example
//!
//! ```rust,ignore
//! use sgu_unique::{deep_make_unique, is_unique_to, Scope};
//!
//! graph.begin_transaction()?;
//! deep_make_unique(&mut graph, &[table_instance])?;
//! graph.commit_transaction()?;
//!
//! let scope = Scope::of_instances(&[table_instance])?;
//! assert!(is_unique_to(&graph, leg_definition, &scope)?);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

// Core modules
mod engine;
mod error;
mod paths;
mod scope;

// Re-exports
pub use engine::{deep_make_unique, deep_make_unique_in_transaction, deep_make_unique_scoped};
pub use error::UniqueError;
pub use paths::{enumerate_paths, Entity, InstancePath, MAX_NESTING_DEPTH};
pub use scope::{is_unique_to, Scope, ScopeElement};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
