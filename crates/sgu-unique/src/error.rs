//! Error types for the uniqueness core
//!
//! Validation failures are fail-fast at the call boundary; mid-traversal
//! failures abort the remainder of the walk and propagate so the caller can
//! roll back the enclosing transaction. Nothing is retried.

use sgu_model::ModelError;

/// Errors raised by path enumeration, scope tests and deduplication
#[derive(Debug, thiserror::Error)]
pub enum UniqueError {
    /// Scope argument is empty or malformed
    #[error("invalid scope: {0}")]
    InvalidScope(String),

    /// An entity argument does not resolve to a container-capable entity in
    /// the given graph
    #[error("type mismatch: {0}")]
    TypeMismatch(String),

    /// Upward walk exceeded [`crate::MAX_NESTING_DEPTH`]; the host model is
    /// almost certainly corrupt (a containment cycle)
    #[error("nesting depth limit exceeded at depth {depth}; scene graph is likely corrupt")]
    DepthLimitExceeded {
        /// Depth reached when the walk gave up
        depth: usize,
    },

    /// The host clone primitive failed; propagated unmodified, never retried
    #[error("host clone failed: {0}")]
    HostCloneFailure(#[source] ModelError),

    /// Opening, committing or aborting the surrounding transaction failed
    #[error("transaction failure: {0}")]
    Transaction(#[source] ModelError),
}

impl UniqueError {
    /// A stale or foreign handle surfaced by the model
    pub(crate) fn stale(err: ModelError) -> Self {
        Self::TypeMismatch(err.to_string())
    }
}
