//! Error types for the scene-graph model

use crate::handle::{DefinitionId, InstanceId};

/// Errors raised by [`crate::SceneGraph`] operations
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// Handle does not resolve to a definition in this graph
    #[error("unknown definition: {0}")]
    UnknownDefinition(DefinitionId),

    /// Handle does not resolve to an instance in this graph
    #[error("unknown instance: {0}")]
    UnknownInstance(InstanceId),

    /// A structural edit was attempted outside an open transaction
    #[error("operation requires an open transaction")]
    TransactionRequired,

    /// Commit or abort was called with no transaction open
    #[error("no transaction is open")]
    NoOpenTransaction,

    /// A second transaction was opened before the first finished
    #[error("a transaction is already open")]
    NestedTransaction,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ModelError::UnknownDefinition(DefinitionId(4));
        assert!(err.to_string().contains("def#4"));

        let err = ModelError::TransactionRequired;
        assert!(err.to_string().contains("transaction"));
    }
}
