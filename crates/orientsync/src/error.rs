//! Error types for schema reconciliation and plan execution.

/// Errors that can occur while diffing schemas or executing a plan.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// The target schema declares the same class, property, or index key twice.
    #[error("duplicate {kind} '{key}' in target schema")]
    DuplicateSchemaEntry {
        /// Entity kind: `class`, `property`, or `index`.
        kind: &'static str,
        /// The duplicated reconciliation key.
        key: String,
    },

    /// A store read or mutation failed.
    #[error("store error: {0}")]
    Store(String),

    /// IO error while reading a target schema document.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse a target schema document.
    #[error("failed to parse schema document: {0}")]
    Parse(#[from] serde_json::Error),
}

impl SyncError {
    /// Creates a store-side failure from any displayable message.
    #[must_use]
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store(message.into())
    }
}

/// Result type for reconciliation operations.
pub type Result<T> = std::result::Result<T, SyncError>;
