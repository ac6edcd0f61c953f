//! Error types for the migration system.

use oxide_query_core::QueryError;

/// Errors that can occur while loading or applying schema definitions.
#[derive(Debug, thiserror::Error)]
pub enum MigrateError {
    /// Rendering or running a statement failed outside of any action.
    #[error(transparent)]
    Query(#[from] QueryError),

    /// Database error while connecting or talking to the driver directly.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A definition file is not valid JSON or does not match the format.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A definition file could not be read.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Two actions of one definition share an id.
    #[error("duplicate action `{action}` in definition `{definition}`")]
    DuplicateAction {
        /// Definition id.
        definition: String,
        /// The repeated action id.
        action: String,
    },

    /// An action failed to execute.
    #[error("action `{definition}/{action}` failed: {source}")]
    ActionFailed {
        /// Definition id.
        definition: String,
        /// Action id.
        action: String,
        /// The underlying failure.
        #[source]
        source: QueryError,
    },

    /// Multiple errors occurred.
    #[error("multiple errors occurred:\n{}", .0.iter().map(|e| format!("  - {e}")).collect::<Vec<_>>().join("\n"))]
    Multiple(Vec<MigrateError>),
}

/// Result type for migration operations.
pub type Result<T> = std::result::Result<T, MigrateError>;
