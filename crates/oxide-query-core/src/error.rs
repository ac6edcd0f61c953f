//! Error types for statement construction, rendering and execution.

use std::error::Error as StdError;

use thiserror::Error;

use crate::concurrent::AggregateError;

/// Errors raised while rendering or executing statements.
#[derive(Debug, Error)]
pub enum QueryError {
    /// A column or alias reference could not be resolved against the scope.
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    /// The active dialect has no renderer for a function.
    #[error("unsupported function `{function}` for dialect {dialect}")]
    UnsupportedFunction {
        /// Function name.
        function: String,
        /// Dialect name.
        dialect: &'static str,
    },

    /// A function renderer was handed arguments it cannot render.
    #[error("invalid arguments for function `{function}`: {message}")]
    InvalidArguments {
        /// Function name.
        function: String,
        /// What was wrong.
        message: String,
    },

    /// A foreign key between two aliases could not be resolved.
    #[error(transparent)]
    ForeignKey(#[from] ForeignKeyError),

    /// The underlying executor failed.
    #[error(transparent)]
    Execution(#[from] ExecutionError),

    /// The JSON provider failed.
    #[error(transparent)]
    Json(#[from] JsonError),

    /// A result column could not be read as the requested type.
    #[error("cannot read column `{label}`: {reason}")]
    Conversion {
        /// Column label.
        label: String,
        /// Why the conversion failed.
        reason: String,
    },

    /// Several independent operations failed.
    #[error(transparent)]
    Aggregate(Box<AggregateError<QueryError>>),
}

impl From<AggregateError<Self>> for QueryError {
    fn from(error: AggregateError<Self>) -> Self {
        Self::Aggregate(Box::new(error))
    }
}

/// Alias and column resolution failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    /// No alias with the requested name exists for the row type.
    #[error("unknown alias `{alias}` for {row}")]
    UnknownAlias {
        /// Table of the requested row type.
        row: &'static str,
        /// Alias name that was asked for.
        alias: String,
    },

    /// An unqualified reference found no alias of its row type.
    #[error("ambiguous column reference: no alias of {row} is in scope")]
    NoAlias {
        /// Table of the requested row type.
        row: &'static str,
    },

    /// More than one alias matched.
    #[error("ambiguous alias for {row}: candidates are {}", .candidates.join(", "))]
    AmbiguousAlias {
        /// Table of the requested row type.
        row: &'static str,
        /// Names of every matching alias.
        candidates: Vec<String>,
    },
}

/// Foreign-key lookup failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ForeignKeyError {
    /// The child table declares no foreign key to the parent table.
    #[error("no foreign key from {child} to {parent}")]
    Missing {
        /// Child table.
        child: &'static str,
        /// Parent table.
        parent: &'static str,
    },

    /// The child table declares no foreign key with that name to the parent.
    #[error("no foreign key named `{name}` from {child} to {parent}")]
    MissingNamed {
        /// Child table.
        child: &'static str,
        /// Parent table.
        parent: &'static str,
        /// Requested constraint name.
        name: String,
    },

    /// Several foreign keys link the tables and none was named.
    #[error("ambiguous foreign key from {child} to {parent}: {}", .candidates.join(", "))]
    Ambiguous {
        /// Child table.
        child: &'static str,
        /// Parent table.
        parent: &'static str,
        /// Constraint names.
        candidates: Vec<&'static str>,
    },
}

/// An executor failure, keeping the statement and the original cause.
#[derive(Debug, Error)]
#[error("failed to execute `{sql}`: {source}")]
pub struct ExecutionError {
    sql: String,
    #[source]
    source: Box<dyn StdError + Send + Sync>,
}

impl ExecutionError {
    /// Wraps a driver error raised while running `sql`.
    pub fn new(sql: impl Into<String>, source: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        Self {
            sql: sql.into(),
            source: source.into(),
        }
    }

    /// The statement that failed.
    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// The driver error.
    #[must_use]
    pub fn driver_error(&self) -> &(dyn StdError + Send + Sync + 'static) {
        self.source.as_ref()
    }
}

/// Failures of a [`JsonProvider`](crate::json::JsonProvider).
#[derive(Debug, Error)]
pub enum JsonError {
    /// Serialisation or parsing failed.
    #[error("json provider failed: {0}")]
    Serde(#[from] serde_json::Error),

    /// The path expression is malformed.
    #[error("invalid json path `{path}`: {message}")]
    InvalidPath {
        /// The offending path.
        path: String,
        /// What was wrong.
        message: String,
    },
}

/// Result type for query operations.
pub type Result<T> = std::result::Result<T, QueryError>;
