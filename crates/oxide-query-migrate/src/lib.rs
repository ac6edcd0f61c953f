//! Logged, idempotent schema migrations.
//!
//! A [`SchemaDefinition`](definition::SchemaDefinition) lists actions such as
//! `create table` or hand-written SQL. Applying it sends every action through
//! an [`ActionPipeline`](pipeline::ActionPipeline) of interceptors:
//!
//! - **Action log table** - creates `SCHEMA_ACTION_LOG` on first use
//! - **Filter** - drops actions the log already records
//! - **Log generation** - follows each logged action with its log entry
//! - **SQL generation** - renders actions and log entries for the dialect
//! - **Execution** - runs the statements, or only logs them in a dry run
//!
//! Replaying a definition that was applied before runs nothing.
//!
//! # Example
//!
//! ```rust,ignore
//! use oxide_query_migrate::prelude::*;
//!
//! let definition = SchemaDefinition::builder("inventory", "dba")
//!     .create_table_for::<Widget>("widget-table")
//!     .run_sql("seed", "insert into WIDGET (WIDGET_ID, NAME) values (?, ?)", args)
//!     .build()?;
//!
//! let context = PipelineContext::new(database, Arc::new(SqliteExecutor::new(pool)))
//!     .with_executed_by("ci");
//! let report = SchemaGenerator::new(context).generate(&[definition]).await?;
//! ```
//!
//! # CLI Usage
//!
//! ```bash
//! # Apply definitions
//! oxide-query-migrate migrate schema/inventory.json
//!
//! # Print the SQL a run would execute
//! oxide-query-migrate show-sql schema/inventory.json
//!
//! # List executed actions
//! oxide-query-migrate log --definition inventory
//! ```

pub mod action;
pub mod definition;
pub mod error;
pub mod generator;
pub mod interceptor;
pub mod log;
pub mod pipeline;
pub mod sqlite;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::action::{Action, ActionKind, ActionMeta, SqlAction};
    pub use crate::definition::{SchemaDefinition, SchemaDefinitionBuilder};
    pub use crate::error::{MigrateError, Result};
    pub use crate::generator::{GenerationReport, SchemaGenerator};
    pub use crate::interceptor::{
        ActionFilter, ActionInterceptor, ActionLogGenerator, ActionLogTableCreator,
        PipelineContext, SqlActionExecutor, SqlGenerator,
    };
    pub use crate::log::ActionLogEntry;
    pub use crate::pipeline::ActionPipeline;
    pub use crate::sqlite::SqliteExecutor;
}
