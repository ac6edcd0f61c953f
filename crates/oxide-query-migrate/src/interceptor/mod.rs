//! Action interceptors.
//!
//! Each interceptor handles one kind of action and turns it into zero or more
//! actions for the stages after it. The pipeline orders interceptors by
//! [`ActionInterceptor::priority`], lowest first.

mod executor;
mod filter;
mod log_generator;
mod log_table;
mod sql_generator;

use std::fmt;
use std::sync::Arc;

use futures::future::BoxFuture;
use oxide_query_core::{Database, SqlExecutor};

use crate::action::{Action, ActionKind};
use crate::error::Result;

pub use executor::SqlActionExecutor;
pub use filter::ActionFilter;
pub use log_generator::ActionLogGenerator;
pub use log_table::ActionLogTableCreator;
pub use sql_generator::SqlGenerator;

/// Priority of the interceptor creating the action log table.
pub const INITIALISATION: i32 = 0;
/// Priority of the interceptor dropping already logged actions.
pub const FILTER: i32 = 100;
/// Priority of the interceptor adding log entries.
pub const LOG_GENERATION: i32 = 200;
/// Priority of the interceptor rendering actions to SQL.
pub const SQL_GENERATION: i32 = 300;
/// Priority of SQL execution, always the last stage.
pub const EXECUTION: i32 = 1000;

/// One stage of the action pipeline.
pub trait ActionInterceptor: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    /// Position in the pipeline; lower runs first.
    fn priority(&self) -> i32;

    /// The kind of action handled.
    fn supported(&self) -> ActionKind;

    /// Whether this interceptor handles `action`.
    fn supports(&self, action: &Action) -> bool {
        self.supported().matches(action)
    }

    /// Expands one action into the actions handed to the next stages.
    fn intercept<'a>(
        &'a self,
        context: &'a PipelineContext,
        action: Action,
    ) -> BoxFuture<'a, Result<Vec<Action>>>;
}

/// What every interceptor sees while a pipeline runs.
#[derive(Clone)]
pub struct PipelineContext {
    database: Database,
    executor: Arc<dyn SqlExecutor>,
    executed_by: String,
    dry_run: bool,
}

impl PipelineContext {
    /// Creates a context that executes statements.
    pub fn new(database: Database, executor: Arc<dyn SqlExecutor>) -> Self {
        Self {
            database,
            executor,
            executed_by: String::from("unknown"),
            dry_run: false,
        }
    }

    /// Sets the name recorded as `EXECUTED_BY`.
    #[must_use]
    pub fn with_executed_by(mut self, executed_by: impl Into<String>) -> Self {
        self.executed_by = executed_by.into();
        self
    }

    /// Enables dry run: statements are logged instead of executed.
    #[must_use]
    pub const fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// The target database.
    #[must_use]
    pub const fn database(&self) -> &Database {
        &self.database
    }

    /// The executor.
    #[must_use]
    pub fn executor(&self) -> &dyn SqlExecutor {
        self.executor.as_ref()
    }

    /// Who runs the migration.
    #[must_use]
    pub fn executed_by(&self) -> &str {
        &self.executed_by
    }

    /// Whether this is a dry run.
    #[must_use]
    pub const fn is_dry_run(&self) -> bool {
        self.dry_run
    }
}

impl fmt::Debug for PipelineContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineContext")
            .field("database", &self.database)
            .field("executed_by", &self.executed_by)
            .field("dry_run", &self.dry_run)
            .finish_non_exhaustive()
    }
}

/// The interceptors every migration runs through, in priority order.
#[must_use]
pub fn default_interceptors() -> Vec<Arc<dyn ActionInterceptor>> {
    vec![
        Arc::new(ActionLogTableCreator),
        Arc::new(ActionFilter),
        Arc::new(ActionLogGenerator),
        Arc::new(SqlGenerator),
        Arc::new(SqlActionExecutor),
    ]
}
