//! Migration actions.
//!
//! A schema definition is a list of [`Action`]s. Interceptors in the pipeline
//! expand them: a definition action turns into a log entry plus a rendered
//! [`SqlAction`], and only `Sql` actions ever reach the database.

use std::fmt;

use oxide_query_core::schema::{ForeignKeyDefinition, IndexDefinition, TableDefinition, TableName};
use oxide_query_core::{Rendered, SqlValue};
use serde::{Deserialize, Serialize};

use crate::log::ActionLogEntry;

/// Identity of an action inside its schema definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionMeta {
    /// Owning definition.
    pub definition_id: String,
    /// Stable id, unique within the definition.
    pub action_id: String,
    /// Who wrote the action.
    pub author: String,
    /// Whether execution is recorded in the action log. Unlogged actions run
    /// on every pass.
    pub logged: bool,
}

impl ActionMeta {
    /// Creates a logged action identity.
    pub fn new(
        definition_id: impl Into<String>,
        action_id: impl Into<String>,
        author: impl Into<String>,
    ) -> Self {
        Self {
            definition_id: definition_id.into(),
            action_id: action_id.into(),
            author: author.into(),
            logged: true,
        }
    }

    /// Marks the action as not recorded in the log.
    #[must_use]
    pub const fn unlogged(mut self) -> Self {
        self.logged = false;
        self
    }
}

impl fmt::Display for ActionMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.definition_id, self.action_id)
    }
}

/// A rendered statement ready for the executor.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlAction {
    /// SQL text, possibly blank.
    pub sql: String,
    /// Bind arguments.
    pub args: Vec<SqlValue>,
    /// The definition action it was rendered from, if any.
    pub origin: Option<ActionMeta>,
}

impl SqlAction {
    /// Wraps a rendered statement.
    #[must_use]
    pub fn new(rendered: Rendered, origin: Option<ActionMeta>) -> Self {
        Self {
            sql: rendered.sql,
            args: rendered.args,
            origin,
        }
    }

    /// Whether there is nothing to run.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.sql.trim().is_empty()
    }
}

/// One step of a migration.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Makes sure the action log table exists.
    CreateActionLogTable,
    /// `create table`.
    CreateTable {
        /// Identity.
        meta: ActionMeta,
        /// The table.
        table: TableDefinition,
    },
    /// `create index`.
    CreateIndex {
        /// Identity.
        meta: ActionMeta,
        /// The index.
        index: IndexDefinition,
    },
    /// Adds a foreign key to an existing table.
    AddForeignKey {
        /// Identity.
        meta: ActionMeta,
        /// Table receiving the constraint.
        table: TableName,
        /// The constraint.
        foreign_key: ForeignKeyDefinition,
    },
    /// `drop table`.
    DropTable {
        /// Identity.
        meta: ActionMeta,
        /// The table.
        table: TableName,
    },
    /// Hand-written SQL.
    RunSql {
        /// Identity.
        meta: ActionMeta,
        /// SQL text.
        sql: String,
        /// Bind arguments.
        args: Vec<SqlValue>,
    },
    /// A rendered statement.
    Sql(SqlAction),
    /// A row to insert into the action log.
    LogEntry(ActionLogEntry),
}

impl Action {
    /// Identity of a definition action; `None` for pipeline-internal ones.
    #[must_use]
    pub const fn meta(&self) -> Option<&ActionMeta> {
        match self {
            Self::CreateTable { meta, .. }
            | Self::CreateIndex { meta, .. }
            | Self::AddForeignKey { meta, .. }
            | Self::DropTable { meta, .. }
            | Self::RunSql { meta, .. } => Some(meta),
            Self::CreateActionLogTable | Self::Sql(_) | Self::LogEntry(_) => None,
        }
    }

    /// The concrete kind.
    #[must_use]
    pub const fn kind(&self) -> ActionKind {
        match self {
            Self::CreateActionLogTable => ActionKind::CreateActionLogTable,
            Self::CreateTable { .. } => ActionKind::CreateTable,
            Self::CreateIndex { .. } => ActionKind::CreateIndex,
            Self::AddForeignKey { .. } => ActionKind::AddForeignKey,
            Self::DropTable { .. } => ActionKind::DropTable,
            Self::RunSql { .. } => ActionKind::RunSql,
            Self::Sql(_) => ActionKind::Sql,
            Self::LogEntry(_) => ActionKind::LogEntry,
        }
    }

    /// Whether execution is recorded in the action log.
    #[must_use]
    pub fn is_logged(&self) -> bool {
        self.meta().is_some_and(|meta| meta.logged)
    }
}

fn display_table(table: &TableName) -> String {
    match &table.schema {
        Some(schema) => format!("{schema}.{}", table.name),
        None => table.name.clone(),
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreateActionLogTable => write!(f, "create action log table"),
            Self::CreateTable { table, .. } => write!(f, "create table {}", display_table(&table.name)),
            Self::CreateIndex { index, .. } => write!(f, "create index {}", index.name),
            Self::AddForeignKey {
                table, foreign_key, ..
            } => write!(
                f,
                "add foreign key {} to {}",
                foreign_key.name,
                display_table(table)
            ),
            Self::DropTable { table, .. } => write!(f, "drop table {}", display_table(table)),
            Self::RunSql { sql, .. } => write!(f, "run sql `{sql}`"),
            Self::Sql(action) => write!(f, "sql `{}`", action.sql),
            Self::LogEntry(entry) => write!(f, "log {}/{}", entry.definition_id, entry.action_id),
        }
    }
}

/// Tag an interceptor selects actions by.
///
/// `Any`, `Definition` and `Renderable` each stand for a group of concrete
/// kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    /// Every action.
    Any,
    /// Actions written in a schema definition (those carrying [`ActionMeta`]).
    Definition,
    /// Definition actions and log entries; everything that renders to SQL.
    Renderable,
    /// [`Action::CreateActionLogTable`]
    CreateActionLogTable,
    /// [`Action::CreateTable`]
    CreateTable,
    /// [`Action::CreateIndex`]
    CreateIndex,
    /// [`Action::AddForeignKey`]
    AddForeignKey,
    /// [`Action::DropTable`]
    DropTable,
    /// [`Action::RunSql`]
    RunSql,
    /// [`Action::Sql`]
    Sql,
    /// [`Action::LogEntry`]
    LogEntry,
}

impl ActionKind {
    /// Whether `action` is of this kind.
    #[must_use]
    pub fn matches(self, action: &Action) -> bool {
        match self {
            Self::Any => true,
            Self::Definition => action.meta().is_some(),
            Self::Renderable => action.meta().is_some() || matches!(action, Action::LogEntry(_)),
            kind => kind == action.kind(),
        }
    }
}
