//! Schema definitions.
//!
//! A [`SchemaDefinition`] is an id plus an ordered list of actions. Action ids
//! are unique within a definition; together with the definition id they key
//! the action log.
//!
//! Definitions are built in code or loaded from JSON:
//!
//! ```json
//! {
//!   "id": "inventory",
//!   "author": "dba",
//!   "actions": [
//!     {
//!       "id": "widget-table",
//!       "type": "create_table",
//!       "table": {
//!         "name": "WIDGET",
//!         "columns": [{"name": "WIDGET_ID", "data_type": "big_int"}],
//!         "primary_key": ["WIDGET_ID"]
//!       }
//!     },
//!     {"id": "seed", "type": "sql", "sql": "insert into WIDGET values (?)", "args": [1]},
//!     {"id": "refresh", "type": "sql", "sql": "delete from CACHE", "logged": false}
//!   ]
//! }
//! ```

use std::collections::HashSet;
use std::path::Path;

use oxide_query_core::schema::{ForeignKeyDefinition, IndexDefinition, TableDefinition, TableName};
use oxide_query_core::{RowType, SqlValue};
use serde::Deserialize;
use tracing::warn;

use crate::action::{Action, ActionMeta};
use crate::error::{MigrateError, Result};

const UNKNOWN_AUTHOR: &str = "unknown";

/// An ordered, identified list of migration actions.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaDefinition {
    id: String,
    actions: Vec<Action>,
}

impl SchemaDefinition {
    /// Starts a definition whose actions default to `author`.
    pub fn builder(id: impl Into<String>, author: impl Into<String>) -> SchemaDefinitionBuilder {
        SchemaDefinitionBuilder {
            id: id.into(),
            author: author.into(),
            actions: Vec::new(),
        }
    }

    /// The definition id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The actions in order.
    #[must_use]
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// Consumes the definition, returning its actions.
    #[must_use]
    pub fn into_actions(self) -> Vec<Action> {
        self.actions
    }

    /// Parses a definition from JSON text.
    ///
    /// # Errors
    ///
    /// Fails on malformed JSON and on duplicate action ids.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let file: DefinitionFile = serde_json::from_str(json)?;
        file.into_definition()
    }

    /// Reads a definition file.
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be read or does not parse.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Reads several definition files, in order.
    ///
    /// Every file is attempted; all failures are reported together.
    ///
    /// # Errors
    ///
    /// Returns [`MigrateError::Multiple`] when any file fails.
    pub fn load_all<I, P>(paths: I) -> Result<Vec<Self>>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut definitions = Vec::new();
        let mut errors = Vec::new();
        for path in paths {
            match Self::from_json_file(&path) {
                Ok(definition) => definitions.push(definition),
                Err(e) => {
                    warn!(path = %path.as_ref().display(), error = %e, "Cannot load definition");
                    errors.push(e);
                }
            }
        }
        if errors.is_empty() {
            Ok(definitions)
        } else {
            Err(MigrateError::Multiple(errors))
        }
    }
}

/// Builder for [`SchemaDefinition`].
#[derive(Debug, Clone)]
pub struct SchemaDefinitionBuilder {
    id: String,
    author: String,
    actions: Vec<Action>,
}

impl SchemaDefinitionBuilder {
    fn meta(&self, action_id: impl Into<String>) -> ActionMeta {
        ActionMeta::new(self.id.clone(), action_id, self.author.clone())
    }

    /// Creates a table.
    #[must_use]
    pub fn create_table(mut self, action_id: impl Into<String>, table: TableDefinition) -> Self {
        let meta = self.meta(action_id);
        self.actions.push(Action::CreateTable { meta, table });
        self
    }

    /// Creates the table of a row type.
    #[must_use]
    pub fn create_table_for<R: RowType>(self, action_id: impl Into<String>) -> Self {
        self.create_table(action_id, TableDefinition::from(R::table()))
    }

    /// Creates an index.
    #[must_use]
    pub fn create_index(mut self, action_id: impl Into<String>, index: IndexDefinition) -> Self {
        let meta = self.meta(action_id);
        self.actions.push(Action::CreateIndex { meta, index });
        self
    }

    /// Adds a foreign key to an existing table.
    #[must_use]
    pub fn add_foreign_key(
        mut self,
        action_id: impl Into<String>,
        table: TableName,
        foreign_key: ForeignKeyDefinition,
    ) -> Self {
        let meta = self.meta(action_id);
        self.actions.push(Action::AddForeignKey {
            meta,
            table,
            foreign_key,
        });
        self
    }

    /// Drops a table.
    #[must_use]
    pub fn drop_table(mut self, action_id: impl Into<String>, table: TableName) -> Self {
        let meta = self.meta(action_id);
        self.actions.push(Action::DropTable { meta, table });
        self
    }

    /// Runs hand-written SQL once.
    #[must_use]
    pub fn run_sql(mut self, action_id: impl Into<String>, sql: impl Into<String>, args: Vec<SqlValue>) -> Self {
        let meta = self.meta(action_id);
        self.actions.push(Action::RunSql {
            meta,
            sql: sql.into(),
            args,
        });
        self
    }

    /// Runs hand-written SQL on every pass; it is never logged.
    #[must_use]
    pub fn run_sql_always(
        mut self,
        action_id: impl Into<String>,
        sql: impl Into<String>,
        args: Vec<SqlValue>,
    ) -> Self {
        let meta = self.meta(action_id).unlogged();
        self.actions.push(Action::RunSql {
            meta,
            sql: sql.into(),
            args,
        });
        self
    }

    /// Appends a prepared action.
    #[must_use]
    pub fn action(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }

    /// Finishes the definition.
    ///
    /// # Errors
    ///
    /// Fails with [`MigrateError::DuplicateAction`] when two actions share an
    /// id.
    pub fn build(self) -> Result<SchemaDefinition> {
        let mut seen = HashSet::new();
        for meta in self.actions.iter().filter_map(Action::meta) {
            if !seen.insert(meta.action_id.as_str()) {
                return Err(MigrateError::DuplicateAction {
                    definition: self.id.clone(),
                    action: meta.action_id.clone(),
                });
            }
        }
        Ok(SchemaDefinition {
            id: self.id,
            actions: self.actions,
        })
    }
}

// On-disk format.

#[derive(Debug, Deserialize)]
struct DefinitionFile {
    id: String,
    #[serde(default)]
    author: Option<String>,
    actions: Vec<ActionEntry>,
}

#[derive(Debug, Deserialize)]
struct ActionEntry {
    id: String,
    #[serde(default)]
    author: Option<String>,
    #[serde(default = "default_logged")]
    logged: bool,
    #[serde(flatten)]
    body: ActionBody,
}

const fn default_logged() -> bool {
    true
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ActionBody {
    CreateTable {
        table: TableDefinition,
    },
    CreateIndex {
        index: IndexDefinition,
    },
    AddForeignKey {
        table: TableName,
        foreign_key: ForeignKeyDefinition,
    },
    DropTable {
        table: TableName,
    },
    Sql {
        sql: String,
        #[serde(default)]
        args: Vec<serde_json::Value>,
    },
}

impl DefinitionFile {
    fn into_definition(self) -> Result<SchemaDefinition> {
        let default_author = self.author.unwrap_or_else(|| UNKNOWN_AUTHOR.to_string());
        let mut builder = SchemaDefinition::builder(self.id, default_author.clone());
        for entry in self.actions {
            let mut meta = ActionMeta::new(
                builder.id.clone(),
                entry.id,
                entry.author.unwrap_or_else(|| default_author.clone()),
            );
            meta.logged = entry.logged;
            builder = builder.action(entry.body.into_action(meta));
        }
        builder.build()
    }
}

impl ActionBody {
    fn into_action(self, meta: ActionMeta) -> Action {
        match self {
            Self::CreateTable { table } => Action::CreateTable { meta, table },
            Self::CreateIndex { index } => Action::CreateIndex { meta, index },
            Self::AddForeignKey { table, foreign_key } => Action::AddForeignKey {
                meta,
                table,
                foreign_key,
            },
            Self::DropTable { table } => Action::DropTable { meta, table },
            Self::Sql { sql, args } => Action::RunSql {
                meta,
                sql,
                args: args.into_iter().map(json_argument).collect(),
            },
        }
    }
}

/// Maps a JSON argument to a bind value. Arrays and objects bind as JSON text.
fn json_argument(value: serde_json::Value) -> SqlValue {
    match value {
        serde_json::Value::Null => SqlValue::Null,
        serde_json::Value::Bool(b) => SqlValue::Bool(b),
        serde_json::Value::Number(n) => n
            .as_i64()
            .map_or_else(|| SqlValue::Float(n.as_f64().unwrap_or(f64::NAN)), SqlValue::Int),
        serde_json::Value::String(s) => SqlValue::Text(s),
        other => SqlValue::Text(other.to_string()),
    }
}
