//! The action log.
//!
//! Every logged action that ran successfully leaves one row in
//! `SCHEMA_ACTION_LOG`, keyed by definition and action id. The filter
//! interceptor consults it so replays skip what already ran.

use chrono::{DateTime, Utc};
use oxide_query_core::builder::OrderDirection;
use oxide_query_core::function::aggregate::count;
use oxide_query_core::schema::TableName;
use oxide_query_core::{column, Alias, BooleanExpression, Database, RowType, Select, SqlExecutor};
use oxide_query_derive::Row;

use crate::action::ActionMeta;
use crate::error::Result;

/// One executed action.
#[derive(Debug, Clone, PartialEq, Eq, Row)]
#[table(name = "SCHEMA_ACTION_LOG")]
pub struct ActionLogEntry {
    /// Owning definition.
    #[column(primary_key, length = 100)]
    pub definition_id: String,
    /// Action id within the definition.
    #[column(primary_key, length = 100)]
    pub action_id: String,
    /// Author of the action.
    #[column(length = 100)]
    pub author: String,
    /// Who ran it.
    #[column(length = 100)]
    pub executed_by: String,
    /// When it ran.
    pub execution_ts: DateTime<Utc>,
}

impl ActionLogEntry {
    /// A log row for `meta`, stamped now.
    #[must_use]
    pub fn new(meta: &ActionMeta, executed_by: &str) -> Self {
        Self {
            definition_id: meta.definition_id.clone(),
            action_id: meta.action_id.clone(),
            author: meta.author.clone(),
            executed_by: executed_by.to_string(),
            execution_ts: Utc::now(),
        }
    }

    /// The log table's name.
    #[must_use]
    pub fn table_name() -> TableName {
        TableName::from(Self::table())
    }
}

fn identifies(meta: &ActionMeta) -> BooleanExpression {
    column(ActionLogEntry::definition_id())
        .eq(meta.definition_id.clone())
        .and(column(ActionLogEntry::action_id()).eq(meta.action_id.clone()))
}

/// Whether the action log holds a row for `meta`.
///
/// # Errors
///
/// Fails when the probe query fails, including when the log table is missing.
pub async fn is_logged(
    database: &Database,
    executor: &dyn SqlExecutor,
    meta: &ActionMeta,
) -> Result<bool> {
    let log = Alias::<ActionLogEntry>::new();
    let probe = Select::new()
        .column_as(count(), "N")
        .from(&log)
        .where_clause(identifies(meta));
    let rows = database.fetch(executor, &probe).await?;
    match rows.first() {
        Some(row) => Ok(row.get_index::<i64>(0)? > 0),
        None => Ok(false),
    }
}

/// Reads the action log in execution order, optionally for one definition.
///
/// # Errors
///
/// Fails when the query fails or a row does not map.
pub async fn entries(
    database: &Database,
    executor: &dyn SqlExecutor,
    definition_id: Option<&str>,
) -> Result<Vec<ActionLogEntry>> {
    let log = Alias::<ActionLogEntry>::named("l");
    let mut select = Select::new().from(&log);
    if let Some(id) = definition_id {
        select = select.where_clause(column(ActionLogEntry::definition_id()).eq(id));
    }
    let select = select
        .order_by(column(ActionLogEntry::execution_ts()), OrderDirection::Asc)
        .order_by(column(ActionLogEntry::definition_id()), OrderDirection::Asc)
        .order_by(column(ActionLogEntry::action_id()), OrderDirection::Asc);

    let entries = database
        .fetch_as(executor, &select, |row| ActionLogEntry::from_row(row, log.name()))
        .await?;
    Ok(entries)
}
