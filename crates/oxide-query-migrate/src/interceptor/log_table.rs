//! Creates the action log table on first use.

use futures::future::BoxFuture;
use oxide_query_core::schema::TableDefinition;
use oxide_query_core::RowType;
use tracing::debug;

use super::{ActionInterceptor, PipelineContext, INITIALISATION};
use crate::action::{Action, ActionKind, ActionMeta};
use crate::error::Result;
use crate::log::ActionLogEntry;

/// Creates `SCHEMA_ACTION_LOG` unless it already exists.
#[derive(Debug, Clone, Copy, Default)]
pub struct ActionLogTableCreator;

impl ActionLogTableCreator {
    async fn run(&self, context: &PipelineContext, _action: Action) -> Result<Vec<Action>> {
        let table = ActionLogEntry::table_name();
        if context
            .database()
            .table_exists(context.executor(), &table)
            .await?
        {
            debug!(table = %table.name, "Action log table exists");
            return Ok(Vec::new());
        }
        Ok(vec![Action::CreateTable {
            meta: ActionMeta::new(table.name.clone(), "create", "oxide-query-migrate").unlogged(),
            table: TableDefinition::from(ActionLogEntry::table()),
        }])
    }
}

impl ActionInterceptor for ActionLogTableCreator {
    fn name(&self) -> &'static str {
        "action-log-table"
    }

    fn priority(&self) -> i32 {
        INITIALISATION
    }

    fn supported(&self) -> ActionKind {
        ActionKind::CreateActionLogTable
    }

    fn intercept<'a>(
        &'a self,
        context: &'a PipelineContext,
        action: Action,
    ) -> BoxFuture<'a, Result<Vec<Action>>> {
        Box::pin(self.run(context, action))
    }
}
