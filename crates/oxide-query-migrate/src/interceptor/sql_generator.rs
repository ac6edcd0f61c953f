//! Renders actions and log entries as SQL.

use futures::future::BoxFuture;
use oxide_query_core::{Insert, Rendered};

use super::{ActionInterceptor, PipelineContext, SQL_GENERATION};
use crate::action::{Action, ActionKind, SqlAction};
use crate::error::Result;

/// Renders definition actions and log entries to [`Action::Sql`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlGenerator;

impl SqlGenerator {
    fn render(context: &PipelineContext, action: Action) -> Result<Action> {
        let database = context.database();
        let sql = match action {
            Action::CreateTable { meta, table } => {
                SqlAction::new(database.create_table_sql(&table), Some(meta))
            }
            Action::CreateIndex { meta, index } => {
                SqlAction::new(database.create_index_sql(&index), Some(meta))
            }
            Action::AddForeignKey {
                meta,
                table,
                foreign_key,
            } => SqlAction::new(database.add_foreign_key_sql(&table, &foreign_key), Some(meta)),
            Action::DropTable { meta, table } => {
                SqlAction::new(database.drop_table_sql(&table), Some(meta))
            }
            Action::RunSql { meta, sql, args } => SqlAction::new(Rendered::new(sql, args), Some(meta)),
            Action::LogEntry(entry) => SqlAction::new(database.render(&Insert::new(&entry))?, None),
            other => return Ok(other),
        };
        Ok(Action::Sql(sql))
    }
}

impl ActionInterceptor for SqlGenerator {
    fn name(&self) -> &'static str {
        "sql-generator"
    }

    fn priority(&self) -> i32 {
        SQL_GENERATION
    }

    fn supported(&self) -> ActionKind {
        ActionKind::Renderable
    }

    fn intercept<'a>(
        &'a self,
        context: &'a PipelineContext,
        action: Action,
    ) -> BoxFuture<'a, Result<Vec<Action>>> {
        let rendered = Self::render(context, action).map(|action| vec![action]);
        Box::pin(async move { rendered })
    }
}
