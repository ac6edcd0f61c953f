//! Runs generated SQL, or logs it in a dry run.

use futures::future::BoxFuture;
use tracing::{debug, info};

use super::{ActionInterceptor, PipelineContext, EXECUTION};
use crate::action::{Action, ActionKind};
use crate::error::{MigrateError, Result};

/// Runs [`Action::Sql`] statements.
///
/// Executed actions are emitted unchanged so callers can report them. Blank
/// statements are emitted without touching the database. Failures are not
/// retried.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlActionExecutor;

impl SqlActionExecutor {
    async fn run(&self, context: &PipelineContext, action: Action) -> Result<Vec<Action>> {
        let sql = match action {
            Action::Sql(sql) => sql,
            other => return Ok(vec![other]),
        };

        if sql.is_blank() {
            debug!(origin = ?sql.origin.as_ref().map(ToString::to_string), "Nothing to execute");
            return Ok(vec![Action::Sql(sql)]);
        }

        if context.is_dry_run() {
            info!(sql = %sql.sql, args = sql.args.len(), "Dry run, not executing");
            return Ok(vec![Action::Sql(sql)]);
        }

        debug!(sql = %sql.sql, args = sql.args.len(), "Executing statement");
        let result = context.executor().update(&sql.sql, &sql.args).await;
        if let Err(source) = result {
            return Err(match sql.origin {
                Some(meta) => MigrateError::ActionFailed {
                    definition: meta.definition_id,
                    action: meta.action_id,
                    source,
                },
                None => MigrateError::Query(source),
            });
        }
        if let Some(meta) = &sql.origin {
            info!(definition = %meta.definition_id, action = %meta.action_id, "Executed action");
        }
        Ok(vec![Action::Sql(sql)])
    }
}

impl ActionInterceptor for SqlActionExecutor {
    fn name(&self) -> &'static str {
        "sql-executor"
    }

    fn priority(&self) -> i32 {
        EXECUTION
    }

    fn supported(&self) -> ActionKind {
        ActionKind::Sql
    }

    fn intercept<'a>(
        &'a self,
        context: &'a PipelineContext,
        action: Action,
    ) -> BoxFuture<'a, Result<Vec<Action>>> {
        Box::pin(self.run(context, action))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::SqlAction;
    use crate::interceptor::testing::{context, ScriptedExecutor};
    use oxide_query_core::Rendered;

    fn sql(text: &str) -> Action {
        Action::Sql(SqlAction::new(Rendered::sql(text), None))
    }

    #[test]
    fn test_executes_statement() {
        let executor = ScriptedExecutor::with_count(0);
        let context = context(&executor);
        let actions =
            tokio_test::block_on(SqlActionExecutor.intercept(&context, sql("drop table WIDGET"))).unwrap();
        assert_eq!(actions, vec![sql("drop table WIDGET")]);
        assert_eq!(executor.updates(), vec![String::from("drop table WIDGET")]);
    }

    #[test]
    fn test_blank_statement_is_emitted_not_run() {
        let executor = ScriptedExecutor::with_count(0);
        let context = context(&executor);
        let actions = tokio_test::block_on(SqlActionExecutor.intercept(&context, sql(""))).unwrap();
        assert_eq!(actions.len(), 1);
        assert!(executor.updates().is_empty());
    }

    #[test]
    fn test_dry_run_skips_execution() {
        let executor = ScriptedExecutor::with_count(0);
        let context = context(&executor).with_dry_run(true);
        let actions =
            tokio_test::block_on(SqlActionExecutor.intercept(&context, sql("drop table WIDGET"))).unwrap();
        assert_eq!(actions.len(), 1);
        assert!(executor.updates().is_empty());
    }
}
