//! Skips actions the action log already records.

use futures::future::BoxFuture;
use tracing::{debug, info};

use super::{ActionInterceptor, PipelineContext, FILTER};
use crate::action::{Action, ActionKind};
use crate::error::Result;
use crate::log::{self, ActionLogEntry};

/// Drops definition actions the action log already records.
///
/// Unlogged actions always pass. A dry run against a database without the
/// log table lets everything through, since the table would have been
/// created empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct ActionFilter;

impl ActionFilter {
    async fn run(&self, context: &PipelineContext, action: Action) -> Result<Vec<Action>> {
        let meta = match action.meta() {
            Some(meta) if meta.logged => meta.clone(),
            _ => return Ok(vec![action]),
        };

        if context.is_dry_run()
            && !context
                .database()
                .table_exists(context.executor(), &ActionLogEntry::table_name())
                .await?
        {
            return Ok(vec![action]);
        }

        if log::is_logged(context.database(), context.executor(), &meta).await? {
            info!(definition = %meta.definition_id, action = %meta.action_id, "Already executed, skipping");
            return Ok(Vec::new());
        }

        debug!(definition = %meta.definition_id, action = %meta.action_id, "Pending");
        Ok(vec![action])
    }
}

impl ActionInterceptor for ActionFilter {
    fn name(&self) -> &'static str {
        "action-filter"
    }

    fn priority(&self) -> i32 {
        FILTER
    }

    fn supported(&self) -> ActionKind {
        ActionKind::Definition
    }

    fn intercept<'a>(
        &'a self,
        context: &'a PipelineContext,
        action: Action,
    ) -> BoxFuture<'a, Result<Vec<Action>>> {
        Box::pin(self.run(context, action))
    }
}
