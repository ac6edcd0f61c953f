//! Follows each logged action with its log entry.

use futures::future::BoxFuture;

use super::{ActionInterceptor, PipelineContext, LOG_GENERATION};
use crate::action::{Action, ActionKind};
use crate::error::Result;
use crate::log::ActionLogEntry;

/// Follows every logged action with its action log entry.
#[derive(Debug, Clone, Copy, Default)]
pub struct ActionLogGenerator;

impl ActionLogGenerator {
    fn expand(context: &PipelineContext, action: Action) -> Vec<Action> {
        let entry = action
            .meta()
            .filter(|meta| meta.logged)
            .map(|meta| ActionLogEntry::new(meta, context.executed_by()));
        match entry {
            Some(entry) => vec![action, Action::LogEntry(entry)],
            None => vec![action],
        }
    }
}

impl ActionInterceptor for ActionLogGenerator {
    fn name(&self) -> &'static str {
        "action-log-generator"
    }

    fn priority(&self) -> i32 {
        LOG_GENERATION
    }

    fn supported(&self) -> ActionKind {
        ActionKind::Definition
    }

    fn intercept<'a>(
        &'a self,
        context: &'a PipelineContext,
        action: Action,
    ) -> BoxFuture<'a, Result<Vec<Action>>> {
        let actions = Self::expand(context, action);
        Box::pin(async move { Ok(actions) })
    }
}
