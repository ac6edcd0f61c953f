//! The interceptor pipeline.
//!
//! Actions are processed depth-first: whatever an interceptor produces for an
//! action is driven through every later stage before the next input action
//! starts. A log entry generated for an action therefore reaches the
//! executor only after the action itself ran.

use std::sync::Arc;

use tracing::debug;

use crate::action::Action;
use crate::error::Result;
use crate::interceptor::{default_interceptors, ActionInterceptor, PipelineContext};

/// Interceptors ordered by ascending priority.
#[derive(Clone, Default)]
pub struct ActionPipeline {
    interceptors: Vec<Arc<dyn ActionInterceptor>>,
}

impl ActionPipeline {
    /// Creates an empty pipeline; every action passes through unchanged.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The pipeline every migration uses: log table creation, filtering,
    /// log generation, SQL generation and execution.
    #[must_use]
    pub fn standard() -> Self {
        default_interceptors()
            .into_iter()
            .fold(Self::new(), Self::with_shared)
    }

    /// Adds an interceptor.
    #[must_use]
    pub fn with(self, interceptor: impl ActionInterceptor + 'static) -> Self {
        self.with_shared(Arc::new(interceptor))
    }

    /// Adds a shared interceptor. Interceptors of equal priority keep their
    /// insertion order.
    #[must_use]
    pub fn with_shared(mut self, interceptor: Arc<dyn ActionInterceptor>) -> Self {
        self.interceptors.push(interceptor);
        self.interceptors.sort_by_key(|i| i.priority());
        self
    }

    /// Interceptor names in execution order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.interceptors.iter().map(|i| i.name())
    }

    /// Runs `actions` through every stage and returns what came out of the
    /// last one.
    ///
    /// # Errors
    ///
    /// The first interceptor failure aborts the run; actions not yet
    /// processed are dropped.
    pub async fn process(&self, context: &PipelineContext, actions: Vec<Action>) -> Result<Vec<Action>> {
        let mut output = Vec::new();
        let mut pending: Vec<(Action, usize)> = actions.into_iter().rev().map(|a| (a, 0)).collect();

        while let Some((action, stage)) = pending.pop() {
            let next = self
                .interceptors
                .iter()
                .enumerate()
                .skip(stage)
                .find(|(_, interceptor)| interceptor.supports(&action));

            match next {
                Some((index, interceptor)) => {
                    debug!(interceptor = interceptor.name(), action = %action, "Intercepting");
                    let expanded = interceptor.intercept(context, action).await?;
                    pending.extend(expanded.into_iter().rev().map(|a| (a, index + 1)));
                }
                None => output.push(action),
            }
        }

        Ok(output)
    }
}

impl std::fmt::Debug for ActionPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
