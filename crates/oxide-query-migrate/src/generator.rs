//! Applying schema definitions.

use tracing::info;

use crate::action::{Action, SqlAction};
use crate::definition::SchemaDefinition;
use crate::error::Result;
use crate::interceptor::PipelineContext;
use crate::pipeline::ActionPipeline;

/// Runs schema definitions through the action pipeline.
#[derive(Debug, Clone)]
pub struct SchemaGenerator {
    pipeline: ActionPipeline,
    context: PipelineContext,
}

/// What a generator run processed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationReport {
    /// Statements that came out of the pipeline, in execution order.
    /// Includes blank ones.
    pub statements: Vec<SqlAction>,
}

impl GenerationReport {
    /// Statements with SQL text.
    pub fn executable(&self) -> impl Iterator<Item = &SqlAction> {
        self.statements.iter().filter(|s| !s.is_blank())
    }

    /// Number of definition actions that produced a statement.
    #[must_use]
    pub fn action_count(&self) -> usize {
        self.statements.iter().filter(|s| s.origin.is_some()).count()
    }
}

impl SchemaGenerator {
    /// Creates a generator using the standard pipeline.
    #[must_use]
    pub fn new(context: PipelineContext) -> Self {
        Self::with_pipeline(context, ActionPipeline::standard())
    }

    /// Creates a generator with a custom pipeline.
    #[must_use]
    pub const fn with_pipeline(context: PipelineContext, pipeline: ActionPipeline) -> Self {
        Self { pipeline, context }
    }

    /// The context interceptors run with.
    #[must_use]
    pub const fn context(&self) -> &PipelineContext {
        &self.context
    }

    /// Applies definitions in order, creating the action log table first.
    ///
    /// # Errors
    ///
    /// Stops at the first failing action. Actions executed before it stay
    /// applied and logged.
    pub async fn generate(&self, definitions: &[SchemaDefinition]) -> Result<GenerationReport> {
        let mut actions = vec![Action::CreateActionLogTable];
        for definition in definitions {
            info!(definition = %definition.id(), actions = definition.actions().len(), "Processing definition");
            actions.extend(definition.actions().iter().cloned());
        }

        let output = self.pipeline.process(&self.context, actions).await?;
        let statements: Vec<SqlAction> = output
            .into_iter()
            .filter_map(|action| match action {
                Action::Sql(sql) => Some(sql),
                _ => None,
            })
            .collect();

        info!(
            statements = statements.len(),
            dry_run = self.context.is_dry_run(),
            "Schema generation finished"
        );
        Ok(GenerationReport { statements })
    }
}
