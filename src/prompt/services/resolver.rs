//! Instruction resolution: catalog lookup plus render-context assembly.

use crate::prompt::domain::{
    InstructionSource, PromptCatalog, PromptError, ResolvedInstruction,
};
use crate::prompt::ports::TemplateRenderer;
use crate::workflow::domain::{Stage, SubState, WorkTask};
use serde_json::{Map, Value};
use std::sync::Arc;

/// The fixed not-found template.
///
/// Rendered when neither a stage-specific nor a shared template is
/// registered. It reports the missing combination so the caller can close
/// the configuration gap; resolving it changes no task state.
const FALLBACK_TEMPLATE: &str = "\
No instruction template is registered for stage '{{ stage }}' in sub-state
'{{ sub_state }}'. Register a template for this combination or a shared
template for the sub-state. Task {{ task.id }} is unchanged.
";

/// Resolves the instruction text for a task's current position.
///
/// Lookup order is authoritative: (stage, sub-state) template, then the
/// shared sub-state template, then the fixed fallback.
#[derive(Clone)]
pub struct PromptResolver<R>
where
    R: TemplateRenderer,
{
    catalog: PromptCatalog,
    renderer: Arc<R>,
}

impl<R> PromptResolver<R>
where
    R: TemplateRenderer,
{
    /// Creates a resolver over a catalog and a renderer.
    #[must_use]
    pub const fn new(catalog: PromptCatalog, renderer: Arc<R>) -> Self {
        Self { catalog, renderer }
    }

    /// Resolves and renders the instruction for (stage, sub-state).
    ///
    /// `extra` entries are merged into the top level of the render context
    /// and take precedence over the task-derived keys.
    ///
    /// # Errors
    ///
    /// Returns [`PromptError::Render`] when a registered template (or the
    /// fallback) fails to render, or [`PromptError::Context`] when the task
    /// cannot be turned into a render context.
    pub fn resolve(
        &self,
        stage: Stage,
        sub_state: SubState,
        task: &WorkTask,
        extra: Option<&Map<String, Value>>,
    ) -> Result<ResolvedInstruction, PromptError> {
        let context = build_context(stage, sub_state, task, extra)?;
        let (template, source) = match self.catalog.stage_template(stage, sub_state) {
            Some(template) => (template.body(), InstructionSource::Stage),
            None => match self.catalog.shared_template(sub_state) {
                Some(template) => (template.body(), InstructionSource::Shared),
                None => (FALLBACK_TEMPLATE, InstructionSource::Fallback),
            },
        };
        let text = self
            .renderer
            .render(template, &context)
            .map_err(|error| PromptError::Render {
                stage,
                sub_state,
                reason: error.to_string(),
            })?;
        Ok(ResolvedInstruction::new(text, source))
    }
}

/// Assembles the documented render context.
///
/// Keys: `task` (id, title, description, acceptance_criteria, source,
/// reference), `stage`, `sub_state`, `artifacts` (accepted artifacts keyed
/// by stage), `preflight` (preliminary-check artifacts keyed by stage),
/// `pending_artifact`, `context` (the task's context map), `feedback`
/// (rejection feedback for the active stage, if any), plus caller extras.
fn build_context(
    stage: Stage,
    sub_state: SubState,
    task: &WorkTask,
    extra: Option<&Map<String, Value>>,
) -> Result<Value, PromptError> {
    let mut root = Map::new();
    root.insert(
        "task".to_owned(),
        serde_json::json!({
            "id": task.key().as_str(),
            "title": task.title(),
            "description": task.description(),
            "acceptance_criteria": task.acceptance_criteria(),
            "source": task.origin().source.as_str(),
            "reference": task.origin().reference,
        }),
    );
    root.insert("stage".to_owned(), Value::String(stage.as_str().to_owned()));
    root.insert(
        "sub_state".to_owned(),
        Value::String(sub_state.as_str().to_owned()),
    );
    root.insert("artifacts".to_owned(), to_context_value(task.artifacts())?);
    root.insert("preflight".to_owned(), to_context_value(task.preflight())?);
    root.insert(
        "pending_artifact".to_owned(),
        to_context_value(&task.pending_artifact())?,
    );
    root.insert("context".to_owned(), to_context_value(task.context())?);
    root.insert(
        "feedback".to_owned(),
        task.feedback_for(stage)
            .map_or(Value::Null, |notes| Value::String(notes.to_owned())),
    );
    if let Some(entries) = extra {
        for (key, value) in entries {
            root.insert(key.clone(), value.clone());
        }
    }
    Ok(Value::Object(root))
}

fn to_context_value<T>(value: &T) -> Result<Value, PromptError>
where
    T: serde::Serialize,
{
    serde_json::to_value(value).map_err(|error| PromptError::Context(error.to_string()))
}
