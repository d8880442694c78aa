//! Template registry with the authoritative three-level lookup order.

use super::PromptTemplate;
use crate::workflow::domain::{Stage, SubState};
use std::collections::BTreeMap;

/// Registry of instruction templates.
///
/// Lookup order is fixed and never reordered: a template keyed by the exact
/// (stage, sub-state) pair wins over a shared template keyed by the
/// sub-state alone, which wins over the resolver's fixed fallback.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptCatalog {
    stage_templates: BTreeMap<(Stage, SubState), PromptTemplate>,
    shared_templates: BTreeMap<SubState, PromptTemplate>,
}

impl PromptCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates the catalog shipped with the engine: a dispatching template
    /// per stage, the implementation preliminary check, and shared gate
    /// templates.
    #[must_use]
    pub fn standard() -> Self {
        Self::empty()
            .with_stage_template(
                Stage::Requirements,
                SubState::Dispatching,
                templates::REQUIREMENTS_DISPATCH,
            )
            .with_stage_template(Stage::Spec, SubState::Dispatching, templates::SPEC_DISPATCH)
            .with_stage_template(
                Stage::TaskBreakdown,
                SubState::Dispatching,
                templates::TASK_BREAKDOWN_DISPATCH,
            )
            .with_stage_template(
                Stage::Planning,
                SubState::Dispatching,
                templates::PLANNING_DISPATCH,
            )
            .with_stage_template(
                Stage::Implementation,
                SubState::Preliminary,
                templates::IMPLEMENTATION_PRELIMINARY,
            )
            .with_stage_template(
                Stage::Implementation,
                SubState::Dispatching,
                templates::IMPLEMENTATION_DISPATCH,
            )
            .with_stage_template(Stage::Review, SubState::Dispatching, templates::REVIEW_DISPATCH)
            .with_stage_template(
                Stage::Testing,
                SubState::Dispatching,
                templates::TESTING_DISPATCH,
            )
            .with_stage_template(
                Stage::Finalize,
                SubState::Dispatching,
                templates::FINALIZE_DISPATCH,
            )
            .with_shared_template(SubState::AwaitingAiReview, templates::SHARED_AI_REVIEW)
            .with_shared_template(SubState::AwaitingHumanReview, templates::SHARED_HUMAN_REVIEW)
            .with_shared_template(SubState::Accepted, templates::SHARED_ACCEPTED)
    }

    /// Registers a template for an exact (stage, sub-state) pair.
    #[must_use]
    pub fn with_stage_template(
        mut self,
        stage: Stage,
        sub_state: SubState,
        template: impl Into<PromptTemplate>,
    ) -> Self {
        self.stage_templates.insert((stage, sub_state), template.into());
        self
    }

    /// Registers a shared template for a sub-state, used when multiple
    /// stages present an identical prompt.
    #[must_use]
    pub fn with_shared_template(
        mut self,
        sub_state: SubState,
        template: impl Into<PromptTemplate>,
    ) -> Self {
        self.shared_templates.insert(sub_state, template.into());
        self
    }

    /// Returns the template registered for the exact pair, if any.
    #[must_use]
    pub fn stage_template(&self, stage: Stage, sub_state: SubState) -> Option<&PromptTemplate> {
        self.stage_templates.get(&(stage, sub_state))
    }

    /// Returns the shared template for the sub-state, if any.
    #[must_use]
    pub fn shared_template(&self, sub_state: SubState) -> Option<&PromptTemplate> {
        self.shared_templates.get(&sub_state)
    }
}

mod templates {
    //! Default instruction templates, written against the documented
    //! variable contract.

    pub(super) const REQUIREMENTS_DISPATCH: &str = "\
You are gathering requirements for task {{ task.id }}: {{ task.title }}.

Task description:
{{ task.description | default(\"(no description provided)\") }}

Acceptance criteria:
{% for criterion in task.acceptance_criteria %}- {{ criterion }}
{% endfor %}
{% if feedback %}The previous submission was rejected. Reviewer feedback:
{{ feedback }}

{% endif %}Submit a JSON payload with task_summary, task_description,
acceptance_criteria, task_source and additional_context.
";

    pub(super) const SPEC_DISPATCH: &str = "\
You are authoring the specification for task {{ task.id }}: {{ task.title }}.

Accepted requirements:
{{ artifacts.requirements | tojson }}

{% if feedback %}The previous submission was rejected. Reviewer feedback:
{{ feedback }}

{% endif %}Submit a JSON payload with a spec_summary field plus the spec body.
";

    pub(super) const TASK_BREAKDOWN_DISPATCH: &str = "\
You are breaking the specification for task {{ task.id }} into subtasks.

Accepted specification:
{{ artifacts.spec | tojson }}

{% if feedback %}The previous submission was rejected. Reviewer feedback:
{{ feedback }}

{% endif %}Submit a JSON payload with breakdown_summary and subtasks.
";

    pub(super) const PLANNING_DISPATCH: &str = "\
You are planning the implementation of task {{ task.id }}.

Subtasks:
{{ artifacts.task_breakdown | tojson }}

{% if feedback %}The previous submission was rejected. Reviewer feedback:
{{ feedback }}

{% endif %}Submit a JSON payload with plan_summary and ordered steps.
";

    pub(super) const IMPLEMENTATION_PRELIMINARY: &str = "\
Before implementation of task {{ task.id }} starts, inspect the working
tree. Submit a JSON payload with is_clean, current_branch and
uncommitted_changes describing the current git status.
";

    pub(super) const IMPLEMENTATION_DISPATCH: &str = "\
You are implementing task {{ task.id }}: {{ task.title }}.

Plan:
{{ artifacts.planning | tojson }}
{% if preflight.implementation and not preflight.implementation.is_clean %}
Note: the working tree was not clean when implementation started.
{% endif %}
{% if feedback %}The previous submission was rejected. Reviewer feedback:
{{ feedback }}

{% endif %}Submit a JSON payload with summary and completed_subtasks.
";

    pub(super) const REVIEW_DISPATCH: &str = "\
You are reviewing the implementation of task {{ task.id }}.

Implementation manifest:
{{ artifacts.implementation | tojson }}

{% if feedback %}The previous submission was rejected. Reviewer feedback:
{{ feedback }}

{% endif %}Submit a JSON payload with summary, approved and feedback.
";

    pub(super) const TESTING_DISPATCH: &str = "\
You are testing task {{ task.id }}: {{ task.title }}.

Acceptance criteria:
{% for criterion in task.acceptance_criteria %}- {{ criterion }}
{% endfor %}
{% if feedback %}The previous submission was rejected. Reviewer feedback:
{{ feedback }}

{% endif %}Submit a JSON payload with test_summary, tests_run and test_results.
";

    pub(super) const FINALIZE_DISPATCH: &str = "\
You are finalising task {{ task.id }}: commit the work and open a pull
request. Submit a JSON payload with commit_hash and pr_url.
";

    pub(super) const SHARED_AI_REVIEW: &str = "\
Act as the automated reviewer for the {{ stage }} artifact of task
{{ task.id }}.

Pending artifact:
{{ pending_artifact | tojson }}

Acceptance criteria:
{% for criterion in task.acceptance_criteria %}- {{ criterion }}
{% endfor %}
Approve only when the artifact is complete and internally consistent;
otherwise reject with concrete feedback.
";

    pub(super) const SHARED_HUMAN_REVIEW: &str = "\
The {{ stage }} artifact of task {{ task.id }} passed automated review and
awaits your approval.

Pending artifact:
{{ pending_artifact | tojson }}
";

    pub(super) const SHARED_ACCEPTED: &str = "\
Stage {{ stage }} of task {{ task.id }} is complete. No action is required.
";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_template_wins_over_shared() {
        let catalog = PromptCatalog::empty()
            .with_shared_template(SubState::Dispatching, "shared")
            .with_stage_template(Stage::Spec, SubState::Dispatching, "specific");
        assert_eq!(
            catalog
                .stage_template(Stage::Spec, SubState::Dispatching)
                .map(PromptTemplate::body),
            Some("specific")
        );
        assert_eq!(
            catalog
                .shared_template(SubState::Dispatching)
                .map(PromptTemplate::body),
            Some("shared")
        );
    }

    #[test]
    fn standard_catalog_covers_every_producing_position() {
        let catalog = PromptCatalog::standard();
        for stage in Stage::ORDER {
            assert!(
                catalog.stage_template(stage, SubState::Dispatching).is_some(),
                "missing dispatching template for {stage}"
            );
        }
        assert!(
            catalog
                .stage_template(Stage::Implementation, SubState::Preliminary)
                .is_some()
        );
        assert!(catalog.shared_template(SubState::AwaitingAiReview).is_some());
        assert!(
            catalog
                .shared_template(SubState::AwaitingHumanReview)
                .is_some()
        );
    }
}
