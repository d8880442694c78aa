//! Per-stage artifact schema validation.

use super::rules::{
    Violations, as_object, require_bool, require_source_kind, require_string,
    require_string_list, require_test_results,
};
use crate::workflow::domain::{SchemaValidationError, Stage, StageArtifact};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Stateless checker that turns raw submission payloads into typed
/// artifacts.
///
/// Validation is a pure function of (stage, payload): it has no side effects
/// and no access to task history. Unknown extra fields are permitted; the
/// free-form schemas retain them.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArtifactValidator;

impl ArtifactValidator {
    /// Creates a validator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Validates a producing-sub-state payload against the stage's declared
    /// schema and returns the typed artifact.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaValidationError`] listing every missing and invalid
    /// field when the payload does not satisfy the schema.
    pub fn validate(
        &self,
        stage: Stage,
        payload: &Value,
    ) -> Result<StageArtifact, SchemaValidationError> {
        let map = as_object(stage, payload)?;
        let mut violations = Violations::new();
        match stage {
            Stage::Requirements => {
                require_string(map, "task_summary", &mut violations);
                require_string(map, "task_description", &mut violations);
                require_string_list(map, "acceptance_criteria", &mut violations);
                require_source_kind(map, "task_source", &mut violations);
                require_string(map, "additional_context", &mut violations);
            }
            Stage::Spec => {
                require_string(map, "spec_summary", &mut violations);
            }
            Stage::TaskBreakdown => {
                require_string(map, "breakdown_summary", &mut violations);
                require_string_list(map, "subtasks", &mut violations);
            }
            Stage::Planning => {
                require_string(map, "plan_summary", &mut violations);
                require_string_list(map, "steps", &mut violations);
            }
            Stage::Implementation => {
                require_string(map, "summary", &mut violations);
                require_string_list(map, "completed_subtasks", &mut violations);
            }
            Stage::Review => {
                require_string(map, "summary", &mut violations);
                require_bool(map, "approved", &mut violations);
                require_string_list(map, "feedback", &mut violations);
            }
            Stage::Testing => {
                require_string(map, "test_summary", &mut violations);
                require_string_list(map, "tests_run", &mut violations);
                require_test_results(map, "test_results", &mut violations);
            }
            Stage::Finalize => {
                require_string(map, "commit_hash", &mut violations);
                require_string(map, "pr_url", &mut violations);
            }
        }
        if !violations.is_empty() {
            return Err(violations.into_error(stage));
        }
        Self::into_typed(stage, payload)
    }

    /// Validates a preliminary-sub-state payload against the stage's
    /// preliminary schema.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaValidationError`] when the payload does not satisfy
    /// the preliminary schema, or when the stage declares none.
    pub fn validate_preliminary(
        &self,
        stage: Stage,
        payload: &Value,
    ) -> Result<StageArtifact, SchemaValidationError> {
        if !stage.has_preliminary() {
            return Err(SchemaValidationError::new(
                stage,
                Vec::new(),
                vec![crate::workflow::domain::FieldViolation::new(
                    "$",
                    "stage declares no preliminary schema",
                )],
            ));
        }
        let map = as_object(stage, payload)?;
        let mut violations = Violations::new();
        require_bool(map, "is_clean", &mut violations);
        require_string(map, "current_branch", &mut violations);
        require_string_list(map, "uncommitted_changes", &mut violations);
        if !violations.is_empty() {
            return Err(violations.into_error(stage));
        }
        deserialize_payload(stage, payload).map(StageArtifact::GitStatus)
    }

    fn into_typed(stage: Stage, payload: &Value) -> Result<StageArtifact, SchemaValidationError> {
        match stage {
            Stage::Requirements => {
                deserialize_payload(stage, payload).map(StageArtifact::Requirements)
            }
            Stage::Spec => deserialize_payload(stage, payload).map(StageArtifact::Spec),
            Stage::TaskBreakdown => {
                deserialize_payload(stage, payload).map(StageArtifact::TaskBreakdown)
            }
            Stage::Planning => deserialize_payload(stage, payload).map(StageArtifact::Plan),
            Stage::Implementation => {
                deserialize_payload(stage, payload).map(StageArtifact::Implementation)
            }
            Stage::Review => deserialize_payload(stage, payload).map(StageArtifact::Review),
            Stage::Testing => deserialize_payload(stage, payload).map(StageArtifact::TestResult),
            Stage::Finalize => deserialize_payload(stage, payload).map(StageArtifact::Finalize),
        }
    }
}

/// Converts a field-checked payload into its typed artifact struct.
fn deserialize_payload<T>(stage: Stage, payload: &Value) -> Result<T, SchemaValidationError>
where
    T: DeserializeOwned,
{
    serde_json::from_value(payload.clone()).map_err(|error| {
        SchemaValidationError::new(
            stage,
            Vec::new(),
            vec![crate::workflow::domain::FieldViolation::new(
                "$",
                error.to_string(),
            )],
        )
    })
}
