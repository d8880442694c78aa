//! Shared fixtures for the pipeline integration suite.

use atelier::prompt::adapters::MiniJinjaRenderer;
use atelier::prompt::domain::PromptCatalog;
use atelier::prompt::services::PromptResolver;
use atelier::workflow::adapters::memory::InMemorySnapshotStore;
use atelier::workflow::domain::{
    NewWorkTask, Stage, StagePosition, SubState, TaskKey, TaskOrigin, TaskSourceKind, WorkTask,
    WorkflowConfig,
};
use atelier::workflow::ports::NoopTracker;
use atelier::workflow::services::{EngineParts, WorkflowEngine};
use mockable::DefaultClock;
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Engine type used throughout the suite.
pub type TestEngine =
    WorkflowEngine<InMemorySnapshotStore, MiniJinjaRenderer, NoopTracker, DefaultClock>;

/// Builds an engine over the given store and catalog.
pub fn engine_with(
    config: WorkflowConfig,
    snapshots: Arc<InMemorySnapshotStore>,
    catalog: PromptCatalog,
) -> TestEngine {
    WorkflowEngine::new(EngineParts {
        config,
        resolver: PromptResolver::new(catalog, Arc::new(MiniJinjaRenderer::new())),
        snapshots,
        tracker: None,
        clock: Arc::new(DefaultClock),
    })
    .expect("valid configuration")
}

/// Builds an engine with default configuration and the standard catalog.
pub fn default_engine() -> TestEngine {
    engine_with(
        WorkflowConfig::default(),
        Arc::new(InMemorySnapshotStore::new()),
        PromptCatalog::standard(),
    )
}

/// Builds a task positioned at the given stage and sub-state.
pub fn task_at(key: &str, stage: Stage, sub_state: SubState) -> WorkTask {
    WorkTask::new(
        NewWorkTask {
            key: TaskKey::new(key).expect("valid key"),
            title: format!("Integration task {key}"),
            description: "Walk the delivery pipeline".to_owned(),
            acceptance_criteria: vec![
                "every enabled stage is visited in order".to_owned(),
                "every transition is snapshotted".to_owned(),
            ],
            origin: TaskOrigin::new(TaskSourceKind::LocalFile),
            position: StagePosition::new(stage, sub_state),
            context: BTreeMap::new(),
        },
        &DefaultClock,
    )
    .expect("valid task")
}

/// Returns a schema-valid payload for the stage's producing sub-state.
pub fn payload_for(stage: Stage) -> Value {
    match stage {
        Stage::Requirements => json!({
            "task_summary": "Ship the feature",
            "task_description": "Implement, review, test, finalise",
            "acceptance_criteria": ["it works", "it is tested"],
            "task_source": "local_file",
            "additional_context": "",
        }),
        Stage::Spec => json!({"spec_summary": "covers the full surface"}),
        Stage::TaskBreakdown => json!({
            "breakdown_summary": "two subtasks",
            "subtasks": ["engine", "tests"],
        }),
        Stage::Planning => json!({
            "plan_summary": "three steps",
            "steps": ["build", "verify", "ship"],
        }),
        Stage::Implementation => json!({
            "summary": "done",
            "completed_subtasks": ["engine", "tests"],
        }),
        Stage::Review => json!({
            "summary": "looks correct",
            "approved": true,
            "feedback": [],
        }),
        Stage::Testing => json!({
            "test_summary": "all green",
            "tests_run": ["t1", "t2"],
            "test_results": [
                {"name": "t1", "status": "passed"},
                {"name": "t2", "status": "passed"},
            ],
        }),
        Stage::Finalize => json!({
            "commit_hash": "abc123",
            "pr_url": "https://example.invalid/pr/1",
        }),
    }
}

/// Returns a schema-valid git-status payload for a preliminary check.
pub fn git_status_payload() -> Value {
    json!({
        "is_clean": true,
        "current_branch": "feature/pipeline",
        "uncommitted_changes": [],
    })
}
