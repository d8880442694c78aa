//! Crash-recovery and audit behaviour across engine restarts.

use super::helpers::{engine_with, payload_for, task_at};
use atelier::prompt::adapters::MiniJinjaRenderer;
use atelier::prompt::domain::PromptCatalog;
use atelier::prompt::services::PromptResolver;
use atelier::workflow::adapters::fs::DirSnapshotStore;
use atelier::workflow::adapters::memory::InMemorySnapshotStore;
use atelier::workflow::domain::{
    ReviewerKind, Stage, StagePosition, SubState, TaskKey, WorkflowConfig,
};
use atelier::workflow::ports::NoopTracker;
use atelier::workflow::services::{EngineParts, WorkflowEngine};
use mockable::DefaultClock;
use std::sync::Arc;

type DirEngine = WorkflowEngine<DirSnapshotStore, MiniJinjaRenderer, NoopTracker, DefaultClock>;

fn dir_engine(tmp: &tempfile::TempDir) -> DirEngine {
    let path = tmp.path().to_str().expect("UTF-8 temp path");
    WorkflowEngine::new(EngineParts {
        config: WorkflowConfig::default(),
        resolver: PromptResolver::new(
            PromptCatalog::standard(),
            Arc::new(MiniJinjaRenderer::new()),
        ),
        snapshots: Arc::new(DirSnapshotStore::open_ambient(path).expect("store should open")),
        tracker: None,
        clock: Arc::new(DefaultClock),
    })
    .expect("valid configuration")
}

#[tokio::test(flavor = "multi_thread")]
async fn a_restarted_process_resumes_mid_review_from_disk() {
    let tmp = tempfile::tempdir().expect("temp dir");
    let key = TaskKey::new("RECOVER-1").expect("valid key");

    let before = {
        let engine = dir_engine(&tmp);
        engine
            .register(task_at("RECOVER-1", Stage::Implementation, SubState::Dispatching))
            .await
            .expect("registration");
        engine
            .submit_work(&key, &payload_for(Stage::Implementation))
            .await
            .expect("submission");
        engine.dispatch(&key).expect("dispatch before the restart")
    };

    let engine = dir_engine(&tmp);
    let recovered = engine.recover(&key).await.expect("recovery");
    assert_eq!(
        recovered.position(),
        StagePosition::new(Stage::Implementation, SubState::AwaitingAiReview)
    );
    assert!(recovered.pending_artifact().is_some());

    let after = engine.dispatch(&key).expect("dispatch after the restart");
    assert_eq!(after, before);

    // The recovered task keeps moving through the gates.
    engine
        .provide_review(&key, ReviewerKind::Ai, true, None)
        .await
        .expect("AI approval");
    let outcome = engine
        .provide_review(&key, ReviewerKind::Human, true, None)
        .await
        .expect("human approval");
    assert_eq!(
        outcome.position,
        StagePosition::new(Stage::Review, SubState::Dispatching)
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn audit_history_preserves_every_intermediate_state() {
    let engine = engine_with(
        WorkflowConfig::default(),
        Arc::new(InMemorySnapshotStore::new()),
        PromptCatalog::standard(),
    );
    let key = TaskKey::new("AUDIT-1").expect("valid key");
    engine
        .register(task_at("AUDIT-1", Stage::Spec, SubState::Dispatching))
        .await
        .expect("registration");
    engine
        .submit_work(&key, &payload_for(Stage::Spec))
        .await
        .expect("submission");
    engine
        .provide_review(&key, ReviewerKind::Ai, false, Some("too thin".to_owned()))
        .await
        .expect("rejection");

    let trail = engine.audit_trail(&key).await.expect("audit trail");
    let sub_states: Vec<SubState> = trail
        .iter()
        .map(|snapshot| snapshot.state.position().sub_state)
        .collect();
    assert_eq!(
        sub_states,
        vec![
            SubState::Dispatching,
            SubState::AwaitingAiReview,
            SubState::Dispatching,
        ]
    );
    let last = trail.last().expect("three snapshots");
    assert_eq!(last.state.feedback_for(Stage::Spec), Some("too thin"));
}

#[tokio::test(flavor = "multi_thread")]
async fn cancellation_is_visible_after_recovery() {
    let tmp = tempfile::tempdir().expect("temp dir");
    let key = TaskKey::new("CANCEL-1").expect("valid key");

    {
        let engine = dir_engine(&tmp);
        engine
            .register(task_at("CANCEL-1", Stage::Spec, SubState::Dispatching))
            .await
            .expect("registration");
        engine.cancel(&key).await.expect("cancellation");
    }

    let engine = dir_engine(&tmp);
    let recovered = engine.recover(&key).await.expect("recovery");
    assert!(!recovered.is_active());
}
