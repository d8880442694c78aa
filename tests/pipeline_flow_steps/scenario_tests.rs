//! End-to-end pipeline scenarios over the public surface.

use super::helpers::{
    default_engine, engine_with, git_status_payload, payload_for, task_at,
};
use atelier::prompt::domain::PromptCatalog;
use atelier::workflow::adapters::memory::InMemorySnapshotStore;
use atelier::workflow::domain::{
    ReviewerKind, Stage, StagePosition, StageToggle, SubState, TaskKey, WorkflowConfig,
};
use atelier::workflow::services::WorkflowError;
use std::sync::Arc;

/// Asserts the task holds an accepted artifact for every pipeline stage.
///
/// # Errors
///
/// Returns an error naming the first stage without an accepted artifact.
fn assert_all_stages_accepted(
    task: &atelier::workflow::domain::WorkTask,
) -> Result<(), eyre::Report> {
    for stage in Stage::ORDER {
        eyre::ensure!(
            task.artifacts().contains_key(&stage),
            "missing accepted artifact for {stage}"
        );
    }
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn a_task_walks_the_whole_pipeline_through_both_gates() -> Result<(), eyre::Report> {
    let engine = default_engine();
    let key = TaskKey::new("WALK-1").expect("valid key");
    engine
        .register(task_at("WALK-1", Stage::Requirements, SubState::Dispatching))
        .await
        .expect("registration");

    let mut transitions = 1u64;
    loop {
        let position = engine.position(&key).expect("registered task");
        if engine.is_complete(&key).expect("registered task") {
            break;
        }
        match position.sub_state {
            SubState::Preliminary => {
                engine
                    .submit_work(&key, &git_status_payload())
                    .await
                    .expect("preliminary submission");
            }
            SubState::Dispatching => {
                engine
                    .submit_work(&key, &payload_for(position.stage))
                    .await
                    .expect("submission");
            }
            SubState::AwaitingAiReview => {
                engine
                    .provide_review(&key, ReviewerKind::Ai, true, None)
                    .await
                    .expect("AI approval");
            }
            SubState::AwaitingHumanReview => {
                engine
                    .provide_review(&key, ReviewerKind::Human, true, None)
                    .await
                    .expect("human approval");
            }
            SubState::Accepted => panic!("accepted but not complete at {position}"),
        }
        transitions += 1;
    }

    // 8 stages of submit + AI + human, plus the implementation preliminary
    // check, plus the registration snapshot.
    assert_eq!(transitions, 26);
    assert_eq!(
        engine.position(&key).expect("registered task"),
        StagePosition::new(Stage::Finalize, SubState::Accepted)
    );

    let task = engine.task(&key).expect("registered task");
    assert_all_stages_accepted(&task)?;

    let trail = engine.audit_trail(&key).await.expect("audit trail");
    assert_eq!(trail.len() as u64, transitions);
    for (index, snapshot) in trail.iter().enumerate() {
        assert_eq!(snapshot.sequence.value(), index as u64 + 1);
    }
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn implementation_review_chain_lands_on_the_next_enabled_stage() {
    // Scenario A, review stage enabled.
    let engine = default_engine();
    let key = TaskKey::new("SCEN-A").expect("valid key");
    engine
        .register(task_at("SCEN-A", Stage::Implementation, SubState::Dispatching))
        .await
        .expect("registration");

    let submitted = engine
        .submit_work(&key, &payload_for(Stage::Implementation))
        .await
        .expect("submission");
    assert_eq!(submitted.position.sub_state, SubState::AwaitingAiReview);

    let ai = engine
        .provide_review(&key, ReviewerKind::Ai, true, None)
        .await
        .expect("AI approval");
    assert_eq!(ai.position.sub_state, SubState::AwaitingHumanReview);

    let human = engine
        .provide_review(&key, ReviewerKind::Human, true, None)
        .await
        .expect("human approval");
    assert_eq!(
        human.position,
        StagePosition::new(Stage::Review, SubState::Dispatching)
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn implementation_review_chain_skips_a_disabled_review_stage() {
    // Scenario A, review stage disabled.
    let config = WorkflowConfig::default().with_stages([
        StageToggle::new(Stage::Implementation, true),
        StageToggle::new(Stage::Review, false),
        StageToggle::new(Stage::Testing, true),
        StageToggle::new(Stage::Finalize, true),
    ]);
    let engine = engine_with(
        config,
        Arc::new(InMemorySnapshotStore::new()),
        PromptCatalog::standard(),
    );
    let key = TaskKey::new("SCEN-A2").expect("valid key");
    engine
        .register(task_at("SCEN-A2", Stage::Implementation, SubState::Dispatching))
        .await
        .expect("registration");

    engine
        .submit_work(&key, &payload_for(Stage::Implementation))
        .await
        .expect("submission");
    engine
        .provide_review(&key, ReviewerKind::Ai, true, None)
        .await
        .expect("AI approval");
    let human = engine
        .provide_review(&key, ReviewerKind::Human, true, None)
        .await
        .expect("human approval");
    assert_eq!(
        human.position,
        StagePosition::new(Stage::Testing, SubState::Dispatching)
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn disabled_ai_review_never_visits_the_ai_gate() {
    // Scenario D.
    let engine = engine_with(
        WorkflowConfig::default().without_ai_review(),
        Arc::new(InMemorySnapshotStore::new()),
        PromptCatalog::standard(),
    );
    let key = TaskKey::new("SCEN-D").expect("valid key");
    engine
        .register(task_at("SCEN-D", Stage::Spec, SubState::Dispatching))
        .await
        .expect("registration");

    let outcome = engine
        .submit_work(&key, &payload_for(Stage::Spec))
        .await
        .expect("submission");
    assert_eq!(outcome.position.sub_state, SubState::AwaitingHumanReview);

    // The AI gate does not exist in this chain.
    let result = engine.provide_review(&key, ReviewerKind::Ai, true, None).await;
    assert!(matches!(result, Err(WorkflowError::InvalidTransition(_))));
}

#[tokio::test(flavor = "multi_thread")]
async fn rejection_feedback_reaches_the_next_dispatch() {
    let engine = default_engine();
    let key = TaskKey::new("REJ-1").expect("valid key");
    engine
        .register(task_at("REJ-1", Stage::Spec, SubState::Dispatching))
        .await
        .expect("registration");

    engine
        .submit_work(&key, &payload_for(Stage::Spec))
        .await
        .expect("submission");
    engine
        .provide_review(
            &key,
            ReviewerKind::Ai,
            false,
            Some("the error cases are missing".to_owned()),
        )
        .await
        .expect("rejection");

    let instruction = engine.dispatch(&key).expect("dispatch");
    assert!(!instruction.is_fallback());
    assert!(instruction.text().contains("the error cases are missing"));
}
