//! Dispatch and template-resolution behaviour over the public surface.

use super::helpers::{default_engine, engine_with, payload_for, task_at};
use atelier::prompt::domain::{InstructionSource, PromptCatalog};
use atelier::workflow::adapters::memory::InMemorySnapshotStore;
use atelier::workflow::domain::{Stage, SubState, TaskKey, WorkflowConfig};
use std::sync::Arc;

#[tokio::test(flavor = "multi_thread")]
async fn repeated_dispatch_returns_identical_text() {
    let engine = default_engine();
    let key = TaskKey::new("DISPATCH-1").expect("valid key");
    engine
        .register(task_at("DISPATCH-1", Stage::Testing, SubState::Dispatching))
        .await
        .expect("registration");

    let first = engine.dispatch(&key).expect("first dispatch");
    let second = engine.dispatch(&key).expect("second dispatch");
    assert_eq!(first, second);
    assert_eq!(first.source(), InstructionSource::Stage);
    assert!(first.text().contains("DISPATCH-1"));
}

#[tokio::test(flavor = "multi_thread")]
async fn gate_prompts_come_from_the_shared_templates() {
    let engine = default_engine();
    let key = TaskKey::new("DISPATCH-2").expect("valid key");
    engine
        .register(task_at("DISPATCH-2", Stage::Spec, SubState::Dispatching))
        .await
        .expect("registration");
    engine
        .submit_work(&key, &payload_for(Stage::Spec))
        .await
        .expect("submission");

    let instruction = engine.dispatch(&key).expect("dispatch at the AI gate");
    assert_eq!(instruction.source(), InstructionSource::Shared);
    assert!(instruction.text().contains("spec"));
    // The pending artifact is rendered into the review prompt.
    assert!(instruction.text().contains("covers the full surface"));
}

#[tokio::test(flavor = "multi_thread")]
async fn an_unregistered_combination_degrades_to_the_fallback() {
    let engine = engine_with(
        WorkflowConfig::default(),
        Arc::new(InMemorySnapshotStore::new()),
        PromptCatalog::empty(),
    );
    let key = TaskKey::new("FALLBACK-1").expect("valid key");
    engine
        .register(task_at("FALLBACK-1", Stage::Planning, SubState::Dispatching))
        .await
        .expect("registration");

    let before = engine.task(&key).expect("registered task");
    let instruction = engine.dispatch(&key).expect("fallback dispatch");
    assert!(instruction.is_fallback());
    assert!(instruction.text().contains("'planning'"));
    assert!(instruction.text().contains("'dispatching'"));

    // Fallback resolution is not a transition: no state change, no snapshot.
    let after = engine.task(&key).expect("registered task");
    assert_eq!(after, before);
    let trail = engine.audit_trail(&key).await.expect("audit trail");
    assert_eq!(trail.len(), 1);
}
