//! Intake flows: local task files, tracker start hooks, and admission.

use super::helpers::default_engine;
use atelier::intake::adapters::{InMemoryTaskSource, LocalDirTaskSource};
use atelier::intake::domain::TaskSeed;
use atelier::intake::services::{IntakeError, TaskIntakeService};
use atelier::workflow::domain::{
    PipelinePlan, Stage, SubState, TaskKey, TaskSourceKind, WorkTask,
};
use atelier::workflow::ports::tracker::{IssueTracker, NoopTracker, TrackerResult};
use async_trait::async_trait;
use mockable::DefaultClock;
use std::sync::{Arc, Mutex};

#[tokio::test(flavor = "multi_thread")]
async fn a_local_task_file_reaches_the_engine_and_dispatches() {
    let tmp = tempfile::tempdir().expect("temp dir");
    std::fs::write(
        tmp.path().join("TASK-31.json"),
        r#"{
            "task_id": "TASK-31",
            "title": "Load me from disk",
            "description": "A locally sourced task",
            "acceptance_criteria": ["loads", "dispatches"]
        }"#,
    )
    .expect("write task file");

    let config = atelier::workflow::domain::WorkflowConfig::default();
    let path = tmp.path().to_str().expect("UTF-8 temp path");
    let source = LocalDirTaskSource::open_ambient(path, config.task_file_pattern)
        .expect("source should open");
    let intake: TaskIntakeService<LocalDirTaskSource, NoopTracker, DefaultClock> =
        TaskIntakeService::new(Arc::new(source), None, Arc::new(DefaultClock));

    let key = TaskKey::new("TASK-31").expect("valid key");
    let plan = PipelinePlan::all_enabled();
    let task = intake.fetch(&key, &plan).await.expect("fetch");
    assert_eq!(task.position().stage, Stage::Requirements);
    assert_eq!(task.position().sub_state, SubState::Dispatching);
    assert_eq!(task.origin().source, TaskSourceKind::LocalFile);
    assert_eq!(task.origin().reference.as_deref(), Some("TASK-31.json"));

    let engine = default_engine();
    engine.register(task).await.expect("registration");
    let instruction = engine.dispatch(&key).expect("dispatch");
    assert!(instruction.text().contains("TASK-31"));
    assert!(instruction.text().contains("Load me from disk"));
}

/// Tracker double recording which tasks were started.
#[derive(Debug, Default)]
struct RecordingTracker {
    started: Mutex<Vec<TaskKey>>,
}

#[async_trait]
impl IssueTracker for RecordingTracker {
    async fn pipeline_started(&self, task: &WorkTask) -> TrackerResult<()> {
        self.started
            .lock()
            .map_err(|err| {
                atelier::workflow::ports::TrackerError::transport(std::io::Error::other(
                    err.to_string(),
                ))
            })?
            .push(task.key().clone());
        Ok(())
    }

    async fn pipeline_completed(&self, _task: &WorkTask) -> TrackerResult<()> {
        Ok(())
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn fetching_fires_the_transition_on_start_hook() {
    let source = InMemoryTaskSource::new();
    let key = TaskKey::new("TASK-32").expect("valid key");
    source
        .insert(TaskSeed::new(key.clone(), "Tracked task", TaskSourceKind::Linear))
        .expect("insert");

    let tracker = Arc::new(RecordingTracker::default());
    let intake = TaskIntakeService::new(
        Arc::new(source),
        Some(Arc::clone(&tracker)),
        Arc::new(DefaultClock),
    );

    intake
        .fetch(&key, &PipelinePlan::all_enabled())
        .await
        .expect("fetch");
    let started = tracker.started.lock().expect("unpoisoned lock");
    assert_eq!(started.as_slice(), &[key]);
}

#[tokio::test(flavor = "multi_thread")]
async fn a_seed_without_a_task_is_not_found() {
    let source = InMemoryTaskSource::new();
    let intake: TaskIntakeService<InMemoryTaskSource, NoopTracker, DefaultClock> =
        TaskIntakeService::new(Arc::new(source), None, Arc::new(DefaultClock));
    let key = TaskKey::new("TASK-404").expect("valid key");
    let result = intake.fetch(&key, &PipelinePlan::all_enabled()).await;
    assert!(matches!(result, Err(IntakeError::NotFound(_))));
}
