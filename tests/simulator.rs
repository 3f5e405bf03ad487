//! Integration tests for the test-run state machine.
//!
//! Deterministic cases use `MockExecutor`, so outcomes are scripted and
//! instant. The randomized `SimulatedExecutor` path runs under tokio's paused
//! clock, so its pacing windows cost no wall-clock time.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use flowcanvas::error::Error;
use flowcanvas::runtime::{MockExecutor, NodeExecutor, SimulatedExecutor, TestRunner};
use flowcanvas::workflow::{
    builtin_templates, InsertWorkflow, MemoryStorage, Position, ResultStatus, RunStatus, Storage,
    TestRun, TestRunPatch, Workflow, WorkflowStatus,
};

/// Build a workflow with `node_count` template nodes chained linearly.
fn linear_workflow(node_count: usize) -> Workflow {
    let templates = builtin_templates();
    let mut workflow = Workflow::from_insert(InsertWorkflow {
        name: "Test Workflow".to_string(),
        description: String::new(),
        nodes: Vec::new(),
        connections: Vec::new(),
        status: WorkflowStatus::Draft,
    });

    let mut previous: Option<String> = None;
    for i in 0..node_count {
        let template = &templates[i % templates.len()];
        let id = workflow
            .add_node(template, Position { x: 120.0 * i as f64, y: 200.0 })
            .id
            .clone();
        if let Some(prev) = previous {
            workflow.add_connection(&prev, &id).unwrap();
        }
        previous = Some(id);
    }

    workflow
}

fn runner_with(
    storage: &Arc<MemoryStorage>,
    executor: Arc<dyn NodeExecutor>,
) -> TestRunner {
    TestRunner::new(storage.clone() as Arc<dyn Storage>, executor)
}

/// Poll the store until the run reaches a terminal state.
async fn wait_for_terminal(storage: &Arc<MemoryStorage>, run_id: &str) -> TestRun {
    for _ in 0..1000 {
        if let Some(run) = storage.get_test_run(run_id).await.unwrap() {
            if run.status.is_terminal() {
                return run;
            }
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("test run {run_id} never reached a terminal state");
}

#[tokio::test]
async fn empty_workflow_fails_validation_and_creates_no_run() {
    let storage = Arc::new(MemoryStorage::new());
    let runner = runner_with(&storage, Arc::new(MockExecutor::succeeding()));
    let workflow = linear_workflow(0);

    let err = runner.start_run(&workflow).await.unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert!(storage.list_test_runs(&workflow.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn fresh_run_has_one_pending_result_per_node_in_order() {
    let storage = Arc::new(MemoryStorage::new());
    let runner = runner_with(&storage, Arc::new(MockExecutor::succeeding()));
    let workflow = linear_workflow(4);

    let run = runner.start_run(&workflow).await.unwrap();
    assert!(run.id.starts_with("run-"));
    assert_eq!(run.workflow_id, workflow.id);
    assert_eq!(run.status, RunStatus::Running);
    assert!(run.completed_at.is_none());

    let expected: Vec<&str> = workflow.nodes.iter().map(|n| n.id.as_str()).collect();
    let actual: Vec<&str> = run.results.iter().map(|r| r.node_id.as_str()).collect();
    assert_eq!(actual, expected);
    assert!(run
        .results
        .iter()
        .all(|r| r.status == ResultStatus::Pending));
}

#[tokio::test]
async fn all_nodes_succeeding_completes_the_run() {
    let storage = Arc::new(MemoryStorage::new());
    let executor = Arc::new(MockExecutor::succeeding());
    let runner = runner_with(&storage, executor.clone());
    let workflow = linear_workflow(3);

    let run = runner.start_run(&workflow).await.unwrap();
    let finished = wait_for_terminal(&storage, &run.id).await;

    assert_eq!(finished.status, RunStatus::Completed);
    assert!(finished.completed_at.is_some());
    assert_eq!(finished.results.len(), 3);
    for result in &finished.results {
        assert_eq!(result.status, ResultStatus::Success);
        assert!(result.output.is_some());
        assert!(result.duration.is_some());
        assert!(result.error.is_none());
    }

    // Every node executed exactly once, in node-list order.
    let node_ids: Vec<String> = workflow.nodes.iter().map(|n| n.id.clone()).collect();
    assert_eq!(executor.executed_nodes(), node_ids);
}

#[tokio::test]
async fn first_failure_halts_the_run_and_leaves_later_nodes_pending() {
    let storage = Arc::new(MemoryStorage::new());
    let executor = Arc::new(MockExecutor::failing_at(1));
    let runner = runner_with(&storage, executor.clone());
    let workflow = linear_workflow(3);

    let run = runner.start_run(&workflow).await.unwrap();
    let finished = wait_for_terminal(&storage, &run.id).await;

    assert_eq!(finished.status, RunStatus::Failed);
    assert!(finished.completed_at.is_some());
    assert_eq!(finished.results.len(), 3);

    assert_eq!(finished.results[0].status, ResultStatus::Success);

    assert_eq!(finished.results[1].status, ResultStatus::Error);
    let message = finished.results[1].error.as_deref().unwrap();
    assert!(message.contains(&workflow.nodes[1].id));
    assert!(finished.results[1].duration.is_some());
    assert!(finished.results[1].output.is_none());

    // Fail-fast: the third node never left pending and was never executed.
    assert_eq!(finished.results[2].status, ResultStatus::Pending);
    assert_eq!(executor.call_count(), 2);
}

#[tokio::test]
async fn a_second_run_is_rejected_while_one_is_in_flight() {
    let storage = Arc::new(MemoryStorage::new());
    let runner = runner_with(&storage, Arc::new(MockExecutor::stalled()));
    let workflow = linear_workflow(2);

    let first = runner.start_run(&workflow).await.unwrap();
    assert_eq!(first.status, RunStatus::Running);

    let err = runner.start_run(&workflow).await.unwrap_err();
    assert!(matches!(err, Error::Conflict(_)));

    // The in-flight run is untouched by the rejected attempt.
    assert_eq!(storage.list_test_runs(&workflow.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn runs_accumulate_as_history_once_terminal() {
    let storage = Arc::new(MemoryStorage::new());
    let runner = runner_with(&storage, Arc::new(MockExecutor::succeeding()));
    let workflow = linear_workflow(2);

    let first = runner.start_run(&workflow).await.unwrap();
    wait_for_terminal(&storage, &first.id).await;

    let second = runner.start_run(&workflow).await.unwrap();
    wait_for_terminal(&storage, &second.id).await;

    let history = storage.list_test_runs(&workflow.id).await.unwrap();
    let ids: Vec<&str> = history.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec![first.id.as_str(), second.id.as_str()]);
}

#[tokio::test]
async fn externally_finalized_run_stops_advancing_at_the_node_boundary() {
    let storage = Arc::new(MemoryStorage::new());
    let executor = Arc::new(MockExecutor::succeeding());
    let runner = runner_with(&storage, executor.clone());
    let workflow = linear_workflow(3);

    let run = runner.start_run(&workflow).await.unwrap();

    // Finalize the run before the advancement task gets to its first step.
    storage
        .update_test_run(
            &run.id,
            TestRunPatch {
                status: Some(RunStatus::Failed),
                completed_at: Some(Utc::now()),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();

    // Give the advancement task time to observe the terminal state.
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(executor.call_count(), 0);
    let observed = storage.get_test_run(&run.id).await.unwrap().unwrap();
    assert_eq!(observed.status, RunStatus::Failed);
    assert!(observed
        .results
        .iter()
        .all(|r| r.status == ResultStatus::Pending));
}

#[tokio::test(start_paused = true)]
async fn sample_workflow_run_reaches_a_terminal_state_with_the_simulated_executor() {
    let storage = Arc::new(MemoryStorage::with_sample_workflow());
    let runner = runner_with(&storage, Arc::new(SimulatedExecutor::default()));
    let workflow = storage.get_workflow("wf-sample").await.unwrap().unwrap();

    let run = runner.start_run(&workflow).await.unwrap();
    assert_eq!(run.status, RunStatus::Running);
    assert_eq!(run.results.len(), 3);
    assert!(run.completed_at.is_none());

    let finished = wait_for_terminal(&storage, &run.id).await;
    assert_eq!(finished.results.len(), 3);
    assert!(finished.completed_at.is_some());

    // Whatever the random draws did, the run must have the fail-fast shape:
    // either everything succeeded, or a prefix of successes, one error, and
    // pending nodes after it.
    match finished
        .results
        .iter()
        .position(|r| r.status == ResultStatus::Error)
    {
        None => {
            assert_eq!(finished.status, RunStatus::Completed);
            assert!(finished
                .results
                .iter()
                .all(|r| r.status == ResultStatus::Success));
        }
        Some(failed_at) => {
            assert_eq!(finished.status, RunStatus::Failed);
            assert!(finished.results[..failed_at]
                .iter()
                .all(|r| r.status == ResultStatus::Success));
            assert!(finished.results[failed_at + 1..]
                .iter()
                .all(|r| r.status == ResultStatus::Pending));
        }
    }
}
