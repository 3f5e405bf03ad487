/// Sequential test-run state machine
///
/// The single authoritative simulator for workflow test runs. A run walks the
/// workflow's node list in insertion order, one node at a time: each node is
/// marked running, handed to the `NodeExecutor` for its outcome, and recorded
/// as success or error. Failure is fail-fast and non-recoverable: the first
/// error halts the run, leaves every later node pending, and finalizes the
/// run as failed. Connections are never consulted.

use crate::error::Error;
use crate::runtime::executor::{NodeExecutor, NodeOutcome};
use crate::workflow::storage::Storage;
use crate::workflow::types::{
    NewTestRun, ResultStatus, RunStatus, TestResult, TestRun, TestRunPatch, WorkflowNode,
};
use crate::workflow::Workflow;
use anyhow::Result;
use chrono::Utc;
use std::sync::Arc;

/// Coordinates test runs: creation, single-flight enforcement, and the
/// background advancement task
pub struct TestRunner {
    storage: Arc<dyn Storage>,
    executor: Arc<dyn NodeExecutor>,
}

impl TestRunner {
    /// Create a runner over the shared store and an executor implementation
    pub fn new(storage: Arc<dyn Storage>, executor: Arc<dyn NodeExecutor>) -> Self {
        Self { storage, executor }
    }

    /// Start a test run over the workflow's current node list
    ///
    /// Returns the freshly created run (status running, every result
    /// pending) and spawns the advancement task that mutates it to its
    /// terminal state. Fails without creating anything when the workflow has
    /// no nodes, or when a run for it is already in flight.
    pub async fn start_run(&self, workflow: &Workflow) -> Result<TestRun, Error> {
        if workflow.nodes.is_empty() {
            return Err(Error::Validation("workflow has no nodes to run".to_string()));
        }

        // Single-flight: one live run per workflow. Read-then-create is not
        // atomic, which is acceptable under the store's single-writer
        // assumption.
        let existing = self.storage.list_test_runs(&workflow.id).await?;
        if existing.iter().any(|run| run.status == RunStatus::Running) {
            return Err(Error::Conflict(format!(
                "a test run is already in progress for workflow '{}'",
                workflow.id
            )));
        }

        let run = self
            .storage
            .create_test_run(NewTestRun::pending_for(workflow))
            .await?;

        tracing::info!(
            "🧪 Started test run {} over {} nodes of workflow '{}'",
            run.id,
            workflow.nodes.len(),
            workflow.id
        );

        let storage = Arc::clone(&self.storage);
        let executor = Arc::clone(&self.executor);
        let run_id = run.id.clone();
        let nodes = workflow.nodes.clone();
        tokio::spawn(async move {
            if let Err(err) = advance(storage, executor, &run_id, &nodes).await {
                tracing::error!("❌ Test run {} aborted: {:#}", run_id, err);
            }
        });

        Ok(run)
    }
}

/// Advance a run through its nodes until terminal
///
/// At every node boundary the stored run is revalidated: if it was deleted
/// or finalized externally, advancement stops there; cancellation happens
/// between steps, never mid-step.
async fn advance(
    storage: Arc<dyn Storage>,
    executor: Arc<dyn NodeExecutor>,
    run_id: &str,
    nodes: &[WorkflowNode],
) -> Result<()> {
    let mut results: Vec<TestResult> = nodes
        .iter()
        .map(|node| TestResult::pending(&node.id))
        .collect();

    for (index, node) in nodes.iter().enumerate() {
        match storage.get_test_run(run_id).await? {
            Some(run) if run.status == RunStatus::Running => {}
            Some(_) => {
                tracing::info!(
                    "⏸️ Test run {} was finalized externally, halting before node '{}'",
                    run_id,
                    node.id
                );
                return Ok(());
            }
            None => {
                tracing::info!("⏸️ Test run {} no longer exists, halting", run_id);
                return Ok(());
            }
        }

        // Observers polling the run see this intermediate state.
        results[index].status = ResultStatus::Running;
        storage
            .update_test_run(
                run_id,
                TestRunPatch {
                    results: Some(results.clone()),
                    ..Default::default()
                },
            )
            .await?;
        tracing::debug!(
            "📍 Step {}/{}: executing node '{}' ({})",
            index + 1,
            nodes.len(),
            node.id,
            node.name
        );

        match executor.execute(node).await {
            NodeOutcome::Success { output, duration_ms } => {
                let result = &mut results[index];
                result.status = ResultStatus::Success;
                result.output = Some(output);
                result.duration = Some(duration_ms);

                storage
                    .update_test_run(
                        run_id,
                        TestRunPatch {
                            results: Some(results.clone()),
                            ..Default::default()
                        },
                    )
                    .await?;
                tracing::debug!("✅ Node '{}' succeeded in {}ms", node.id, duration_ms);
            }
            NodeOutcome::Failure { message, duration_ms } => {
                let result = &mut results[index];
                result.status = ResultStatus::Error;
                result.error = Some(message);
                result.duration = Some(duration_ms);

                // Fail-fast: the failing result and the terminal run status
                // land in one update; later nodes stay pending.
                storage
                    .update_test_run(
                        run_id,
                        TestRunPatch {
                            status: Some(RunStatus::Failed),
                            results: Some(results.clone()),
                            completed_at: Some(Utc::now()),
                        },
                    )
                    .await?;
                tracing::info!("❌ Test run {} failed at node '{}'", run_id, node.id);
                return Ok(());
            }
        }
    }

    storage
        .update_test_run(
            run_id,
            TestRunPatch {
                status: Some(RunStatus::Completed),
                completed_at: Some(Utc::now()),
                ..Default::default()
            },
        )
        .await?;
    tracing::info!(
        "🎉 Test run {} completed: all {} nodes succeeded",
        run_id,
        nodes.len()
    );
    Ok(())
}
