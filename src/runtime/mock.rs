/// `MockExecutor`, a test double for `NodeExecutor`
///
/// Lets tests script deterministic outcomes instead of depending on the
/// randomized simulation. Records every node it is asked to execute.

use crate::runtime::executor::{NodeExecutor, NodeOutcome};
use crate::workflow::types::WorkflowNode;
use async_trait::async_trait;
use serde_json::json;
use std::sync::Mutex;

/// Behaviour injected into `MockExecutor` at construction time
#[derive(Debug, Clone)]
pub enum MockBehaviour {
    /// Every node succeeds
    AlwaysSucceed,
    /// Nodes succeed until the zero-based call index, which fails
    FailAt(usize),
    /// Never resolve; the run stays in flight until dropped
    Stall,
}

/// A mock executor that records every call and follows a scripted behaviour
pub struct MockExecutor {
    behaviour: MockBehaviour,
    /// Node ids seen by this executor, in call order
    calls: Mutex<Vec<String>>,
}

impl MockExecutor {
    /// Create a mock where every node succeeds
    pub fn succeeding() -> Self {
        Self::with_behaviour(MockBehaviour::AlwaysSucceed)
    }

    /// Create a mock that fails the node at the given zero-based call index
    pub fn failing_at(index: usize) -> Self {
        Self::with_behaviour(MockBehaviour::FailAt(index))
    }

    /// Create a mock whose execute never resolves
    pub fn stalled() -> Self {
        Self::with_behaviour(MockBehaviour::Stall)
    }

    fn with_behaviour(behaviour: MockBehaviour) -> Self {
        Self {
            behaviour,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Number of nodes this executor has been asked to run
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Node ids executed so far, in call order
    pub fn executed_nodes(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl NodeExecutor for MockExecutor {
    async fn execute(&self, node: &WorkflowNode) -> NodeOutcome {
        let call_index = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(node.id.clone());
            calls.len() - 1
        };

        match self.behaviour {
            MockBehaviour::AlwaysSucceed => NodeOutcome::Success {
                output: json!({ "node": node.id, "call": call_index }),
                duration_ms: 5,
            },
            MockBehaviour::FailAt(index) if index == call_index => NodeOutcome::Failure {
                message: format!("mock failure at node '{}'", node.id),
                duration_ms: 5,
            },
            MockBehaviour::FailAt(_) => NodeOutcome::Success {
                output: json!({ "node": node.id, "call": call_index }),
                duration_ms: 5,
            },
            MockBehaviour::Stall => std::future::pending().await,
        }
    }
}
