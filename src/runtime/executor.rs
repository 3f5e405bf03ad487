/// Per-node outcome decision
///
/// The `NodeExecutor` trait isolates the question "what happened when this
/// node ran?" from the sequencing and halting logic in the simulator. The
/// default implementation is an explicit simulation with randomized outcomes;
/// a real executor (HTTP calls, AI inference, ...) can be substituted later
/// without touching the state machine.

use crate::workflow::types::WorkflowNode;
use async_trait::async_trait;
use rand::Rng;
use serde_json::{json, Value};
use std::ops::RangeInclusive;
use std::time::Duration;

/// What a node's execution produced
#[derive(Debug, Clone, PartialEq)]
pub enum NodeOutcome {
    /// The node ran to completion
    Success {
        /// Opaque output payload recorded on the test result
        output: Value,
        /// Reported execution time in milliseconds
        duration_ms: u64,
    },
    /// The node failed; the simulator halts the run here
    Failure {
        /// Failure message recorded on the test result
        message: String,
        /// Reported execution time in milliseconds
        duration_ms: u64,
    },
}

/// Capability interface for executing one node
#[async_trait]
pub trait NodeExecutor: Send + Sync {
    /// Run a single node and report its outcome
    ///
    /// Implementations own their pacing: the simulator awaits this call
    /// before touching the next node.
    async fn execute(&self, node: &WorkflowNode) -> NodeOutcome;
}

/// Randomized simulation of node execution
///
/// Does not interpret node semantics at all. Each call pauses for a random
/// pacing window (so observers can watch the run advance), then draws a
/// Bernoulli outcome with 0.8 success probability and a made-up duration.
#[derive(Debug, Clone)]
pub struct SimulatedExecutor {
    /// Probability of a node failing (success iff the draw exceeds this)
    failure_rate: f64,
    /// Wall-clock pause before the outcome is decided, milliseconds
    pacing_ms: RangeInclusive<u64>,
    /// Window for the fabricated per-node duration, milliseconds
    duration_ms: RangeInclusive<u64>,
}

impl Default for SimulatedExecutor {
    fn default() -> Self {
        Self {
            failure_rate: 0.2,
            pacing_ms: 400..=1200,
            duration_ms: 100..=600,
        }
    }
}

#[async_trait]
impl NodeExecutor for SimulatedExecutor {
    async fn execute(&self, node: &WorkflowNode) -> NodeOutcome {
        // ThreadRng is not Send, so keep each borrow scoped between awaits.
        let pacing = {
            let mut rng = rand::rng();
            rng.random_range(self.pacing_ms.clone())
        };
        tokio::time::sleep(Duration::from_millis(pacing)).await;

        let (success, duration_ms) = {
            let mut rng = rand::rng();
            (
                rng.random::<f64>() > self.failure_rate,
                rng.random_range(self.duration_ms.clone()),
            )
        };

        if success {
            NodeOutcome::Success {
                output: json!({ "data": "Sample output data" }),
                duration_ms,
            }
        } else {
            NodeOutcome::Failure {
                message: format!("Node '{}' encountered a simulated error", node.name),
                duration_ms,
            }
        }
    }
}
