/// In-memory storage backend
///
/// The default, test-friendly `Storage` implementation: plain maps behind
/// RwLocks, insertion order preserved for listings. State lives and dies with
/// the process; durable deployments switch to the SQLite backend through
/// configuration. Ships with the sample workflow the canvas opens on first
/// launch.

use crate::workflow::storage::Storage;
use crate::workflow::types::{
    new_run_id, ConfigValue, Connection, InsertWorkflow, NewTestRun, NodeCategory, NodeConfig,
    NodeType, Position, SourcePort, TargetPort, TestRun, TestRunPatch, Workflow, WorkflowNode,
    WorkflowPatch, WorkflowStatus,
};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// A map that remembers insertion order for listings
#[derive(Debug)]
struct OrderedMap<T> {
    entries: HashMap<String, T>,
    order: Vec<String>,
}

impl<T> Default for OrderedMap<T> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            order: Vec::new(),
        }
    }
}

impl<T: Clone> OrderedMap<T> {
    fn insert(&mut self, id: String, value: T) {
        if self.entries.insert(id.clone(), value).is_none() {
            self.order.push(id);
        }
    }

    fn get(&self, id: &str) -> Option<T> {
        self.entries.get(id).cloned()
    }

    fn get_mut(&mut self, id: &str) -> Option<&mut T> {
        self.entries.get_mut(id)
    }

    fn remove(&mut self, id: &str) -> bool {
        if self.entries.remove(id).is_some() {
            self.order.retain(|existing| existing != id);
            true
        } else {
            false
        }
    }

    fn values(&self) -> Vec<T> {
        self.order
            .iter()
            .filter_map(|id| self.entries.get(id).cloned())
            .collect()
    }
}

/// Process-local workflow and test-run store
#[derive(Debug, Default)]
pub struct MemoryStorage {
    workflows: RwLock<OrderedMap<Workflow>>,
    test_runs: RwLock<OrderedMap<TestRun>>,
}

impl MemoryStorage {
    /// Empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with the sample email-agent workflow
    pub fn with_sample_workflow() -> Self {
        let storage = Self::new();
        let sample = sample_workflow();
        storage
            .workflows
            .try_write()
            .expect("no concurrent access during construction")
            .insert(sample.id.clone(), sample);
        storage
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn list_workflows(&self) -> Result<Vec<Workflow>> {
        Ok(self.workflows.read().await.values())
    }

    async fn get_workflow(&self, id: &str) -> Result<Option<Workflow>> {
        Ok(self.workflows.read().await.get(id))
    }

    async fn create_workflow(&self, insert: InsertWorkflow) -> Result<Workflow> {
        let workflow = Workflow::from_insert(insert);
        self.workflows
            .write()
            .await
            .insert(workflow.id.clone(), workflow.clone());
        Ok(workflow)
    }

    async fn update_workflow(&self, id: &str, patch: WorkflowPatch) -> Result<Option<Workflow>> {
        let mut workflows = self.workflows.write().await;
        let Some(workflow) = workflows.get_mut(id) else {
            return Ok(None);
        };

        workflow.apply_patch(patch);
        Ok(Some(workflow.clone()))
    }

    async fn delete_workflow(&self, id: &str) -> Result<bool> {
        // Historical test runs are retained on purpose.
        Ok(self.workflows.write().await.remove(id))
    }

    async fn list_test_runs(&self, workflow_id: &str) -> Result<Vec<TestRun>> {
        Ok(self
            .test_runs
            .read()
            .await
            .values()
            .into_iter()
            .filter(|run| run.workflow_id == workflow_id)
            .collect())
    }

    async fn get_test_run(&self, id: &str) -> Result<Option<TestRun>> {
        Ok(self.test_runs.read().await.get(id))
    }

    async fn create_test_run(&self, new_run: NewTestRun) -> Result<TestRun> {
        let run = new_run.into_run(new_run_id());
        self.test_runs
            .write()
            .await
            .insert(run.id.clone(), run.clone());
        Ok(run)
    }

    async fn update_test_run(&self, id: &str, patch: TestRunPatch) -> Result<Option<TestRun>> {
        let mut runs = self.test_runs.write().await;
        let Some(run) = runs.get_mut(id) else {
            return Ok(None);
        };

        run.apply_patch(patch);
        Ok(Some(run.clone()))
    }
}

/// The example workflow every fresh deployment starts with
fn sample_workflow() -> Workflow {
    Workflow {
        id: "wf-sample".to_string(),
        name: "Sample Email Agent".to_string(),
        description: "An example workflow that processes incoming emails".to_string(),
        nodes: vec![
            WorkflowNode {
                id: "node-1".to_string(),
                node_type: NodeType::Trigger,
                category: NodeCategory::Triggers,
                name: "Email Received".to_string(),
                icon: "Mail".to_string(),
                description: "Triggers when a new email arrives".to_string(),
                position: Position { x: 100.0, y: 200.0 },
                config: NodeConfig::from([(
                    "folder".to_string(),
                    ConfigValue::Text("inbox".to_string()),
                )]),
            },
            WorkflowNode {
                id: "node-2".to_string(),
                node_type: NodeType::Action,
                category: NodeCategory::Ai,
                name: "AI Classify".to_string(),
                icon: "Tags".to_string(),
                description: "Classify the email content".to_string(),
                position: Position { x: 420.0, y: 200.0 },
                config: NodeConfig::from([
                    (
                        "categories".to_string(),
                        ConfigValue::List(vec![
                            "urgent".to_string(),
                            "newsletter".to_string(),
                            "spam".to_string(),
                        ]),
                    ),
                    (
                        "inputPath".to_string(),
                        ConfigValue::Text("data.body".to_string()),
                    ),
                ]),
            },
            WorkflowNode {
                id: "node-3".to_string(),
                node_type: NodeType::Logic,
                category: NodeCategory::Logic,
                name: "Condition".to_string(),
                icon: "GitBranch".to_string(),
                description: "Route based on classification".to_string(),
                position: Position { x: 740.0, y: 200.0 },
                config: NodeConfig::from([(
                    "condition".to_string(),
                    ConfigValue::Text("classification === 'urgent'".to_string()),
                )]),
            },
        ],
        connections: vec![
            Connection {
                id: "conn-1".to_string(),
                source_id: "node-1".to_string(),
                target_id: "node-2".to_string(),
                source_port: SourcePort::Output,
                target_port: TargetPort::Input,
            },
            Connection {
                id: "conn-2".to_string(),
                source_id: "node-2".to_string(),
                target_id: "node-3".to_string(),
                source_port: SourcePort::Output,
                target_port: TargetPort::Input,
            },
        ],
        status: WorkflowStatus::Draft,
    }
}
