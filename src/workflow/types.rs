/// Core workflow type definitions
///
/// Defines the structures for workflows, canvas nodes, connections, and
/// simulated test runs. These types are serialized/deserialized from JSON both
/// on the wire (camelCase, matching the canvas client) and in persistence.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use uuid::Uuid;

/// Behavioral class of a node on the canvas
///
/// Triggers start a workflow, actions and logic transform it, end nodes
/// terminate it. The simulator treats all of them identically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    Trigger,
    Action,
    Logic,
    End,
}

/// Palette grouping for the node library
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeCategory {
    Triggers,
    Integrations,
    Data,
    Logic,
    Ai,
    Output,
}

/// Canvas coordinates of a node
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// A single configuration value on a node
///
/// Node config is a flat map of strings, numbers, booleans, and string lists.
/// Anything richer is out of scope for the canvas config panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Text(String),
    Number(serde_json::Number),
    Flag(bool),
    List(Vec<String>),
}

/// Node configuration map
///
/// A BTreeMap keeps serialization order stable, so reading the same workflow
/// twice yields byte-identical JSON.
pub type NodeConfig = BTreeMap<String, ConfigValue>;

/// A unit of work placed on the workflow canvas
///
/// Identity is `id`, unique within one workflow. The order of nodes inside
/// `Workflow::nodes` is insertion order; the test simulator reinterprets that
/// order as execution order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowNode {
    /// Unique node identifier within the workflow (e.g. "node-...")
    pub id: String,
    /// Behavioral class of the node
    #[serde(rename = "type")]
    pub node_type: NodeType,
    /// Palette grouping the node came from
    pub category: NodeCategory,
    /// Human-readable node name shown on the canvas
    pub name: String,
    /// Icon identifier rendered by the client
    pub icon: String,
    /// Short description shown in the node library and tooltips
    pub description: String,
    /// Canvas coordinates
    pub position: Position,
    /// Node-specific configuration values
    pub config: NodeConfig,
}

/// Source port of a connection, always the node's output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SourcePort {
    #[default]
    #[serde(rename = "output")]
    Output,
}

/// Target port of a connection, always the node's input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TargetPort {
    #[default]
    #[serde(rename = "input")]
    Input,
}

/// A directed visual edge between two nodes' ports
///
/// Connections are rendering data only: the simulator never traverses them,
/// so duplicate edges, reverse edges, and cycles are all tolerated. The one
/// structural rule is that a connection may not loop a node onto itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub id: String,
    /// Node the connection leaves from
    pub source_id: String,
    /// Node the connection arrives at
    pub target_id: String,
    pub source_port: SourcePort,
    pub target_port: TargetPort,
}

/// Lifecycle status of a workflow definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkflowStatus {
    #[default]
    Draft,
    Active,
    Paused,
}

/// A complete workflow definition: a named graph of nodes and connections
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
    /// Unique workflow identifier (e.g. "wf-...")
    pub id: String,
    pub name: String,
    pub description: String,
    /// Nodes in insertion order, which is the order the simulator executes them in
    pub nodes: Vec<WorkflowNode>,
    /// Visual edges between nodes
    pub connections: Vec<Connection>,
    pub status: WorkflowStatus,
}

/// Payload for creating a workflow
///
/// Only `name` is required; everything else defaults to an empty draft.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsertWorkflow {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub nodes: Vec<WorkflowNode>,
    #[serde(default)]
    pub connections: Vec<Connection>,
    #[serde(default)]
    pub status: WorkflowStatus,
}

/// Partial workflow update; present fields replace wholesale
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkflowPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub nodes: Option<Vec<WorkflowNode>>,
    #[serde(default)]
    pub connections: Option<Vec<Connection>>,
    #[serde(default)]
    pub status: Option<WorkflowStatus>,
}

impl Workflow {
    /// Materialize a persisted workflow from an insert payload
    pub fn from_insert(insert: InsertWorkflow) -> Self {
        Self {
            id: new_workflow_id(),
            name: insert.name,
            description: insert.description,
            nodes: insert.nodes,
            connections: insert.connections,
            status: insert.status,
        }
    }

    /// Apply a partial update in place; the id never changes
    pub fn apply_patch(&mut self, patch: WorkflowPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(nodes) = patch.nodes {
            self.nodes = nodes;
        }
        if let Some(connections) = patch.connections {
            self.connections = connections;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
    }
}

/// Per-node status inside a test run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultStatus {
    Pending,
    Running,
    Success,
    Error,
}

/// Outcome record for one node within a test run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    /// Node this result belongs to
    pub node_id: String,
    pub status: ResultStatus,
    /// Placeholder output payload on success
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
    /// Failure message on error
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Reported execution time in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,
}

impl TestResult {
    /// Initial state: one pending result per node at run creation
    pub fn pending(node_id: impl Into<String>) -> Self {
        Self {
            node_id: node_id.into(),
            status: ResultStatus::Pending,
            output: None,
            error: None,
            duration: None,
        }
    }
}

/// Whole-run status of a simulated execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Running,
    Completed,
    Failed,
}

impl RunStatus {
    /// A run in a terminal state is never mutated again
    pub fn is_terminal(self) -> bool {
        matches!(self, RunStatus::Completed | RunStatus::Failed)
    }
}

/// One simulated execution attempt over a workflow's node list
///
/// Created with all results pending, mutated in place as the simulator
/// advances, immutable once `status` is terminal and `completed_at` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestRun {
    /// Unique run identifier (e.g. "run-...")
    pub id: String,
    /// Workflow this run was started against
    pub workflow_id: String,
    pub status: RunStatus,
    /// One result per node, in `workflow.nodes` order at creation time
    pub results: Vec<TestResult>,
    pub started_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

/// A test run minus its id, as handed to the store for creation
#[derive(Debug, Clone)]
pub struct NewTestRun {
    pub workflow_id: String,
    pub status: RunStatus,
    pub results: Vec<TestResult>,
    pub started_at: DateTime<Utc>,
}

impl NewTestRun {
    /// Fresh running state for a workflow: every node pending, clock started
    pub fn pending_for(workflow: &Workflow) -> Self {
        Self {
            workflow_id: workflow.id.clone(),
            status: RunStatus::Running,
            results: workflow
                .nodes
                .iter()
                .map(|node| TestResult::pending(&node.id))
                .collect(),
            started_at: Utc::now(),
        }
    }

    /// Attach a generated id, producing the persisted form
    pub fn into_run(self, id: String) -> TestRun {
        TestRun {
            id,
            workflow_id: self.workflow_id,
            status: self.status,
            results: self.results,
            started_at: self.started_at,
            completed_at: None,
        }
    }
}

/// Partial test-run update applied by the simulator as it advances
#[derive(Debug, Clone, Default)]
pub struct TestRunPatch {
    pub status: Option<RunStatus>,
    pub results: Option<Vec<TestResult>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl TestRun {
    /// Apply a partial update in place; the id never changes
    pub fn apply_patch(&mut self, patch: TestRunPatch) {
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(results) = patch.results {
            self.results = results;
        }
        if let Some(completed_at) = patch.completed_at {
            self.completed_at = Some(completed_at);
        }
    }
}

/// Generate a workflow id ("wf-" prefix + v4 UUID)
pub fn new_workflow_id() -> String {
    format!("wf-{}", Uuid::new_v4())
}

/// Generate a node id
pub fn new_node_id() -> String {
    format!("node-{}", Uuid::new_v4())
}

/// Generate a connection id
pub fn new_connection_id() -> String {
    format!("conn-{}", Uuid::new_v4())
}

/// Generate a test-run id
pub fn new_run_id() -> String {
    format!("run-{}", Uuid::new_v4())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_serializes_with_wire_field_names() {
        let node = WorkflowNode {
            id: "node-1".into(),
            node_type: NodeType::Trigger,
            category: NodeCategory::Triggers,
            name: "Webhook".into(),
            icon: "Webhook".into(),
            description: "Trigger on incoming webhook request".into(),
            position: Position { x: 100.0, y: 200.0 },
            config: NodeConfig::from([
                ("method".to_string(), ConfigValue::Text("POST".into())),
                ("url".to_string(), ConfigValue::Text(String::new())),
            ]),
        };

        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["type"], "trigger");
        assert_eq!(json["category"], "triggers");
        assert_eq!(json["position"]["x"], 100.0);
        assert_eq!(json["config"]["method"], "POST");
    }

    #[test]
    fn connection_ports_are_fixed_literals() {
        let conn = Connection {
            id: "conn-1".into(),
            source_id: "node-1".into(),
            target_id: "node-2".into(),
            source_port: SourcePort::Output,
            target_port: TargetPort::Input,
        };

        let json = serde_json::to_value(&conn).unwrap();
        assert_eq!(json["sourceId"], "node-1");
        assert_eq!(json["sourcePort"], "output");
        assert_eq!(json["targetPort"], "input");

        // Anything but the literal port names is rejected on the way in.
        let bad = serde_json::json!({
            "id": "conn-2",
            "sourceId": "node-1",
            "targetId": "node-2",
            "sourcePort": "input",
            "targetPort": "input",
        });
        assert!(serde_json::from_value::<Connection>(bad).is_err());
    }

    #[test]
    fn insert_workflow_defaults_everything_but_name() {
        let insert: InsertWorkflow =
            serde_json::from_value(serde_json::json!({ "name": "X" })).unwrap();
        assert_eq!(insert.name, "X");
        assert_eq!(insert.description, "");
        assert!(insert.nodes.is_empty());
        assert!(insert.connections.is_empty());
        assert_eq!(insert.status, WorkflowStatus::Draft);

        let missing = serde_json::from_value::<InsertWorkflow>(serde_json::json!({}));
        assert!(missing.is_err());
    }

    #[test]
    fn pending_results_are_not_serialized_with_empty_fields() {
        let result = TestResult::pending("node-1");
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["nodeId"], "node-1");
        assert_eq!(json["status"], "pending");
        assert!(json.get("output").is_none());
        assert!(json.get("error").is_none());
        assert!(json.get("duration").is_none());
    }

    #[test]
    fn patch_replaces_only_present_fields() {
        let mut workflow = Workflow::from_insert(InsertWorkflow {
            name: "Original".into(),
            description: "keep me".into(),
            nodes: Vec::new(),
            connections: Vec::new(),
            status: WorkflowStatus::Draft,
        });
        let id = workflow.id.clone();

        workflow.apply_patch(WorkflowPatch {
            name: Some("Renamed".into()),
            status: Some(WorkflowStatus::Active),
            ..Default::default()
        });

        assert_eq!(workflow.id, id);
        assert_eq!(workflow.name, "Renamed");
        assert_eq!(workflow.description, "keep me");
        assert_eq!(workflow.status, WorkflowStatus::Active);
    }
}
