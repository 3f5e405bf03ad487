/// Canvas graph mutation helpers
///
/// Node and connection editing operations over a workflow definition, plus the
/// structural validation shared with the REST layer. The graph is deliberately
/// permissive: it may be disconnected, cyclic, or contain orphan branches,
/// because the test simulator never traverses connections. The two hard rules
/// are cascade cleanup on node removal and no self-loop connections.

use crate::error::Error;
use crate::workflow::templates::NodeTemplate;
use crate::workflow::types::{
    new_connection_id, new_node_id, Connection, InsertWorkflow, NodeConfig, Position, SourcePort,
    TargetPort, Workflow, WorkflowNode, WorkflowPatch,
};

/// Partial node update; present fields replace the node's current values
#[derive(Debug, Clone, Default)]
pub struct NodeUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub position: Option<Position>,
    pub config: Option<NodeConfig>,
}

impl Workflow {
    /// Instantiate a node from a template and append it to the canvas
    ///
    /// The node gets a fresh id and a copy of the template's default config.
    pub fn add_node(&mut self, template: &NodeTemplate, position: Position) -> &WorkflowNode {
        let node = WorkflowNode {
            id: new_node_id(),
            node_type: template.node_type,
            category: template.category,
            name: template.name.to_string(),
            icon: template.icon.to_string(),
            description: template.description.to_string(),
            position,
            config: template.default_config.clone(),
        };
        self.nodes.push(node);
        self.nodes.last().expect("node was just pushed")
    }

    /// Apply a partial update to a node; false when the id is unknown
    pub fn update_node(&mut self, node_id: &str, update: NodeUpdate) -> bool {
        let Some(node) = self.nodes.iter_mut().find(|n| n.id == node_id) else {
            return false;
        };

        if let Some(name) = update.name {
            node.name = name;
        }
        if let Some(description) = update.description {
            node.description = description;
        }
        if let Some(position) = update.position {
            node.position = position;
        }
        if let Some(config) = update.config {
            node.config = config;
        }
        true
    }

    /// Remove a node and every connection touching it
    ///
    /// Cascade cleanup keeps the invariant that no connection ever references
    /// a missing node. Returns false when the id is unknown.
    pub fn remove_node(&mut self, node_id: &str) -> bool {
        let before = self.nodes.len();
        self.nodes.retain(|n| n.id != node_id);
        if self.nodes.len() == before {
            return false;
        }

        self.connections
            .retain(|c| c.source_id != node_id && c.target_id != node_id);
        true
    }

    /// Connect two nodes, output port to input port
    ///
    /// Self-loops are rejected. Duplicate connections, reverse edges, and
    /// cycles are all allowed, since connections are visual only.
    pub fn add_connection(&mut self, source_id: &str, target_id: &str) -> Result<&Connection, Error> {
        if source_id == target_id {
            return Err(Error::Validation(
                "a connection cannot target its own source node".to_string(),
            ));
        }
        for endpoint in [source_id, target_id] {
            if !self.nodes.iter().any(|n| n.id == endpoint) {
                return Err(Error::Validation(format!(
                    "connection references unknown node '{endpoint}'"
                )));
            }
        }

        self.connections.push(Connection {
            id: new_connection_id(),
            source_id: source_id.to_string(),
            target_id: target_id.to_string(),
            source_port: SourcePort::Output,
            target_port: TargetPort::Input,
        });
        Ok(self.connections.last().expect("connection was just pushed"))
    }

    /// Remove a connection by id; false when the id is unknown
    pub fn remove_connection(&mut self, connection_id: &str) -> bool {
        let before = self.connections.len();
        self.connections.retain(|c| c.id != connection_id);
        self.connections.len() != before
    }
}

/// Reject connection lists containing self-loops
fn ensure_no_self_loops(connections: &[Connection]) -> Result<(), Error> {
    if let Some(conn) = connections.iter().find(|c| c.source_id == c.target_id) {
        return Err(Error::Validation(format!(
            "connection '{}' cannot target its own source node",
            conn.id
        )));
    }
    Ok(())
}

impl InsertWorkflow {
    /// Structural validation of a create payload, before any mutation
    pub fn validate(&self) -> Result<(), Error> {
        if self.name.trim().is_empty() {
            return Err(Error::Validation("Workflow name is required".to_string()));
        }
        ensure_no_self_loops(&self.connections)
    }
}

impl WorkflowPatch {
    /// Structural validation of an update payload, before any mutation
    pub fn validate(&self) -> Result<(), Error> {
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(Error::Validation("Workflow name is required".to_string()));
            }
        }
        if let Some(connections) = &self.connections {
            ensure_no_self_loops(connections)?;
        }
        Ok(())
    }
}
