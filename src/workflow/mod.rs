/// Workflow management layer
///
/// This module handles workflow definitions, canvas graph editing, and
/// persistence. It provides:
/// - Type definitions (Workflow, WorkflowNode, Connection, TestRun)
/// - Graph mutation helpers with cascade cleanup and self-loop rejection
/// - The built-in node template catalog
/// - The Storage seam with in-memory and SQLite backends

// Core workflow and test-run type definitions
pub mod types;

// Canvas graph mutation helpers and structural validation
pub mod graph;

// Built-in node template catalog
pub mod templates;

// Storage trait and SQLite persistence
pub mod storage;

// In-memory storage backend (default)
pub mod memory;

// Re-export commonly used types
pub use graph::NodeUpdate;
pub use memory::MemoryStorage;
pub use storage::{SqliteStorage, Storage};
pub use templates::{builtin_templates, NodeTemplate};
pub use types::{
    Connection, InsertWorkflow, NewTestRun, NodeCategory, NodeConfig, NodeType, Position,
    ResultStatus, RunStatus, TestResult, TestRun, TestRunPatch, Workflow, WorkflowNode,
    WorkflowPatch, WorkflowStatus,
};
