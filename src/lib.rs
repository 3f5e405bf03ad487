/// Flowcanvas: visual workflow builder backend
///
/// This library provides workflow CRUD over a canvas graph model and a
/// sequential fail-fast test-run simulator with a swappable per-node
/// execution seam.

// Core configuration and setup
pub mod config;

// Error taxonomy and HTTP mapping
pub mod error;

// Workflow management layer - definitions, graph editing, templates, storage
pub mod workflow;

// Runtime simulation layer - test-run state machine and node executor seam
pub mod runtime;

// HTTP API layer - REST endpoints for workflow management and test runs
pub mod api;

// Server setup and initialization
pub mod server;

// Re-export commonly used types for external consumers
pub use error::Error;
pub use runtime::{MockExecutor, NodeExecutor, NodeOutcome, SimulatedExecutor, TestRunner};
pub use server::start_server;
pub use workflow::{
    Connection, InsertWorkflow, MemoryStorage, NodeType, RunStatus, SqliteStorage, Storage,
    TestResult, TestRun, Workflow, WorkflowNode, WorkflowStatus,
};
