/// HTTP API layer
///
/// This module provides the REST API endpoints for the workflow builder.
/// It handles:
/// - Workflow CRUD operations and the node template catalog
/// - Test-run start and listing endpoints

// Workflow management endpoints (POST/GET/PATCH/DELETE)
pub mod workflows;

// Test-run endpoints
pub mod runs;

// Re-export router builders and shared state
pub use runs::create_run_routes;
pub use workflows::{create_workflow_routes, AppState};
