/// Workflow management REST API endpoints
///
/// Provides CRUD operations for workflow definitions plus the node template
/// catalog. Request bodies are decoded from raw JSON so schema violations
/// answer 400 with a readable message, and always before any mutation.

use crate::error::Error;
use crate::runtime::TestRunner;
use crate::workflow::{
    builtin_templates, InsertWorkflow, NodeTemplate, Storage, Workflow, WorkflowPatch,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{delete, get, patch, post},
    Router,
};
use serde_json::Value;
use std::sync::Arc;

/// Application state containing shared resources
#[derive(Clone)]
pub struct AppState {
    /// Storage seam for workflows and test runs
    pub storage: Arc<dyn Storage>,
    /// Test-run coordinator
    pub runner: Arc<TestRunner>,
}

/// Create workflow management routes
///
/// Sets up the REST API endpoints for workflow CRUD and the template catalog.
/// All endpoints use the shared application state for storage access.
pub fn create_workflow_routes() -> Router<AppState> {
    Router::new()
        .route("/api/workflows", get(list_workflows))
        .route("/api/workflows", post(create_workflow))
        .route("/api/workflows/{id}", get(get_workflow))
        .route("/api/workflows/{id}", patch(update_workflow))
        .route("/api/workflows/{id}", delete(delete_workflow))
        .route("/api/node-templates", get(list_node_templates))
}

/// List all workflows
///
/// GET /api/workflows
async fn list_workflows(State(state): State<AppState>) -> Result<Json<Vec<Workflow>>, Error> {
    let workflows = state.storage.list_workflows().await?;
    Ok(Json(workflows))
}

/// Get a specific workflow by ID
///
/// GET /api/workflows/{id}
async fn get_workflow(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Workflow>, Error> {
    let workflow = state
        .storage
        .get_workflow(&id)
        .await?
        .ok_or_else(|| Error::NotFound("Workflow not found".to_string()))?;
    Ok(Json(workflow))
}

/// Create a new workflow
///
/// POST /api/workflows
/// Body: { "name": "...", "description": "...", "nodes": [...], "connections": [...] }
/// Only the name is required; everything else defaults to an empty draft.
async fn create_workflow(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> Result<(StatusCode, Json<Workflow>), Error> {
    let insert: InsertWorkflow =
        serde_json::from_value(payload).map_err(|err| Error::Validation(err.to_string()))?;
    insert.validate()?;

    let workflow = state.storage.create_workflow(insert).await?;
    tracing::info!("🔥 Created workflow: {} ({})", workflow.id, workflow.name);

    Ok((StatusCode::CREATED, Json(workflow)))
}

/// Update an existing workflow
///
/// PATCH /api/workflows/{id}
/// Body: any subset of the insert payload; present fields replace wholesale.
async fn update_workflow(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<Value>,
) -> Result<Json<Workflow>, Error> {
    let patch: WorkflowPatch =
        serde_json::from_value(payload).map_err(|err| Error::Validation(err.to_string()))?;
    patch.validate()?;

    let workflow = state
        .storage
        .update_workflow(&id, patch)
        .await?
        .ok_or_else(|| Error::NotFound("Workflow not found".to_string()))?;
    tracing::info!("🔥 Updated workflow: {} ({})", workflow.id, workflow.name);

    Ok(Json(workflow))
}

/// Delete a workflow
///
/// DELETE /api/workflows/{id}
/// Historical test runs are kept.
async fn delete_workflow(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, Error> {
    if state.storage.delete_workflow(&id).await? {
        tracing::info!("🗑️ Deleted workflow: {}", id);
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(Error::NotFound("Workflow not found".to_string()))
    }
}

/// List the built-in node templates
///
/// GET /api/node-templates
async fn list_node_templates() -> Json<Vec<NodeTemplate>> {
    Json(builtin_templates())
}
