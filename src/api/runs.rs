/// Test-run REST API endpoints
///
/// Starting a run answers 201 immediately with the freshly created TestRun
/// (status running, every result pending); the canvas polls the listing
/// endpoint to watch results advance. A simulated node failure is workflow
/// feedback recorded on the run, never an API error.

use crate::api::workflows::AppState;
use crate::error::Error;
use crate::workflow::TestRun;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};

/// Create test-run routes
pub fn create_run_routes() -> Router<AppState> {
    Router::new()
        .route("/api/workflows/{id}/test", post(start_test_run))
        .route("/api/workflows/{id}/tests", get(list_test_runs))
}

/// Start a simulated test run over a workflow
///
/// POST /api/workflows/{id}/test
/// 404 when the workflow is unknown, 400 when it has no nodes, 409 when a
/// run for it is already in flight.
async fn start_test_run(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<TestRun>), Error> {
    let workflow = state
        .storage
        .get_workflow(&id)
        .await?
        .ok_or_else(|| Error::NotFound("Workflow not found".to_string()))?;

    let run = state.runner.start_run(&workflow).await?;
    Ok((StatusCode::CREATED, Json(run)))
}

/// List the test runs recorded for a workflow, oldest first
///
/// GET /api/workflows/{id}/tests
/// An unknown workflow simply lists as empty.
async fn list_test_runs(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<TestRun>>, Error> {
    let runs = state.storage.list_test_runs(&id).await?;
    Ok(Json(runs))
}
