/// Error taxonomy and HTTP mapping
///
/// Three user-visible error classes (validation, not-found, conflict) plus a
/// catch-all internal class for infrastructure failures. Handlers return
/// `Error` directly; the IntoResponse impl renders the JSON error body.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use thiserror::Error;

/// Errors surfaced by the workflow API and the run state machine
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed or incomplete input, rejected before any mutation
    #[error("{0}")]
    Validation(String),

    /// Unknown workflow or test-run id
    #[error("{0}")]
    NotFound(String),

    /// Request conflicts with current state (e.g. a run already in flight)
    #[error("{0}")]
    Conflict(String),

    /// Unexpected failure; details are logged, never sent to the client
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl Error {
    /// HTTP status for this error class
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Conflict(_) => StatusCode::CONFLICT,
            Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            // Internal failures get logged in full and answered generically.
            Error::Internal(err) => {
                tracing::error!("❌ Internal error: {:#}", err);
                "internal server error".to_string()
            }
            other => other.to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
