/// Flowcanvas: visual workflow builder backend
///
/// Main entry point for the flowcanvas server. Initializes configuration and
/// starts the HTTP server with workflow management and test-run simulation.

use flowcanvas::{config::Config, server::start_server};

/// Application entry point
///
/// The server provides:
/// - Workflow management API at /api/workflows/*
/// - Node template catalog at /api/node-templates
/// - Test-run simulation at /api/workflows/{id}/test
/// - Health check at /healthz
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration (defaults to 0.0.0.0:5000 and the in-memory store)
    let config = Config::default();

    // Start the server
    start_server(config).await?;

    Ok(())
}
