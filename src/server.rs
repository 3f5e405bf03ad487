/// Server setup and initialization
///
/// Wires together all components: storage backend, simulated executor, test
/// runner, and HTTP routes. Provides the main application factory function
/// for creating the Axum app.

use crate::{
    api::{create_run_routes, create_workflow_routes, AppState},
    config::Config,
    runtime::{executor::SimulatedExecutor, simulator::TestRunner},
    workflow::{MemoryStorage, SqliteStorage, Storage},
};
use anyhow::Result;
use axum::{routing::get, Router};
use sqlx::sqlite::SqlitePool;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Create the main Axum application with all routes
///
/// Initializes the configured storage backend, the test-run coordinator, and
/// wires them into a complete application.
pub async fn create_app(config: Config) -> Result<Router> {
    // Select the storage backend: SQLite when configured, in-memory otherwise
    let storage: Arc<dyn Storage> = match &config.database.url {
        Some(url) => {
            tracing::info!("📋 Initializing SQLite storage: {}", url);
            let pool = SqlitePool::connect(url).await?;
            let storage = SqliteStorage::new(pool);
            storage.init_schema().await?;
            Arc::new(storage)
        }
        None => {
            tracing::info!("📋 Initializing in-memory storage with sample workflow");
            Arc::new(MemoryStorage::with_sample_workflow())
        }
    };

    // The simulated executor stands in for real node execution
    tracing::info!("⚙️ Initializing simulated node executor");
    let executor = Arc::new(SimulatedExecutor::default());

    tracing::info!("🚀 Initializing test runner");
    let runner = Arc::new(TestRunner::new(Arc::clone(&storage), executor));

    let app_state = AppState { storage, runner };

    tracing::info!("📡 Creating HTTP router with all endpoints");
    let app = Router::new()
        // Health check endpoint
        .route("/healthz", get(health_check))
        // Workflow management API routes
        .merge(create_workflow_routes().with_state(app_state.clone()))
        // Test-run API routes
        .merge(create_run_routes().with_state(app_state));

    tracing::info!("✅ Application initialized successfully");

    Ok(app)
}

/// Start the HTTP server with the given configuration
///
/// Creates the application and starts the Axum server on the configured
/// address and port.
pub async fn start_server(config: Config) -> Result<()> {
    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_thread_ids(true)
        .with_level(true)
        .init();

    tracing::info!("Starting flowcanvas server...");

    // Create the application
    let app = create_app(config.clone()).await?;

    // Bind to the configured address
    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&bind_addr).await?;

    tracing::info!("Server listening on http://{}", bind_addr);

    // Start the server
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

/// Health check endpoint handler
async fn health_check() -> &'static str {
    "ok"
}
