/// Runtime simulation layer
///
/// This module provides the sequential test-run state machine. It handles:
/// - Run creation with single-flight enforcement per workflow
/// - Background advancement over the node list with tokio
/// - The per-node outcome seam (`NodeExecutor`) with its randomized default

// Per-node outcome decision and the randomized default implementation
pub mod executor;

// Sequential test-run state machine and run coordination
pub mod simulator;

// Scripted executor double for tests
pub mod mock;

// Re-export main types
pub use executor::{NodeExecutor, NodeOutcome, SimulatedExecutor};
pub use mock::MockExecutor;
pub use simulator::TestRunner;
