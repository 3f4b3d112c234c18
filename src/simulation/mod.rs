pub mod config;
pub mod engine;
pub mod replication;

// Re-export commonly used types
pub use config::SimulationConfig;
pub use engine::{Simulation, SimulationObserver, SimulationReport};
pub use replication::{run_replications, summarize, ReplicationSummary};
