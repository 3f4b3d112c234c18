pub mod core;
pub mod simulation;

// Re-export commonly used types
pub use crate::core::config::CounterConfig;
pub use crate::core::counter::{Departure, ServiceCounter};
pub use crate::core::errors::{CounterError, CounterResult};
pub use crate::core::routing::Placement;
pub use crate::core::types::Customer;
pub use crate::simulation::{Simulation, SimulationConfig, SimulationReport};
