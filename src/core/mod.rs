pub mod config;
pub mod counter;
pub mod errors;
pub mod lanes;
pub mod routing;
pub mod snapshot;
pub mod stock;
pub mod types;

// Re-export commonly used types
pub use config::{CounterConfig, StockLimits};
pub use counter::{CounterSearch, Departure, ServiceCounter};
pub use errors::{CounterError, CounterResult};
pub use lanes::{ServiceLane, WaitingLane};
pub use routing::{Placement, Refill, RoutingOrder};
pub use snapshot::SnapshotCodec;
pub use stock::StockLedger;
pub use types::Customer;

#[cfg(test)]
mod tests;
