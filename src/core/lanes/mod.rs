pub mod service_lane;
pub mod waiting_lane;

// Re-export commonly used types
pub use service_lane::ServiceLane;
pub use waiting_lane::{WaitingLane, WaitingLaneIter};
