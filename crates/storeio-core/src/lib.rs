//! Query planning, adaptive batching and load-shaping core for the Store
//! connector: the six components (C1-C6) described in spec §4.

pub mod batcher;
pub mod metrics;
pub mod moving_average;
pub mod planner;
pub mod rampup;
pub mod runtime;
pub mod throttle;
pub mod writer;

pub use batcher::WriteBatcher;
pub use moving_average::MovingAverage;
pub use rampup::RampUpThrottle;
pub use throttle::AdaptiveThrottler;
pub use writer::{MutationEngine, WriteSuccessSummary};
