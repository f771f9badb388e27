//! Engine construction parameters

use serde::{Deserialize, Serialize};

/// Capacity bounds and price granularity for one engine instance
///
/// All capacities are fixed at construction; steady-state operations do
/// not allocate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Upper bound on concurrently resting orders; exceeding it rejects
    /// the submit with `CapacityExceeded`
    pub max_orders: usize,
    /// Capacity of the event ring; overflowing it is fatal
    pub ring_size: usize,
    /// Minimum price increment, used only to convert real prices to ticks
    pub tick_size: f64,
}

impl EngineConfig {
    /// Build a config from explicit bounds
    #[must_use]
    pub const fn new(max_orders: usize, ring_size: usize, tick_size: f64) -> Self {
        Self { max_orders, ring_size, tick_size }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { max_orders: 100_000, ring_size: 10_000, tick_size: 0.01 }
    }
}
