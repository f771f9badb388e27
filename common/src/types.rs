//! Core fixed-point types: price ticks, quantities and timestamps

use serde::{Deserialize, Serialize};
use std::fmt;

/// Price stored as a signed count of ticks
///
/// The tick size itself is engine configuration; `Px` only carries the
/// integer count, so equality and ordering are exact integer operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Px(i64);

impl Px {
    /// Zero ticks
    pub const ZERO: Self = Self(0);

    /// Create from a tick count
    #[must_use]
    pub const fn from_i64(ticks: i64) -> Self {
        Self(ticks)
    }

    /// Get the tick count
    #[must_use]
    pub const fn as_i64(&self) -> i64 {
        self.0
    }

    /// Convert a real price into ticks, rounding to the nearest tick
    #[must_use]
    pub fn from_f64(value: f64, tick_size: f64) -> Self {
        let ticks = (value / tick_size).round() as i64;
        Self(ticks)
    }

    /// Convert back to a real price for display or external APIs
    ///
    /// Internal code compares ticks directly and never round-trips
    /// through `f64`.
    #[must_use]
    pub fn to_f64(&self, tick_size: f64) -> f64 {
        self.0 as f64 * tick_size
    }
}

impl fmt::Display for Px {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}t", self.0)
    }
}

/// Order quantity in whole units
///
/// Unsigned by construction, so "negative quantity" is unrepresentable
/// and validation reduces to a zero check.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Qty(u64);

impl Qty {
    /// Zero quantity
    pub const ZERO: Self = Self(0);

    /// Create from a unit count
    #[must_use]
    pub const fn new(units: u64) -> Self {
        Self(units)
    }

    /// Get the unit count
    #[must_use]
    pub const fn as_u64(&self) -> u64 {
        self.0
    }

    /// Check if the quantity is zero
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Add two quantities
    #[must_use]
    pub const fn add(self, other: Self) -> Self {
        Self(self.0 + other.0)
    }

    /// Subtract `other`; callers uphold `other <= self`
    #[must_use]
    pub const fn sub(self, other: Self) -> Self {
        Self(self.0 - other.0)
    }
}

impl fmt::Display for Qty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Timestamp in nanoseconds since the UNIX epoch
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Ts(u64);

impl Ts {
    /// Current wall-clock timestamp
    #[must_use]
    pub fn now() -> Self {
        use std::time::{SystemTime, UNIX_EPOCH};
        let duration = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_else(|_| std::time::Duration::from_secs(0));
        let nanos = duration.as_secs() * 1_000_000_000 + u64::from(duration.subsec_nanos());
        Self(nanos)
    }

    /// Create from nanoseconds
    #[must_use]
    pub const fn from_nanos(nanos: u64) -> Self {
        Self(nanos)
    }

    /// Get as nanoseconds
    #[must_use]
    pub const fn as_nanos(&self) -> u64 {
        self.0
    }

    /// Get as microseconds
    #[must_use]
    pub const fn as_micros(&self) -> u64 {
        self.0 / 1_000
    }

    /// Get as milliseconds
    #[must_use]
    pub const fn as_millis(&self) -> u64 {
        self.0 / 1_000_000
    }
}

impl fmt::Display for Ts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ns", self.0)
    }
}
