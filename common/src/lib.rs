//! Shared market primitives for the matching engine workspace
//!
//! Fixed-point prices, unsigned quantities and nanosecond timestamps.
//! Everything here is a plain `Copy` value with integer internals so the
//! matching hot path never touches floating point.

#![warn(missing_docs)]

pub mod types;

pub use types::{Px, Qty, Ts};
