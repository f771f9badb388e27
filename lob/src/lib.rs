//! Deterministic limit order book matching engine
//!
//! Price-time priority matching over per-symbol in-memory books:
//!
//! - integer-tick prices, FIFO price levels backed by a preallocated
//!   order arena
//! - Limit / Market / IOC / FOK order semantics
//! - O(1) cancel and replace through the order-id registry
//! - a bounded event ring drained by the owner between operations
//! - a pluggable simulated or wall-clock time source, making replayed
//!   sessions bit-identical run to run
//!
//! The core is single-threaded by design: an engine owns its book and
//! event ring, operations run to completion, and callers serialize
//! access. Multi-symbol deployments fan out through
//! [`MultiSymbolEngine`], one independent engine per symbol.

#![warn(missing_docs)]

pub mod book;
pub mod clock;
pub mod config;
pub mod engine;
pub mod events;
pub mod replay;
pub mod ring;
pub mod router;

pub use book::{DepthLevel, DepthSnapshot};
pub use clock::TimeSource;
pub use config::EngineConfig;
pub use engine::MatchingEngine;
pub use events::{
    AcceptEvent, BookTop, CancelEvent, EngineEvent, Order, OrderType, RejectEvent, RejectReason,
    ReplaceEvent, Side, TradeEvent,
};
pub use replay::{OrderFlowReplay, ReplayAction, ReplayError, ReplayRecord, ReplayStats};
pub use ring::EventRing;
pub use router::MultiSymbolEngine;
