//! Thin multi-symbol fan-out over independent engine instances
//!
//! Each symbol gets its own engine: no cross-symbol ordering or
//! atomicity, and order ids are scoped per symbol. All engines created by
//! one router share its time source, so a replayed multi-symbol session
//! stays on one timeline.

use crate::book::DepthSnapshot;
use crate::clock::TimeSource;
use crate::config::EngineConfig;
use crate::engine::MatchingEngine;
use crate::events::{BookTop, EngineEvent, Order};
use common::{Px, Qty};
use rustc_hash::FxHashMap;
use std::sync::Arc;
use tracing::debug;

/// Routes operations to per-symbol matching engines
pub struct MultiSymbolEngine {
    default_config: EngineConfig,
    clock: Arc<TimeSource>,
    engines: FxHashMap<String, MatchingEngine>,
}

impl MultiSymbolEngine {
    /// Router with its own simulated clock starting at zero
    #[must_use]
    pub fn new(default_config: EngineConfig) -> Self {
        Self::with_clock(default_config, Arc::new(TimeSource::simulated(0)))
    }

    /// Router sharing an existing time source
    #[must_use]
    pub fn with_clock(default_config: EngineConfig, clock: Arc<TimeSource>) -> Self {
        Self { default_config, clock, engines: FxHashMap::default() }
    }

    /// Shared time source
    #[must_use]
    pub const fn clock(&self) -> &Arc<TimeSource> {
        &self.clock
    }

    /// Register `symbol` with the default configuration
    ///
    /// Returns `false` if the symbol already exists.
    pub fn add_symbol(&mut self, symbol: &str) -> bool {
        self.add_symbol_with_config(symbol, self.default_config)
    }

    /// Register `symbol` with a custom configuration
    pub fn add_symbol_with_config(&mut self, symbol: &str, config: EngineConfig) -> bool {
        if self.engines.contains_key(symbol) {
            return false;
        }
        debug!(symbol, "symbol added");
        self.engines
            .insert(symbol.to_owned(), MatchingEngine::with_clock(config, Arc::clone(&self.clock)));
        true
    }

    /// Drop `symbol` and its book; returns `false` if unknown
    pub fn remove_symbol(&mut self, symbol: &str) -> bool {
        let removed = self.engines.remove(symbol).is_some();
        if removed {
            debug!(symbol, "symbol removed");
        }
        removed
    }

    /// Submit an order to `symbol`; `false` if the symbol is unknown
    pub fn submit(&mut self, symbol: &str, order: Order) -> bool {
        match self.engines.get_mut(symbol) {
            Some(engine) => engine.submit(order),
            None => false,
        }
    }

    /// Cancel an order on `symbol`
    pub fn cancel(&mut self, symbol: &str, id: u64) -> bool {
        match self.engines.get_mut(symbol) {
            Some(engine) => engine.cancel(id),
            None => false,
        }
    }

    /// Replace an order on `symbol`
    pub fn replace(&mut self, symbol: &str, id: u64, new_price: Px, new_qty: Qty) -> bool {
        match self.engines.get_mut(symbol) {
            Some(engine) => engine.replace(id, new_price, new_qty),
            None => false,
        }
    }

    /// Drain pending events for `symbol`
    pub fn poll_events(&mut self, symbol: &str) -> Option<Vec<EngineEvent>> {
        self.engines.get_mut(symbol).map(MatchingEngine::poll_events)
    }

    /// Top-of-book snapshot for `symbol`
    #[must_use]
    pub fn best_bid_ask(&self, symbol: &str) -> Option<BookTop> {
        self.engines.get(symbol).map(MatchingEngine::best_bid_ask)
    }

    /// Depth snapshot for `symbol`
    #[must_use]
    pub fn get_depth(&self, symbol: &str, max_levels: usize) -> Option<DepthSnapshot> {
        self.engines.get(symbol).map(|engine| engine.get_depth(max_levels))
    }

    /// Registered symbols, in arbitrary order
    #[must_use]
    pub fn symbols(&self) -> Vec<&str> {
        self.engines.keys().map(String::as_str).collect()
    }

    /// Direct engine access for advanced callers
    #[must_use]
    pub fn engine(&self, symbol: &str) -> Option<&MatchingEngine> {
        self.engines.get(symbol)
    }

    /// Mutable engine access for advanced callers
    pub fn engine_mut(&mut self, symbol: &str) -> Option<&mut MatchingEngine> {
        self.engines.get_mut(symbol)
    }
}
