//! The matching engine: operation surface, event emission, book-top cache
//!
//! One engine instance owns its book, order registry and event ring.
//! Operations are synchronous and run to completion; callers drain events
//! with [`MatchingEngine::poll_events`] between operations and must
//! serialize access to a single engine.

use crate::book::{DepthSnapshot, LimitBook};
use crate::clock::TimeSource;
use crate::config::EngineConfig;
use crate::events::{
    AcceptEvent, BookTop, CancelEvent, EngineEvent, Order, OrderType, RejectEvent, RejectReason,
    ReplaceEvent, Side, TradeEvent,
};
use crate::ring::EventRing;
use common::{Px, Qty, Ts};
use std::sync::Arc;
use tracing::debug;

/// Cached best price and aggregate quantity per side
type TopCache = (Option<(Px, Qty)>, Option<(Px, Qty)>);

/// Single-symbol price-time priority matching engine
///
/// Event emission follows the causal order of each operation: `Accept`
/// (or `Reject`) first, then one `Trade` per fill, then at most one
/// `BookTop` when either side's best price or aggregate changed. The
/// clock is read exactly once per operation and stamps every event the
/// operation emits.
pub struct MatchingEngine {
    config: EngineConfig,
    clock: Arc<TimeSource>,
    book: LimitBook,
    ring: EventRing,
    top: TopCache,
    scratch: Vec<TradeEvent>,
}

impl MatchingEngine {
    /// Engine with its own simulated clock starting at zero
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self::with_clock(config, Arc::new(TimeSource::simulated(0)))
    }

    /// Engine sharing an existing time source
    #[must_use]
    pub fn with_clock(config: EngineConfig, clock: Arc<TimeSource>) -> Self {
        Self {
            book: LimitBook::new(config.max_orders),
            ring: EventRing::with_capacity(config.ring_size),
            top: (None, None),
            scratch: Vec::with_capacity(64),
            clock,
            config,
        }
    }

    /// Engine configuration
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Shared time source; replay sessions use this to drive simulated time
    #[must_use]
    pub const fn clock(&self) -> &Arc<TimeSource> {
        &self.clock
    }

    /// Number of resting orders
    #[must_use]
    pub fn total_orders(&self) -> usize {
        self.book.total_orders()
    }

    /// Number of undrained events
    #[must_use]
    pub fn pending_events(&self) -> usize {
        self.ring.len()
    }

    /// Submit an order for matching
    ///
    /// Returns `true` when the operation was processed; order-level
    /// failures (duplicate id, capacity, invalid fields, unfillable FOK)
    /// surface as a `Reject` event, not a `false` return. A market order
    /// finding no opposite liquidity is accepted and its residual dropped
    /// silently.
    pub fn submit(&mut self, order: Order) -> bool {
        let now = self.clock.now();

        if let Some(reason) = self.validate(&order) {
            debug!(id = order.id, ?reason, "submit rejected");
            self.ring.push(EngineEvent::Reject(RejectEvent { id: order.id, reason, ts: now }));
            return true;
        }

        let unfillable_fok = order.order_type == OrderType::Fok
            && self.book.crossable_qty(&order, order.qty) < order.qty;
        if unfillable_fok {
            debug!(id = order.id, "fok unfillable");
            self.ring.push(EngineEvent::Reject(RejectEvent {
                id: order.id,
                reason: RejectReason::UnfillableFok,
                ts: now,
            }));
            return true;
        }

        self.ring.push(EngineEvent::Accept(AcceptEvent { id: order.id, ts: now }));

        let mut taker = order;
        let fills = self.match_and_emit(&mut taker, now);

        if !taker.qty.is_zero() && taker.order_type.rests() {
            if let Some(price) = taker.price {
                self.book.rest(&taker, price);
            }
        }

        if fills > 0 {
            debug!(id = order.id, fills, "order matched");
        }
        self.emit_top_delta(now);
        true
    }

    /// Cancel a resting order by id
    ///
    /// Returns `false` and emits nothing when the id is unknown.
    pub fn cancel(&mut self, id: u64) -> bool {
        let now = self.clock.now();
        let Some(remaining) = self.book.cancel(id) else { return false };
        debug!(id, "order canceled");
        self.ring.push(EngineEvent::Cancel(CancelEvent { id, remaining, ts: now }));
        self.emit_top_delta(now);
        true
    }

    /// Replace a resting order, keeping its id
    ///
    /// When the price is unchanged and the new quantity does not exceed
    /// the remaining quantity, the order shrinks in place and keeps its
    /// queue position. Any other replace requeues the order at the back
    /// of the new level, where it may immediately match. `Replace` is
    /// emitted first, then any resulting `Trade`s, then `BookTop` if the
    /// top changed. Returns `false` and emits nothing when the id is
    /// unknown or `new_qty` is zero.
    pub fn replace(&mut self, id: u64, new_price: Px, new_qty: Qty) -> bool {
        let now = self.clock.now();
        let Some((side, old_price, old_remaining)) = self.book.resting(id) else { return false };
        if new_qty.is_zero() {
            return false;
        }

        self.ring.push(EngineEvent::Replace(ReplaceEvent { id, new_price, new_qty, ts: now }));

        if new_price == old_price && new_qty <= old_remaining {
            self.book.reduce(id, new_qty);
            debug!(id, "order reduced in place");
        } else {
            self.book.cancel(id);
            let mut taker = Order::limit(id, side, new_price, new_qty, now);
            self.match_and_emit(&mut taker, now);
            if !taker.qty.is_zero() {
                self.book.rest(&taker, new_price);
            }
            debug!(id, "order requeued");
        }

        self.emit_top_delta(now);
        true
    }

    /// Snapshot of the top-of-book cache
    #[must_use]
    pub fn best_bid_ask(&self) -> BookTop {
        self.top_event(self.clock.now())
    }

    /// Aggregates for the top `max_levels` price levels per side
    ///
    /// Read-only: mutates nothing and emits no events.
    #[must_use]
    pub fn get_depth(&self, max_levels: usize) -> DepthSnapshot {
        self.book.depth(max_levels)
    }

    /// Drain all pending events in FIFO order
    pub fn poll_events(&mut self) -> Vec<EngineEvent> {
        self.ring.drain()
    }

    fn validate(&self, order: &Order) -> Option<RejectReason> {
        let price_missing = order.price.is_none() && order.order_type != OrderType::Market;
        if order.id == 0 || order.qty.is_zero() || price_missing {
            return Some(RejectReason::InvalidOrder);
        }
        if self.book.contains(order.id) {
            return Some(RejectReason::DuplicateId);
        }
        if self.book.is_full() {
            return Some(RejectReason::CapacityExceeded);
        }
        None
    }

    /// Run the match loop and emit its trades, reusing the scratch buffer
    fn match_and_emit(&mut self, taker: &mut Order, now: Ts) -> usize {
        let mut trades = std::mem::take(&mut self.scratch);
        trades.clear();
        self.book.execute(taker, now, &mut trades);
        let fills = trades.len();
        for trade in trades.drain(..) {
            self.ring.push(EngineEvent::Trade(trade));
        }
        self.scratch = trades;
        fills
    }

    /// Emit one `BookTop` when either side's best changed since the last
    /// externally driven operation
    fn emit_top_delta(&mut self, now: Ts) {
        let current = (self.book.best(Side::Buy), self.book.best(Side::Sell));
        if current != self.top {
            self.top = current;
            let top = self.top_event(now);
            self.ring.push(EngineEvent::BookTop(top));
        }
    }

    fn top_event(&self, ts: Ts) -> BookTop {
        let (bid, ask) = self.top;
        BookTop {
            best_bid: bid.map(|(price, _)| price),
            bid_qty: bid.map_or(Qty::ZERO, |(_, qty)| qty),
            best_ask: ask.map(|(price, _)| price),
            ask_qty: ask.map_or(Qty::ZERO, |(_, qty)| qty),
            ts,
        }
    }
}
