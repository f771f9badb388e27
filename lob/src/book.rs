//! Order book storage: per-side price levels over a preallocated order arena
//!
//! Resting orders live in a slab shared by both sides, with an embedded
//! free list so slots are recycled without heap churn. Each price level is
//! an intrusive doubly linked FIFO of slab slots, and the id registry maps
//! straight to slots, so cancel and replace never scan a level.
//!
//! Bid levels are keyed by negated ticks so that natural ascending
//! `BTreeMap` iteration yields best-first order on both sides.

use crate::events::{Order, Side, TradeEvent};
use common::{Px, Qty, Ts};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A resting order inside the arena
#[derive(Debug, Clone)]
struct OrderNode {
    id: u64,
    side: Side,
    price: Px,
    remaining: Qty,
    ts: Ts,
    prev: Option<u32>,
    next: Option<u32>,
}

/// FIFO queue of resting orders at one price
#[derive(Debug, Clone, Default)]
struct PriceLevel {
    head: Option<u32>,
    tail: Option<u32>,
    total_qty: Qty,
    orders: u64,
}

/// Aggregated view of one price level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepthLevel {
    /// Level price in ticks
    pub price: Px,
    /// Sum of remaining quantities at this price
    pub qty: Qty,
    /// Number of resting orders at this price
    pub orders: u64,
}

/// Read-only aggregation of the top levels on both sides, best first
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepthSnapshot {
    /// Bid levels, highest price first
    pub bids: Vec<DepthLevel>,
    /// Ask levels, lowest price first
    pub asks: Vec<DepthLevel>,
}

/// Map key for a side book: bids negate ticks so ascending key order is
/// best-first on both sides
const fn side_key(side: Side, price: Px) -> i64 {
    match side {
        Side::Buy => -price.as_i64(),
        Side::Sell => price.as_i64(),
    }
}

const fn key_price(side: Side, key: i64) -> Px {
    match side {
        Side::Buy => Px::from_i64(-key),
        Side::Sell => Px::from_i64(key),
    }
}

/// Whether `taker` crosses a resting level at `best`
fn crosses(taker: &Order, best: Px) -> bool {
    if taker.order_type.is_market() {
        return true;
    }
    match (taker.price, taker.side) {
        (Some(limit), Side::Buy) => limit >= best,
        (Some(limit), Side::Sell) => limit <= best,
        (None, _) => false,
    }
}

/// Both sides of one symbol's book plus the order-id registry
#[derive(Debug)]
pub(crate) struct LimitBook {
    bids: BTreeMap<i64, PriceLevel>,
    asks: BTreeMap<i64, PriceLevel>,
    arena: Vec<OrderNode>,
    free_head: Option<u32>,
    index: FxHashMap<u64, u32>,
    max_orders: usize,
}

impl LimitBook {
    pub(crate) fn new(max_orders: usize) -> Self {
        Self {
            bids: BTreeMap::new(),
            asks: BTreeMap::new(),
            arena: Vec::with_capacity(max_orders),
            free_head: None,
            index: FxHashMap::with_capacity_and_hasher(max_orders, Default::default()),
            max_orders,
        }
    }

    /// Number of resting orders
    pub(crate) fn total_orders(&self) -> usize {
        self.index.len()
    }

    pub(crate) fn is_full(&self) -> bool {
        self.index.len() >= self.max_orders
    }

    pub(crate) fn contains(&self, id: u64) -> bool {
        self.index.contains_key(&id)
    }

    /// Side, price and remaining quantity of a resting order
    pub(crate) fn resting(&self, id: u64) -> Option<(Side, Px, Qty)> {
        let &slot = self.index.get(&id)?;
        let node = &self.arena[slot as usize];
        Some((node.side, node.price, node.remaining))
    }

    fn book(&self, side: Side) -> &BTreeMap<i64, PriceLevel> {
        match side {
            Side::Buy => &self.bids,
            Side::Sell => &self.asks,
        }
    }

    /// Best price and aggregate quantity on `side`
    pub(crate) fn best(&self, side: Side) -> Option<(Px, Qty)> {
        let (&key, level) = self.book(side).first_key_value()?;
        Some((key_price(side, key), level.total_qty))
    }

    /// Total quantity resting at prices `taker` crosses, stopping early
    /// once `needed` is reachable
    pub(crate) fn crossable_qty(&self, taker: &Order, needed: Qty) -> Qty {
        let resting = taker.side.opposite();
        let mut available = Qty::ZERO;
        for (&key, level) in self.book(resting) {
            if !crosses(taker, key_price(resting, key)) {
                break;
            }
            available = available.add(level.total_qty);
            if available >= needed {
                break;
            }
        }
        available
    }

    /// Match `taker` against the opposite side, best level first and FIFO
    /// within a level, appending one [`TradeEvent`] per fill
    ///
    /// Fills execute at the maker's resting price. Fully filled makers
    /// are unlinked and their registry entries removed; emptied levels
    /// are dropped. `taker.qty` holds the unmatched remainder on return.
    pub(crate) fn execute(&mut self, taker: &mut Order, now: Ts, trades: &mut Vec<TradeEvent>) {
        let resting = taker.side.opposite();
        while !taker.qty.is_zero() {
            let book = match resting {
                Side::Buy => &mut self.bids,
                Side::Sell => &mut self.asks,
            };
            let Some(mut entry) = book.first_entry() else { break };
            let best_px = key_price(resting, *entry.key());
            if !crosses(taker, best_px) {
                break;
            }
            let level = entry.get_mut();
            let Some(head_slot) = level.head else {
                entry.remove();
                continue;
            };

            let (fill, maker_id, maker_next, maker_done) = {
                let maker = &mut self.arena[head_slot as usize];
                let fill = taker.qty.min(maker.remaining);
                maker.remaining = maker.remaining.sub(fill);
                (fill, maker.id, maker.next, maker.remaining.is_zero())
            };

            trades.push(TradeEvent {
                taker_id: taker.id,
                maker_id,
                price: best_px,
                qty: fill,
                ts: now,
            });
            taker.qty = taker.qty.sub(fill);
            level.total_qty = level.total_qty.sub(fill);

            if maker_done {
                level.head = maker_next;
                level.orders -= 1;
                match maker_next {
                    Some(next) => self.arena[next as usize].prev = None,
                    None => level.tail = None,
                }
                if level.head.is_none() {
                    entry.remove();
                }
                self.index.remove(&maker_id);
                self.release(head_slot);
            }
        }
    }

    /// Rest `order` at the tail of its price level, creating the level if
    /// absent, and register its id
    pub(crate) fn rest(&mut self, order: &Order, price: Px) {
        let slot = self.acquire(OrderNode {
            id: order.id,
            side: order.side,
            price,
            remaining: order.qty,
            ts: order.ts,
            prev: None,
            next: None,
        });
        self.link_tail(slot);
        self.index.insert(order.id, slot);
    }

    /// Remove a resting order, returning its remaining quantity
    pub(crate) fn cancel(&mut self, id: u64) -> Option<Qty> {
        let slot = self.index.remove(&id)?;
        let remaining = self.unlink(slot);
        self.release(slot);
        Some(remaining)
    }

    /// Shrink a resting order in place, preserving its queue position
    ///
    /// Callers uphold `new_qty <= remaining`.
    pub(crate) fn reduce(&mut self, id: u64, new_qty: Qty) {
        let Some(&slot) = self.index.get(&id) else { return };
        let (side, price, old) = {
            let node = &mut self.arena[slot as usize];
            let old = node.remaining;
            node.remaining = new_qty;
            (node.side, node.price, old)
        };
        let key = side_key(side, price);
        let book = match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        };
        if let Some(level) = book.get_mut(&key) {
            level.total_qty = level.total_qty.sub(old.sub(new_qty));
        }
    }

    /// Aggregates for the top `max_levels` levels per side
    pub(crate) fn depth(&self, max_levels: usize) -> DepthSnapshot {
        let view = |side: Side| -> Vec<DepthLevel> {
            self.book(side)
                .iter()
                .take(max_levels)
                .map(|(&key, level)| DepthLevel {
                    price: key_price(side, key),
                    qty: level.total_qty,
                    orders: level.orders,
                })
                .collect()
        };
        DepthSnapshot { bids: view(Side::Buy), asks: view(Side::Sell) }
    }

    /// Take a slot from the free list or grow the arena
    fn acquire(&mut self, node: OrderNode) -> u32 {
        match self.free_head {
            Some(slot) => {
                self.free_head = self.arena[slot as usize].next;
                self.arena[slot as usize] = node;
                slot
            }
            None => {
                self.arena.push(node);
                (self.arena.len() - 1) as u32
            }
        }
    }

    /// Return a slot to the free list, chaining through `next`
    fn release(&mut self, slot: u32) {
        let node = &mut self.arena[slot as usize];
        node.prev = None;
        node.next = self.free_head;
        self.free_head = Some(slot);
    }

    /// Append `slot` at the tail of its price level
    fn link_tail(&mut self, slot: u32) {
        let (side, price, qty) = {
            let node = &self.arena[slot as usize];
            (node.side, node.price, node.remaining)
        };
        let key = side_key(side, price);
        let book = match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        };
        let level = book.entry(key).or_default();
        let prev_tail = level.tail;
        level.tail = Some(slot);
        if level.head.is_none() {
            level.head = Some(slot);
        }
        level.total_qty = level.total_qty.add(qty);
        level.orders += 1;
        if let Some(tail) = prev_tail {
            self.arena[tail as usize].next = Some(slot);
            self.arena[slot as usize].prev = Some(tail);
        }
    }

    /// Detach `slot` from its level, dropping the level if emptied, and
    /// return the node's remaining quantity
    fn unlink(&mut self, slot: u32) -> Qty {
        let (side, price, qty, prev, next) = {
            let node = &self.arena[slot as usize];
            (node.side, node.price, node.remaining, node.prev, node.next)
        };
        if let Some(prev) = prev {
            self.arena[prev as usize].next = next;
        }
        if let Some(next) = next {
            self.arena[next as usize].prev = prev;
        }
        let key = side_key(side, price);
        let book = match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        };
        if let Some(level) = book.get_mut(&key) {
            if level.head == Some(slot) {
                level.head = next;
            }
            if level.tail == Some(slot) {
                level.tail = prev;
            }
            level.total_qty = level.total_qty.sub(qty);
            level.orders -= 1;
            if level.head.is_none() {
                book.remove(&key);
            }
        }
        qty
    }
}
