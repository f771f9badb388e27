//! Event schema and the order model
//!
//! Events are the engine's only output surface: every externally driven
//! operation appends its outcome to the event ring in causal order, and
//! the owner drains them through `MatchingEngine::poll_events`. All types
//! are plain serde-serializable values so downstream feeds can persist or
//! transmit them.

use common::{Px, Qty, Ts};
use serde::{Deserialize, Serialize};

/// Side of an order or trade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Side {
    /// Buy side (bids)
    Buy = 0,
    /// Sell side (asks)
    Sell = 1,
}

impl Side {
    /// Check if this is the buy side
    #[inline]
    #[must_use]
    pub const fn is_buy(&self) -> bool {
        matches!(self, Self::Buy)
    }

    /// Get the opposite side
    #[inline]
    #[must_use]
    pub const fn opposite(&self) -> Self {
        match self {
            Self::Buy => Self::Sell,
            Self::Sell => Self::Buy,
        }
    }
}

/// Execution policy of an incoming order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum OrderType {
    /// Match what crosses, rest the remainder on the book
    Limit = 0,
    /// Match at any price, never rest; the residual is dropped
    Market = 1,
    /// Immediate-or-cancel: match what crosses at the limit price now,
    /// drop the rest
    Ioc = 2,
    /// Fill-or-kill: match the full quantity now or reject without
    /// touching the book
    Fok = 3,
}

impl OrderType {
    /// Whether an unmatched remainder may rest on the book
    #[inline]
    #[must_use]
    pub const fn rests(&self) -> bool {
        matches!(self, Self::Limit)
    }

    /// Whether matching ignores the limit price
    #[inline]
    #[must_use]
    pub const fn is_market(&self) -> bool {
        matches!(self, Self::Market)
    }
}

/// An order as submitted by a caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Unique identifier; `0` is reserved as invalid
    pub id: u64,
    /// Buy or sell
    pub side: Side,
    /// Limit price in ticks; `None` for market orders
    pub price: Option<Px>,
    /// Quantity to trade
    pub qty: Qty,
    /// Caller-supplied submission timestamp
    pub ts: Ts,
    /// Execution policy
    pub order_type: OrderType,
}

impl Order {
    /// Limit order resting any unmatched remainder
    #[must_use]
    pub const fn limit(id: u64, side: Side, price: Px, qty: Qty, ts: Ts) -> Self {
        Self { id, side, price: Some(price), qty, ts, order_type: OrderType::Limit }
    }

    /// Market order matching at any price, never resting
    #[must_use]
    pub const fn market(id: u64, side: Side, qty: Qty, ts: Ts) -> Self {
        Self { id, side, price: None, qty, ts, order_type: OrderType::Market }
    }

    /// Immediate-or-cancel order at a limit price
    #[must_use]
    pub const fn ioc(id: u64, side: Side, price: Px, qty: Qty, ts: Ts) -> Self {
        Self { id, side, price: Some(price), qty, ts, order_type: OrderType::Ioc }
    }

    /// Fill-or-kill order at a limit price
    #[must_use]
    pub const fn fok(id: u64, side: Side, price: Px, qty: Qty, ts: Ts) -> Self {
        Self { id, side, price: Some(price), qty, ts, order_type: OrderType::Fok }
    }
}

/// Reason code attached to a [`RejectEvent`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum RejectReason {
    /// Submitted id collides with a resting order
    DuplicateId = 0,
    /// Registry already holds the configured maximum of resting orders
    CapacityExceeded = 1,
    /// Zero quantity, missing limit price, or reserved id
    InvalidOrder = 2,
    /// Fill-or-kill precheck found insufficient crossable quantity
    UnfillableFok = 3,
}

/// Order admitted to the matching loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcceptEvent {
    /// Order id
    pub id: u64,
    /// Engine timestamp
    pub ts: Ts,
}

/// Order refused before any book mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectEvent {
    /// Order id
    pub id: u64,
    /// Why the order was refused
    pub reason: RejectReason,
    /// Engine timestamp
    pub ts: Ts,
}

/// A fill between an incoming taker and a resting maker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeEvent {
    /// Incoming (aggressive) order id
    pub taker_id: u64,
    /// Resting (passive) order id
    pub maker_id: u64,
    /// Execution price: always the maker's resting price
    pub price: Px,
    /// Filled quantity
    pub qty: Qty,
    /// Engine timestamp
    pub ts: Ts,
}

/// Resting order removed by request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelEvent {
    /// Order id
    pub id: u64,
    /// Quantity still unfilled at cancellation
    pub remaining: Qty,
    /// Engine timestamp
    pub ts: Ts,
}

/// Resting order re-priced or resized, keeping its id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplaceEvent {
    /// Order id
    pub id: u64,
    /// Price after the replace
    pub new_price: Px,
    /// Quantity after the replace
    pub new_qty: Qty,
    /// Engine timestamp
    pub ts: Ts,
}

/// Top-of-book state, emitted whenever either side's best level changes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookTop {
    /// Best bid price, if any bids rest
    pub best_bid: Option<Px>,
    /// Aggregate quantity at the best bid
    pub bid_qty: Qty,
    /// Best ask price, if any asks rest
    pub best_ask: Option<Px>,
    /// Aggregate quantity at the best ask
    pub ask_qty: Qty,
    /// Engine timestamp
    pub ts: Ts,
}

impl BookTop {
    /// Spread in ticks, when both sides are present
    #[must_use]
    pub fn spread(&self) -> Option<i64> {
        Some(self.best_ask?.as_i64() - self.best_bid?.as_i64())
    }

    /// Midpoint in ticks (rounded toward the bid), when both sides are
    /// present
    #[must_use]
    pub fn mid(&self) -> Option<Px> {
        Some(Px::from_i64((self.best_bid?.as_i64() + self.best_ask?.as_i64()) / 2))
    }
}

/// Tagged union of everything the engine can emit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineEvent {
    /// Order admitted to matching
    Accept(AcceptEvent),
    /// Order refused with a reason code
    Reject(RejectEvent),
    /// Fill against a resting order
    Trade(TradeEvent),
    /// Resting order canceled
    Cancel(CancelEvent),
    /// Resting order replaced
    Replace(ReplaceEvent),
    /// Best bid or ask changed
    BookTop(BookTop),
}

impl EngineEvent {
    /// Timestamp stamped by the engine clock
    #[must_use]
    pub const fn ts(&self) -> Ts {
        match self {
            Self::Accept(e) => e.ts,
            Self::Reject(e) => e.ts,
            Self::Trade(e) => e.ts,
            Self::Cancel(e) => e.ts,
            Self::Replace(e) => e.ts,
            Self::BookTop(e) => e.ts,
        }
    }

    /// Check if this is a trade
    #[inline]
    #[must_use]
    pub const fn is_trade(&self) -> bool {
        matches!(self, Self::Trade(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn side_operations() {
        assert!(Side::Buy.is_buy());
        assert!(!Side::Sell.is_buy());
        assert_eq!(Side::Buy.opposite(), Side::Sell);
        assert_eq!(Side::Sell.opposite(), Side::Buy);
    }

    #[test]
    fn order_type_policies() {
        assert!(OrderType::Limit.rests());
        assert!(!OrderType::Market.rests());
        assert!(!OrderType::Ioc.rests());
        assert!(OrderType::Market.is_market());
        assert!(!OrderType::Fok.is_market());
    }

    #[test]
    fn book_top_spread_and_mid() {
        let top = BookTop {
            best_bid: Some(Px::from_i64(9_990)),
            bid_qty: Qty::new(5),
            best_ask: Some(Px::from_i64(10_010)),
            ask_qty: Qty::new(7),
            ts: Ts::from_nanos(1),
        };
        assert_eq!(top.spread(), Some(20));
        assert_eq!(top.mid(), Some(Px::from_i64(10_000)));

        let one_sided = BookTop { best_ask: None, ask_qty: Qty::ZERO, ..top };
        assert_eq!(one_sided.spread(), None);
        assert_eq!(one_sided.mid(), None);
    }

    #[test]
    fn events_round_trip_through_bincode() -> Result<(), Box<dyn std::error::Error>> {
        let events = vec![
            EngineEvent::Accept(AcceptEvent { id: 1, ts: Ts::from_nanos(10) }),
            EngineEvent::Trade(TradeEvent {
                taker_id: 2,
                maker_id: 1,
                price: Px::from_i64(10_000),
                qty: Qty::new(5),
                ts: Ts::from_nanos(10),
            }),
            EngineEvent::Reject(RejectEvent {
                id: 3,
                reason: RejectReason::UnfillableFok,
                ts: Ts::from_nanos(11),
            }),
        ];
        let encoded = bincode::serialize(&events)?;
        let decoded: Vec<EngineEvent> = bincode::deserialize(&encoded)?;
        assert_eq!(events, decoded);
        Ok(())
    }
}
