//! Property tests: book invariants under random operation mixes
//!
//! An event-sourced mirror of the resting set is rebuilt from the
//! engine's own event stream and checked against its depth snapshots
//! after every operation: quantities conserve, the book never rests
//! locked or crossed, and identical operation sequences replay to
//! identical event streams.

use common::{Px, Qty, Ts};
use lob::{EngineConfig, EngineEvent, MatchingEngine, Order, OrderType, Side};
use proptest::prelude::*;
use std::collections::HashMap;

const TICK: f64 = 0.01;

#[derive(Debug, Clone)]
enum Op {
    Submit { id: u64, side: Side, ticks: i64, qty: u64, kind: OrderType },
    Cancel { id: u64 },
    Replace { id: u64, ticks: i64, qty: u64 },
}

fn arb_side() -> impl Strategy<Value = Side> {
    prop_oneof![Just(Side::Buy), Just(Side::Sell)]
}

fn arb_kind() -> impl Strategy<Value = OrderType> {
    prop_oneof![
        5 => Just(OrderType::Limit),
        1 => Just(OrderType::Market),
        1 => Just(OrderType::Ioc),
        1 => Just(OrderType::Fok),
    ]
}

// Small id space so cancels and replaces hit live orders often.
fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        6 => (1u64..48, arb_side(), 9_990i64..10_010, 1u64..50, arb_kind()).prop_map(
            |(id, side, ticks, qty, kind)| Op::Submit { id, side, ticks, qty, kind }
        ),
        2 => (1u64..48).prop_map(|id| Op::Cancel { id }),
        2 => (1u64..48, 9_990i64..10_010, 1u64..50).prop_map(|(id, ticks, qty)| Op::Replace {
            id,
            ticks,
            qty
        }),
    ]
}

fn apply(engine: &mut MatchingEngine, op: &Op, seq: u64) -> Vec<EngineEvent> {
    engine.clock().set(seq * 1_000);
    match *op {
        Op::Submit { id, side, ticks, qty, kind } => {
            let price =
                (kind != OrderType::Market).then(|| Px::from_i64(ticks));
            engine.submit(Order {
                id,
                side,
                price,
                qty: Qty::new(qty),
                ts: Ts::from_nanos(seq * 1_000),
                order_type: kind,
            });
        }
        Op::Cancel { id } => {
            engine.cancel(id);
        }
        Op::Replace { id, ticks, qty } => {
            engine.replace(id, Px::from_i64(ticks), Qty::new(qty));
        }
    }
    engine.poll_events()
}

/// Mirror of the resting set, rebuilt purely from emitted events
#[derive(Debug, Default)]
struct RestingMirror {
    remaining: HashMap<u64, u64>,
}

impl RestingMirror {
    /// Fold one operation's events into the mirror
    fn absorb(&mut self, op: &Op, events: &[EngineEvent]) {
        let mut accepted = false;
        let mut replaced_qty = None;
        let mut taker_fills = 0u64;
        let taker_id = match *op {
            Op::Submit { id, .. } | Op::Cancel { id } | Op::Replace { id, .. } => id,
        };

        for event in events {
            match event {
                EngineEvent::Accept(_) => accepted = true,
                EngineEvent::Reject(_) => {}
                EngineEvent::Trade(trade) => {
                    let maker = self
                        .remaining
                        .get_mut(&trade.maker_id)
                        .expect("maker must be resting");
                    assert!(*maker >= trade.qty.as_u64(), "maker overfilled");
                    *maker -= trade.qty.as_u64();
                    if *maker == 0 {
                        self.remaining.remove(&trade.maker_id);
                    }
                    assert_eq!(trade.taker_id, taker_id);
                    taker_fills += trade.qty.as_u64();
                }
                EngineEvent::Cancel(cancel) => {
                    let removed = self.remaining.remove(&cancel.id);
                    assert_eq!(removed, Some(cancel.remaining.as_u64()));
                }
                EngineEvent::Replace(replace) => {
                    assert!(self.remaining.remove(&replace.id).is_some());
                    replaced_qty = Some(replace.new_qty.as_u64());
                }
                EngineEvent::BookTop(_) => {}
            }
        }

        match *op {
            Op::Submit { id, qty, kind, .. } if accepted && kind == OrderType::Limit => {
                let leftover = qty - taker_fills;
                if leftover > 0 {
                    self.remaining.insert(id, leftover);
                }
            }
            Op::Replace { id, .. } => {
                if let Some(new_qty) = replaced_qty {
                    let leftover = new_qty - taker_fills;
                    if leftover > 0 {
                        self.remaining.insert(id, leftover);
                    }
                }
            }
            _ => {}
        }
    }

    fn total_qty(&self) -> u64 {
        self.remaining.values().sum()
    }
}

fn check_book_state(engine: &MatchingEngine, mirror: &RestingMirror) {
    let depth = engine.get_depth(usize::MAX);

    // No locked or crossed book at rest.
    if let (Some(bid), Some(ask)) = (depth.bids.first(), depth.asks.first()) {
        assert!(bid.price < ask.price, "book crossed: {bid:?} vs {ask:?}");
    }

    // Levels are best-first, non-empty, and strictly ordered.
    for pair in depth.bids.windows(2) {
        assert!(pair[0].price > pair[1].price);
    }
    for pair in depth.asks.windows(2) {
        assert!(pair[0].price < pair[1].price);
    }
    for level in depth.bids.iter().chain(depth.asks.iter()) {
        assert!(!level.qty.is_zero());
        assert!(level.orders > 0);
    }

    // The event-sourced mirror agrees with the book's own aggregates.
    let book_qty: u64 =
        depth.bids.iter().chain(depth.asks.iter()).map(|level| level.qty.as_u64()).sum();
    let book_orders: u64 =
        depth.bids.iter().chain(depth.asks.iter()).map(|level| level.orders).sum();
    assert_eq!(book_qty, mirror.total_qty(), "resting quantity diverged");
    assert_eq!(book_orders as usize, mirror.remaining.len());
    assert_eq!(engine.total_orders(), mirror.remaining.len());

    // The top-of-book cache matches the depth snapshot.
    let top = engine.best_bid_ask();
    assert_eq!(top.best_bid, depth.bids.first().map(|level| level.price));
    assert_eq!(top.best_ask, depth.asks.first().map(|level| level.price));
    assert_eq!(top.bid_qty, depth.bids.first().map_or(Qty::ZERO, |level| level.qty));
    assert_eq!(top.ask_qty, depth.asks.first().map_or(Qty::ZERO, |level| level.qty));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn random_operation_mixes_preserve_book_invariants(ops in prop::collection::vec(arb_op(), 1..80)) {
        let mut engine = MatchingEngine::new(EngineConfig::new(4096, 1 << 14, TICK));
        let mut mirror = RestingMirror::default();

        for (seq, op) in ops.iter().enumerate() {
            let events = apply(&mut engine, op, seq as u64);
            mirror.absorb(op, &events);
            check_book_state(&engine, &mirror);

            // Drains are idempotent: nothing new without an operation.
            prop_assert!(engine.poll_events().is_empty());
        }
    }

    #[test]
    fn identical_sequences_emit_identical_events(ops in prop::collection::vec(arb_op(), 1..60)) {
        let mut first = MatchingEngine::new(EngineConfig::new(4096, 1 << 14, TICK));
        let mut second = MatchingEngine::new(EngineConfig::new(4096, 1 << 14, TICK));

        for (seq, op) in ops.iter().enumerate() {
            let events_a = apply(&mut first, op, seq as u64);
            let events_b = apply(&mut second, op, seq as u64);
            prop_assert_eq!(events_a, events_b);
        }
    }

    #[test]
    fn fifo_priority_within_a_level(taker_qty in 1u64..120) {
        let mut engine = MatchingEngine::new(EngineConfig::new(64, 1 << 12, TICK));
        for id in 1..=4u64 {
            engine.submit(Order::limit(
                id,
                Side::Sell,
                Px::from_i64(10_000),
                Qty::new(30),
                Ts::from_nanos(id),
            ));
        }
        engine.poll_events();

        engine.submit(Order::market(9, Side::Buy, Qty::new(taker_qty), Ts::from_nanos(9)));
        let events = engine.poll_events();

        let makers: Vec<u64> = events
            .iter()
            .filter_map(|event| match event {
                EngineEvent::Trade(trade) => Some(trade.maker_id),
                _ => None,
            })
            .collect();

        // Earlier arrivals fill first, without gaps.
        let expected_full = (taker_qty / 30) as usize;
        let expects_partial = taker_qty % 30 != 0 && expected_full < 4;
        prop_assert_eq!(makers.len(), (expected_full + usize::from(expects_partial)).min(4));
        for (position, maker) in makers.iter().enumerate() {
            prop_assert_eq!(*maker, position as u64 + 1);
        }
    }
}
