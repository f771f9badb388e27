//! Minimal tour of the engine API: submit, match, poll, inspect depth.
//!
//! Run with `cargo run --example quickstart`.

use common::{Px, Qty, Ts};
use lob::{EngineConfig, EngineEvent, MatchingEngine, Order, Side};

fn main() {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let config = EngineConfig::new(10_000, 4_096, 0.01);
    let tick = config.tick_size;
    let mut engine = MatchingEngine::new(config);

    // Seed a small book.
    engine.clock().set(1_000);
    engine.submit(Order::limit(1, Side::Sell, Px::from_f64(100.05, tick), Qty::new(20), Ts::from_nanos(1_000)));
    engine.submit(Order::limit(2, Side::Sell, Px::from_f64(100.10, tick), Qty::new(15), Ts::from_nanos(1_000)));
    engine.submit(Order::limit(3, Side::Buy, Px::from_f64(99.95, tick), Qty::new(10), Ts::from_nanos(1_000)));
    engine.poll_events();

    // An aggressive buy sweeps the best ask and rests its remainder.
    engine.clock().set(2_000);
    engine.submit(Order::limit(4, Side::Buy, Px::from_f64(100.05, tick), Qty::new(25), Ts::from_nanos(2_000)));

    for event in engine.poll_events() {
        match event {
            EngineEvent::Accept(e) => println!("accept  id={} ts={}", e.id, e.ts),
            EngineEvent::Reject(e) => println!("reject  id={} reason={:?}", e.id, e.reason),
            EngineEvent::Trade(e) => println!(
                "trade   taker={} maker={} {} @ {:.2}",
                e.taker_id,
                e.maker_id,
                e.qty,
                e.price.to_f64(tick)
            ),
            EngineEvent::Cancel(e) => println!("cancel  id={} remaining={}", e.id, e.remaining),
            EngineEvent::Replace(e) => println!("replace id={} qty={}", e.id, e.new_qty),
            EngineEvent::BookTop(e) => println!(
                "top     bid={:?} ask={:?}",
                e.best_bid.map(|p| p.to_f64(tick)),
                e.best_ask.map(|p| p.to_f64(tick))
            ),
        }
    }

    println!("\ndepth:");
    let depth = engine.get_depth(5);
    for level in &depth.asks {
        println!("  ask {:>8.2} x{:<4} ({} orders)", level.price.to_f64(tick), level.qty, level.orders);
    }
    for level in &depth.bids {
        println!("  bid {:>8.2} x{:<4} ({} orders)", level.price.to_f64(tick), level.qty, level.orders);
    }
}
