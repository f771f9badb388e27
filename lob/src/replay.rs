//! Replay adapter translating recorded order flow into engine operations
//!
//! Records follow the line format
//! `timestamp_ns,action,order_id,side,price,qty,type` with real prices;
//! the adapter converts them to ticks with the engine's configured tick
//! size and sets the simulated clock to each record's timestamp before
//! dispatching. Replaying the same records into a fresh engine therefore
//! reproduces the event stream exactly.
//!
//! File I/O stays with the caller; the adapter consumes in-memory text
//! or record lists.

use crate::engine::MatchingEngine;
use crate::events::{Order, OrderType, Side};
use common::{Px, Qty, Ts};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// Parse failure for a single record line
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReplayError {
    /// Fewer comma-separated fields than the format requires
    #[error("record has {0} fields, expected at least 6")]
    MissingFields(usize),
    /// A field failed conversion
    #[error("invalid {field} field: {value:?}")]
    InvalidField {
        /// Which field failed
        field: &'static str,
        /// The offending text
        value: String,
    },
    /// Unrecognized action token
    #[error("unknown action: {0:?}")]
    UnknownAction(String),
}

/// Operation carried by one replay record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReplayAction {
    /// Submit a new order
    Add,
    /// Cancel by id
    Cancel,
    /// Replace by id with the record's price and quantity
    Replace,
}

/// One recorded order-flow message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayRecord {
    /// Record timestamp in nanoseconds
    pub timestamp_ns: u64,
    /// Operation to perform
    pub action: ReplayAction,
    /// Order id the operation targets
    pub order_id: u64,
    /// Order side
    pub side: Side,
    /// Real price; converted to ticks at dispatch time
    pub price: f64,
    /// Quantity in units
    pub qty: u64,
    /// Execution policy for `Add` records
    pub order_type: OrderType,
}

impl ReplayRecord {
    /// Parse one comma-separated line
    ///
    /// The trailing type field may be omitted and defaults to `LIMIT`.
    pub fn parse(line: &str) -> Result<Self, ReplayError> {
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        if fields.len() < 6 {
            return Err(ReplayError::MissingFields(fields.len()));
        }

        let timestamp_ns = parse_num("timestamp", fields[0])?;
        let action = parse_action(fields[1])?;
        let order_id = parse_num("order_id", fields[2])?;
        let side = parse_side(fields[3])?;
        let price = fields[4]
            .parse::<f64>()
            .map_err(|_| invalid("price", fields[4]))?;
        let qty = parse_num("qty", fields[5])?;
        let order_type = match fields.get(6) {
            Some(text) => parse_order_type(text)?,
            None => OrderType::Limit,
        };

        Ok(Self { timestamp_ns, action, order_id, side, price, qty, order_type })
    }
}

fn invalid(field: &'static str, value: &str) -> ReplayError {
    ReplayError::InvalidField { field, value: value.to_owned() }
}

fn parse_num(field: &'static str, value: &str) -> Result<u64, ReplayError> {
    value.parse().map_err(|_| invalid(field, value))
}

fn parse_action(value: &str) -> Result<ReplayAction, ReplayError> {
    if value.eq_ignore_ascii_case("ADD") || value.eq_ignore_ascii_case("SUBMIT") {
        Ok(ReplayAction::Add)
    } else if value.eq_ignore_ascii_case("CANCEL") {
        Ok(ReplayAction::Cancel)
    } else if value.eq_ignore_ascii_case("REPLACE") {
        Ok(ReplayAction::Replace)
    } else {
        Err(ReplayError::UnknownAction(value.to_owned()))
    }
}

fn parse_side(value: &str) -> Result<Side, ReplayError> {
    if value.eq_ignore_ascii_case("BUY") || value.eq_ignore_ascii_case("B") {
        Ok(Side::Buy)
    } else if value.eq_ignore_ascii_case("SELL") || value.eq_ignore_ascii_case("S") {
        Ok(Side::Sell)
    } else {
        Err(invalid("side", value))
    }
}

fn parse_order_type(value: &str) -> Result<OrderType, ReplayError> {
    if value.eq_ignore_ascii_case("LIMIT") {
        Ok(OrderType::Limit)
    } else if value.eq_ignore_ascii_case("MARKET") {
        Ok(OrderType::Market)
    } else if value.eq_ignore_ascii_case("IOC") {
        Ok(OrderType::Ioc)
    } else if value.eq_ignore_ascii_case("FOK") {
        Ok(OrderType::Fok)
    } else {
        Err(invalid("type", value))
    }
}

/// Outcome counts for a replay run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplayStats {
    /// Operations the engine processed
    pub processed: u64,
    /// Operations the engine declined (unknown cancel/replace ids)
    pub ignored: u64,
    /// Malformed lines dropped at load time
    pub skipped: u64,
}

/// Recorded order flow ready to drive an engine
#[derive(Debug, Default)]
pub struct OrderFlowReplay {
    records: Vec<ReplayRecord>,
    skipped: u64,
}

impl OrderFlowReplay {
    /// Empty session
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load records from CSV text
    ///
    /// A leading header line, blank lines and `#` comments are skipped;
    /// malformed lines are dropped with a warning and counted in
    /// [`ReplayStats::skipped`].
    #[must_use]
    pub fn from_csv(data: &str) -> Self {
        let mut session = Self::new();
        for (lineno, line) in data.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if lineno == 0 && line.starts_with("timestamp") {
                continue;
            }
            match ReplayRecord::parse(line) {
                Ok(record) => session.records.push(record),
                Err(err) => {
                    warn!(line = lineno + 1, %err, "skipping malformed replay record");
                    session.skipped += 1;
                }
            }
        }
        session
    }

    /// Append a record
    pub fn push(&mut self, record: ReplayRecord) {
        self.records.push(record);
    }

    /// Number of loaded records
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if no records are loaded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Replay every record through `engine`
    pub fn replay_all(&self, engine: &mut MatchingEngine) -> ReplayStats {
        self.replay_until(engine, u64::MAX)
    }

    /// Replay records with `timestamp_ns <= cutoff_ns` through `engine`
    ///
    /// The engine's simulated clock is set to each record's timestamp
    /// before the operation dispatches.
    pub fn replay_until(&self, engine: &mut MatchingEngine, cutoff_ns: u64) -> ReplayStats {
        let tick_size = engine.config().tick_size;
        let mut stats = ReplayStats { skipped: self.skipped, ..ReplayStats::default() };

        for record in &self.records {
            if record.timestamp_ns > cutoff_ns {
                break;
            }
            engine.clock().set(record.timestamp_ns);
            let processed = match record.action {
                ReplayAction::Add => {
                    let price = (record.order_type != OrderType::Market)
                        .then(|| Px::from_f64(record.price, tick_size));
                    engine.submit(Order {
                        id: record.order_id,
                        side: record.side,
                        price,
                        qty: Qty::new(record.qty),
                        ts: Ts::from_nanos(record.timestamp_ns),
                        order_type: record.order_type,
                    })
                }
                ReplayAction::Cancel => engine.cancel(record.order_id),
                ReplayAction::Replace => engine.replace(
                    record.order_id,
                    Px::from_f64(record.price, tick_size),
                    Qty::new(record.qty),
                ),
            };
            if processed {
                stats.processed += 1;
            } else {
                stats.ignored += 1;
            }
        }

        debug!(processed = stats.processed, ignored = stats.ignored, "replay complete");
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_full_record() {
        let record = ReplayRecord::parse("1000,ADD,42,BUY,100.25,7,IOC").unwrap();
        assert_eq!(
            record,
            ReplayRecord {
                timestamp_ns: 1000,
                action: ReplayAction::Add,
                order_id: 42,
                side: Side::Buy,
                price: 100.25,
                qty: 7,
                order_type: OrderType::Ioc,
            }
        );
    }

    #[test]
    fn type_field_defaults_to_limit() {
        let record = ReplayRecord::parse("1,CANCEL,9,SELL,0,0").unwrap();
        assert_eq!(record.action, ReplayAction::Cancel);
        assert_eq!(record.order_type, OrderType::Limit);
    }

    #[test]
    fn tolerates_case_and_whitespace() {
        let record = ReplayRecord::parse(" 5 , add , 1 , b , 99.5 , 10 , market ").unwrap();
        assert_eq!(record.action, ReplayAction::Add);
        assert_eq!(record.side, Side::Buy);
        assert_eq!(record.order_type, OrderType::Market);
    }

    #[test]
    fn rejects_malformed_lines() {
        assert_eq!(ReplayRecord::parse("1,ADD,2"), Err(ReplayError::MissingFields(3)));
        assert!(matches!(
            ReplayRecord::parse("1,NUKE,2,BUY,1.0,1,LIMIT"),
            Err(ReplayError::UnknownAction(_))
        ));
        assert!(matches!(
            ReplayRecord::parse("1,ADD,2,BUY,abc,1,LIMIT"),
            Err(ReplayError::InvalidField { field: "price", .. })
        ));
    }

    #[test]
    fn from_csv_skips_header_comments_and_junk() {
        let data = "timestamp_ns,action,order_id,side,price,qty,type\n\
                    # warmup\n\
                    1000,ADD,1,SELL,100.0,5,LIMIT\n\
                    not,a,record\n\
                    2000,ADD,2,BUY,100.0,5,LIMIT\n";
        let session = OrderFlowReplay::from_csv(data);
        assert_eq!(session.len(), 2);
        assert_eq!(session.skipped, 1);
    }
}
