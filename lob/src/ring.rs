//! Bounded event ring drained by the engine owner

use crate::events::EngineEvent;
use std::collections::VecDeque;

/// Fixed-capacity FIFO of outbound engine events
///
/// The ring is sized once at construction and never reallocates in
/// steady state. Overflow is a contract violation (callers drain between
/// operation bursts) and panics rather than silently dropping or
/// reordering events.
#[derive(Debug)]
pub struct EventRing {
    events: VecDeque<EngineEvent>,
    capacity: usize,
}

impl EventRing {
    /// Create a ring holding at most `capacity` undrained events
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(capacity > 0, "event ring capacity must be positive");
        Self { events: VecDeque::with_capacity(capacity), capacity }
    }

    /// Append an event, keeping FIFO order
    ///
    /// # Panics
    /// Panics if the ring already holds `capacity` undrained events.
    pub fn push(&mut self, event: EngineEvent) {
        assert!(
            self.events.len() < self.capacity,
            "event ring overflow: {} undrained events",
            self.capacity
        );
        self.events.push_back(event);
    }

    /// Drain every pending event in FIFO order
    pub fn drain(&mut self) -> Vec<EngineEvent> {
        self.events.drain(..).collect()
    }

    /// Number of undrained events
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Check if no events are pending
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Configured capacity
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }
}
