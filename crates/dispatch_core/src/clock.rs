//! Simulation time: a UTC timeline driven by a priority event queue.
//!
//! All timestamps are timezone-aware UTC instants. The timeline advances by
//! draining due events; same-instant events are ordered by monotonically
//! increasing `id`, never by event type or subject, so draining is
//! deterministic and FIFO within an instant.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use bevy_ecs::prelude::Resource;
use chrono::{DateTime, Duration, Utc};

/// The five event types the dispatch core schedules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventType {
    OrderCreated,
    OrderReady,
    PickupDeadline,
    ExpectedDelivery,
    VehicleReturn,
}

/// What an event is about: a delivery for the first four event types, a
/// vehicle for `VehicleReturn`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventSubject {
    Delivery(String),
    Vehicle(u64),
}

/// A scheduled event. `id` is the tie-break for equal timestamps and is
/// assigned by `SimulationClock::schedule`, never by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub id: u64,
    pub event_type: EventType,
    pub timestamp: DateTime<Utc>,
    pub subject: EventSubject,
}

impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        // Min-heap by timestamp, then by id (FIFO), both reversed for BinaryHeap's max-heap.
        other
            .timestamp
            .cmp(&self.timestamp)
            .then_with(|| other.id.cmp(&self.id))
    }
}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// The event most recently popped from the queue, inserted as a resource so
/// systems can gate on it with `run_if`.
#[derive(Debug, Clone, Resource)]
pub struct CurrentEvent(pub Event);

/// Priority event queue plus the current simulation instant.
#[derive(Debug, Resource)]
pub struct SimulationClock {
    now: DateTime<Utc>,
    next_id: u64,
    events: BinaryHeap<Event>,
}

impl SimulationClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: start,
            next_id: 0,
            events: BinaryHeap::new(),
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    /// Move `now` forward without draining (used by `advance_time`).
    pub fn set_now(&mut self, at: DateTime<Utc>) {
        if at > self.now {
            self.now = at;
        }
    }

    /// Schedule an event at an absolute timestamp. Assigns the next monotonic id.
    pub fn schedule(
        &mut self,
        event_type: EventType,
        timestamp: DateTime<Utc>,
        subject: EventSubject,
    ) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.events.push(Event {
            id,
            event_type,
            timestamp,
            subject,
        });
        id
    }

    /// Schedule an event `delta` after `now`.
    pub fn schedule_in(
        &mut self,
        delta: Duration,
        event_type: EventType,
        subject: EventSubject,
    ) -> u64 {
        self.schedule(event_type, self.now + delta, subject)
    }

    /// Peek the earliest scheduled event without popping it.
    pub fn peek(&self) -> Option<&Event> {
        self.events.peek()
    }

    /// Pop the earliest event iff its timestamp is `<= now`. Advances `now`
    /// to the event's timestamp (never backward).
    pub fn pop_if_due(&mut self) -> Option<Event> {
        if self.events.peek()?.timestamp > self.now {
            return None;
        }
        let event = self.events.pop()?;
        self.now = event.timestamp;
        Some(event)
    }

    /// Timestamp of the next scheduled event without popping it.
    pub fn next_event_time(&self) -> Option<DateTime<Utc>> {
        self.events.peek().map(|event| event.timestamp)
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Number of events still in the queue (for tests and driver loops).
    pub fn pending_event_count(&self) -> usize {
        self.events.len()
    }
}
