//! Virtual-time timer queue driving every effect.
//!
//! Effects never sleep. A host advances a [`Scheduler`] to "now" (milliseconds
//! since startup) and receives every event that came due, in due-time order.
//! Tests pass a virtual clock; the terminal host passes elapsed wall time.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

/// Milliseconds since the page started.
pub type Millis = u64;

#[derive(Debug)]
struct Entry<E> {
    due: Millis,
    seq: u64,
    event: E,
}

impl<E> PartialEq for Entry<E> {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl<E> Eq for Entry<E> {}

impl<E> PartialOrd for Entry<E> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<E> Ord for Entry<E> {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.due, self.seq).cmp(&(other.due, other.seq))
    }
}

/// A single-threaded timer queue.
///
/// Events with equal due times fire in the order they were scheduled.
#[derive(Debug)]
pub struct Scheduler<E> {
    now: Millis,
    next_seq: u64,
    queue: BinaryHeap<Reverse<Entry<E>>>,
}

impl<E> Default for Scheduler<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Scheduler<E> {
    /// Create an empty scheduler at time zero.
    pub fn new() -> Self {
        Self::starting_at(0)
    }

    /// Create an empty scheduler whose clock starts at `now`.
    pub fn starting_at(now: Millis) -> Self {
        Self {
            now,
            next_seq: 0,
            queue: BinaryHeap::new(),
        }
    }

    /// Current scheduler time.
    ///
    /// While an event is being handled this is that event's due time, so
    /// anything scheduled from a handler is relative to when it was due
    /// rather than to when the host happened to poll.
    pub fn now(&self) -> Millis {
        self.now
    }

    /// Schedule `event` to fire `delay_ms` after the current time.
    pub fn schedule_in(&mut self, delay_ms: Millis, event: E) {
        let due = self.now.saturating_add(delay_ms);
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Reverse(Entry { due, seq, event }));
    }

    /// Pop the earliest event that is due at or before `until`.
    ///
    /// The scheduler clock moves to the popped event's due time.
    pub fn pop_due(&mut self, until: Millis) -> Option<E> {
        let due = self.queue.peek()?.0.due;
        if due > until {
            return None;
        }
        let Reverse(entry) = self.queue.pop()?;
        self.now = self.now.max(entry.due);
        Some(entry.event)
    }

    /// Move the clock forward to `now` once all due events have been drained.
    ///
    /// The clock never runs backwards.
    pub fn settle(&mut self, now: Millis) {
        self.now = self.now.max(now);
    }

    /// Due time of the next pending event, if any.
    pub fn next_due(&self) -> Option<Millis> {
        self.queue.peek().map(|Reverse(entry)| entry.due)
    }

    /// Number of pending events.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Drop every pending event.
    pub fn clear(&mut self) {
        self.queue.clear();
    }
}
