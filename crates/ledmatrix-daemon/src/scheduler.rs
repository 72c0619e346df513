//! Time-ordered task queue for the live clock.
//!
//! The queue only knows due times. Periodic work re-enqueues itself from its
//! handler, so the clock stays aligned to minute boundaries without the
//! scheduler knowing about minutes.

use chrono::{Duration, DurationRound, NaiveDateTime};
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

/// What a task card asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskLabel {
    /// Refresh the time overlay.
    Time,
    /// Refresh the temperature overlay.
    Temperature,
    /// Show the print-done notice.
    PrintDone,
    /// Take the notice down and redraw the overlays.
    Redraw,
}

impl std::fmt::Display for TaskLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskLabel::Time => write!(f, "time"),
            TaskLabel::Temperature => write!(f, "temperature"),
            TaskLabel::PrintDone => write!(f, "print done"),
            TaskLabel::Redraw => write!(f, "redraw"),
        }
    }
}

/// A scheduled unit of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskCard {
    pub due: NaiveDateTime,
    pub label: TaskLabel,
    /// Insertion order; keeps cards with equal due times first-in first-out.
    seq: u64,
}

impl Ord for TaskCard {
    fn cmp(&self, other: &Self) -> Ordering {
        self.due
            .cmp(&other.due)
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

impl PartialOrd for TaskCard {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Min-queue of task cards keyed by due time.
#[derive(Debug, Default)]
pub struct Scheduler {
    heap: BinaryHeap<Reverse<TaskCard>>,
    next_seq: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueues a card.
    pub fn schedule(&mut self, due: NaiveDateTime, label: TaskLabel) {
        let card = TaskCard {
            due,
            label,
            seq: self.next_seq,
        };
        self.next_seq += 1;
        self.heap.push(Reverse(card));
    }

    /// The earliest card, due or not.
    pub fn peek(&self) -> Option<&TaskCard> {
        self.heap.peek().map(|Reverse(card)| card)
    }

    /// Pops the earliest card if it is due at `now`.
    pub fn pop_due(&mut self, now: NaiveDateTime) -> Option<TaskCard> {
        if self.peek()?.due <= now {
            self.heap.pop().map(|Reverse(card)| card)
        } else {
            None
        }
    }

    /// Number of queued cards with `label`.
    #[cfg(test)]
    pub fn count(&self, label: TaskLabel) -> usize {
        self.heap.iter().filter(|Reverse(c)| c.label == label).count()
    }
}

/// The first whole minute strictly after `now`.
pub fn next_minute(now: NaiveDateTime) -> NaiveDateTime {
    let floored = now
        .duration_trunc(Duration::minutes(1))
        .unwrap_or(now);
    floored + Duration::minutes(1)
}
