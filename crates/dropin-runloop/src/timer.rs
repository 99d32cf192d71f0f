//! TimerQueue - deadline scheduling on a virtual clock.
//!
//! The queue never sleeps. Callers move its clock forward with
//! [`TimerQueue::advance_to`] (or [`TimerQueue::pop_due`]) and receive the
//! tasks whose deadlines have passed. The [`InspectorDriver`](crate::InspectorDriver)
//! maps wall time onto this clock; tests drive it directly.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};
use std::fmt;
use std::time::Duration;

use tracing::debug;

/// Identifier of a scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer-{}", self.0)
    }
}

/// Smallest interval a repeating timer may use.
const MIN_INTERVAL: Duration = Duration::from_millis(1);

#[derive(Debug, Clone)]
struct Entry<T> {
    id: TimerId,
    deadline: Duration,
    /// Insertion sequence; breaks deadline ties.
    seq: u64,
    interval: Option<Duration>,
    task: T,
}

impl<T> PartialEq for Entry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.seq == other.seq
    }
}

impl<T> Eq for Entry<T> {}

impl<T> PartialOrd for Entry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Entry<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order: earliest deadline first, then earliest insertion
        (other.deadline, other.seq).cmp(&(self.deadline, self.seq))
    }
}

/// Deadline-ordered queue of one-shot and repeating tasks.
///
/// Cancelled entries stay in the heap until they reach the top; `live` maps
/// each pending id to the sequence number of its current entry. The top of
/// the heap is always live.
#[derive(Debug, Clone)]
pub struct TimerQueue<T> {
    now: Duration,
    next_id: u64,
    next_seq: u64,
    heap: BinaryHeap<Entry<T>>,
    live: HashMap<TimerId, u64>,
}

impl<T: Clone> Default for TimerQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> TimerQueue<T> {
    /// Create an empty queue with its clock at zero.
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            next_id: 0,
            next_seq: 0,
            heap: BinaryHeap::new(),
            live: HashMap::new(),
        }
    }

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Schedule `task` to fire once, `delay` after now.
    pub fn schedule(&mut self, delay: Duration, task: T) -> TimerId {
        self.insert(delay, None, task)
    }

    /// Schedule `task` to fire every `interval`, first after one interval.
    pub fn schedule_repeating(&mut self, interval: Duration, task: T) -> TimerId {
        let interval = interval.max(MIN_INTERVAL);
        self.insert(interval, Some(interval), task)
    }

    /// Cancel a timer. Returns false if it was not scheduled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let cancelled = self.live.remove(&id).is_some();
        if cancelled {
            self.discard_stale();
            debug!("Timer {} cancelled", id);
        }
        cancelled
    }

    /// Cancel `previous` (if any) and schedule `task` after `delay`.
    pub fn reschedule(&mut self, previous: Option<TimerId>, delay: Duration, task: T) -> TimerId {
        if let Some(id) = previous {
            self.cancel(id);
        }
        self.schedule(delay, task)
    }

    /// Check whether a timer is still pending.
    pub fn is_scheduled(&self, id: TimerId) -> bool {
        self.live.contains_key(&id)
    }

    /// Earliest pending deadline.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.heap.peek().map(|entry| entry.deadline)
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Remove and return the earliest task due at or before `now`.
    ///
    /// The clock moves to that task's deadline, so anything scheduled while
    /// handling it is timed from the moment it fired. Repeating timers are
    /// re-armed one interval later under the same id.
    pub fn pop_due(&mut self, now: Duration) -> Option<(TimerId, T)> {
        if self.heap.peek()?.deadline > now {
            return None;
        }
        let entry = self.heap.pop()?;
        self.now = self.now.max(entry.deadline);

        match entry.interval {
            Some(interval) => {
                let seq = self.bump_seq();
                self.live.insert(entry.id, seq);
                self.heap.push(Entry {
                    id: entry.id,
                    deadline: entry.deadline + interval,
                    seq,
                    interval: Some(interval),
                    task: entry.task.clone(),
                });
            }
            None => {
                self.live.remove(&entry.id);
            }
        }
        self.discard_stale();

        debug!("Timer {} fired at {:?}", entry.id, entry.deadline);
        Some((entry.id, entry.task))
    }

    /// Move the clock to `now` and return every task that became due,
    /// ordered by deadline then insertion.
    pub fn advance_to(&mut self, now: Duration) -> Vec<T> {
        let mut due = Vec::new();
        while let Some((_, task)) = self.pop_due(now) {
            due.push(task);
        }
        self.settle(now);
        due
    }

    /// Move the clock to `now` without firing anything.
    ///
    /// Only call this once every task due at `now` has been popped.
    pub fn settle(&mut self, now: Duration) {
        self.now = self.now.max(now);
    }

    fn insert(&mut self, delay: Duration, interval: Option<Duration>, task: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        let seq = self.bump_seq();
        let deadline = self.now + delay;
        self.live.insert(id, seq);
        self.heap.push(Entry {
            id,
            deadline,
            seq,
            interval,
            task,
        });
        debug!("Timer {} scheduled for {:?}", id, deadline);
        id
    }

    /// Pop cancelled entries until the top of the heap is live.
    fn discard_stale(&mut self) {
        while let Some(top) = self.heap.peek() {
            if self.live.get(&top.id) == Some(&top.seq) {
                break;
            }
            self.heap.pop();
        }
    }

    fn bump_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }
}

#[cfg(test)]
#[path = "timer_tests.rs"]
mod tests;
