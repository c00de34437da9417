//! Deadline-ordered queue of pending work.
//!
//! Entries pop in deadline order. Entries sharing a deadline pop in the order
//! they were pushed, which gives every scheduler built on this queue FIFO
//! ordering for equal delays.
//!
//! The queue is generic over the instant type so the same ordering logic
//! serves wall-clock, tokio and virtual-time schedulers.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::fmt;

struct Entry<T, J> {
    deadline: T,
    seq: u64,
    job: J,
}

impl<T: Ord, J> PartialEq for Entry<T, J> {
    fn eq(&self, other: &Self) -> bool {
        self.deadline == other.deadline && self.seq == other.seq
    }
}

impl<T: Ord, J> Eq for Entry<T, J> {}

impl<T: Ord, J> PartialOrd for Entry<T, J> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T: Ord, J> Ord for Entry<T, J> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.deadline
            .cmp(&other.deadline)
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

/// Min-ordered queue of jobs keyed by deadline, FIFO for ties.
///
/// # Example
/// ```
/// use funcs::domain::timer::TimerQueue;
///
/// let mut queue = TimerQueue::new();
/// queue.push(20u64, "late");
/// queue.push(10u64, "first");
/// queue.push(10u64, "second");
///
/// assert_eq!(queue.next_deadline(), Some(10));
/// assert_eq!(queue.pop_due(10), Some("first"));
/// assert_eq!(queue.pop_due(10), Some("second"));
///
/// // Not due yet
/// assert_eq!(queue.pop_due(15), None);
/// assert_eq!(queue.pop_due(20), Some("late"));
/// ```
pub struct TimerQueue<T, J> {
    heap: BinaryHeap<Reverse<Entry<T, J>>>,
    next_seq: u64,
}

impl<T: Ord + Copy, J> TimerQueue<T, J> {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            next_seq: 0,
        }
    }

    /// Add a job due at `deadline`.
    pub fn push(&mut self, deadline: T, job: J) {
        let seq = self.next_seq;
        self.next_seq = self.next_seq.wrapping_add(1);
        self.heap.push(Reverse(Entry { deadline, seq, job }));
    }

    /// Remove and return the earliest job if its deadline is at or before `now`.
    pub fn pop_due(&mut self, now: T) -> Option<J> {
        self.pop_due_with_deadline(now).map(|(_, job)| job)
    }

    /// Like [`pop_due`](Self::pop_due), also returning the job's deadline.
    pub fn pop_due_with_deadline(&mut self, now: T) -> Option<(T, J)> {
        match self.heap.peek() {
            Some(Reverse(entry)) if entry.deadline <= now => self
                .heap
                .pop()
                .map(|Reverse(entry)| (entry.deadline, entry.job)),
            _ => None,
        }
    }

    /// Deadline of the earliest job.
    pub fn next_deadline(&self) -> Option<T> {
        self.heap.peek().map(|Reverse(entry)| entry.deadline)
    }

    /// Number of queued jobs.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Check if the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

impl<T: Ord + Copy, J> Default for TimerQueue<T, J> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Ord + Copy + fmt::Debug, J> fmt::Debug for TimerQueue<T, J> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerQueue")
            .field("len", &self.heap.len())
            .field("next_deadline", &self.next_deadline())
            .finish()
    }
}
