//! Manually driven scheduler with virtual time.
//!
//! Nothing runs until the owner drives the scheduler with
//! [`advance`](ManualScheduler::advance), [`run_pending`](ManualScheduler::run_pending)
//! or [`run_all`](ManualScheduler::run_all). Useful for deterministic tests
//! and for hosts that run their own event loop.

use crate::application::ports::{Scheduler, Task};
use crate::domain::timer::TimerQueue;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Scheduler driven explicitly by its owner.
///
/// Time starts at zero and only moves forward when advanced. Clones share
/// the same queue and clock, so a test can keep one clone and hand another
/// to a [`Funcs`](crate::Funcs) instance.
///
/// # Examples
///
/// ```
/// use funcs::{ManualScheduler, Scheduler};
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicBool, Ordering};
/// use std::time::Duration;
///
/// let scheduler = ManualScheduler::new();
/// let ran = Arc::new(AtomicBool::new(false));
/// let flag = Arc::clone(&ran);
///
/// scheduler.schedule(Duration::from_millis(10), Box::new(move || flag.store(true, Ordering::SeqCst)));
///
/// scheduler.advance(Duration::from_millis(9));
/// assert!(!ran.load(Ordering::SeqCst));
///
/// scheduler.advance(Duration::from_millis(1));
/// assert!(ran.load(Ordering::SeqCst));
/// assert_eq!(scheduler.elapsed(), Duration::from_millis(10));
/// ```
#[derive(Clone, Default)]
pub struct ManualScheduler {
    state: Arc<Mutex<ManualState>>,
}

#[derive(Default)]
struct ManualState {
    queue: TimerQueue<Duration, Task>,
    elapsed: Duration,
}

impl ManualScheduler {
    /// Create a scheduler at virtual time zero with nothing queued.
    pub fn new() -> Self {
        Self::default()
    }

    // Tasks run outside the lock; see `run_until`.
    fn lock(&self) -> MutexGuard<'_, ManualState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Virtual time elapsed since creation.
    pub fn elapsed(&self) -> Duration {
        self.lock().elapsed
    }

    /// Number of tasks waiting to run.
    pub fn pending(&self) -> usize {
        self.lock().queue.len()
    }

    /// Move virtual time forward by `duration`, running every task that
    /// becomes due. Returns the number of tasks run.
    ///
    /// Virtual time is set to each task's deadline while it runs, so tasks
    /// scheduled from inside a task are timed relative to that deadline and
    /// run in the same call if they fall due before the target.
    pub fn advance(&self, duration: Duration) -> usize {
        let target = self.elapsed().saturating_add(duration);
        self.run_until(target)
    }

    /// Run every task due at the current virtual time. Returns the number run.
    pub fn run_pending(&self) -> usize {
        self.advance(Duration::ZERO)
    }

    /// Run tasks, jumping virtual time from deadline to deadline, until the
    /// queue is empty. Returns the number of tasks run.
    pub fn run_all(&self) -> usize {
        let mut ran = 0;
        loop {
            let next = self.lock().queue.next_deadline();
            match next {
                Some(deadline) => ran += self.run_until(deadline),
                None => return ran,
            }
        }
    }

    fn run_until(&self, target: Duration) -> usize {
        let mut ran = 0;
        loop {
            let task = {
                let mut state = self.lock();
                match state.queue.pop_due_with_deadline(target) {
                    Some((deadline, task)) => {
                        state.elapsed = state.elapsed.max(deadline);
                        task
                    }
                    None => {
                        state.elapsed = state.elapsed.max(target);
                        return ran;
                    }
                }
            };
            task();
            ran += 1;
        }
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, delay: Duration, task: Task) {
        let mut state = self.lock();
        let deadline = state.elapsed.saturating_add(delay);
        state.queue.push(deadline, task);
    }
}

impl fmt::Debug for ManualScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("ManualScheduler")
            .field("elapsed", &state.elapsed)
            .field("pending", &state.queue.len())
            .finish()
    }
}
