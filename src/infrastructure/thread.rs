//! Scheduler backed by a dedicated timer thread.
//!
//! This is the default scheduler: it needs no async runtime. A single named
//! background thread is spawned on first use and runs every deferred task, so
//! deferred work executes on one logical thread in deadline order.

use crate::application::ports::{Scheduler, Task};
use crate::domain::timer::TimerQueue;
use std::fmt;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

/// Default name of the timer thread.
pub const DEFAULT_THREAD_NAME: &str = "funcs-timer";

/// Scheduler that runs deferred tasks on one background thread.
///
/// Dropping the scheduler does not cancel anything: tasks already scheduled
/// still run, then the thread exits.
pub struct ThreadScheduler {
    shared: Arc<Shared>,
    thread_name: String,
}

struct Shared {
    state: Mutex<State>,
    wakeup: Condvar,
}

struct State {
    queue: TimerQueue<Instant, Task>,
    worker_running: bool,
    closed: bool,
}

impl Shared {
    // Tasks never run while the lock is held, so a poisoned lock still
    // guards a consistent queue.
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ThreadScheduler {
    /// Create a scheduler whose thread is named [`DEFAULT_THREAD_NAME`].
    pub fn new() -> Self {
        Self::with_thread_name(DEFAULT_THREAD_NAME)
    }

    /// Create a scheduler with a custom thread name.
    pub fn with_thread_name(name: impl Into<String>) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(State {
                    queue: TimerQueue::new(),
                    worker_running: false,
                    closed: false,
                }),
                wakeup: Condvar::new(),
            }),
            thread_name: name.into(),
        }
    }

    /// Name of the timer thread.
    pub fn thread_name(&self) -> &str {
        &self.thread_name
    }

    /// Number of tasks waiting to run.
    pub fn pending(&self) -> usize {
        self.shared.lock().queue.len()
    }

    fn spawn_worker(&self, state: &mut State) {
        let shared = Arc::clone(&self.shared);
        match thread::Builder::new()
            .name(self.thread_name.clone())
            .spawn(move || run_worker(shared))
        {
            Ok(_) => state.worker_running = true,
            Err(error) => {
                // The task stays queued; the next schedule call retries.
                tracing::error!(
                    thread = %self.thread_name,
                    %error,
                    "failed to spawn timer thread"
                );
            }
        }
    }
}

impl Scheduler for ThreadScheduler {
    fn schedule(&self, delay: Duration, task: Task) {
        let deadline = Instant::now() + delay;
        let mut state = self.shared.lock();
        state.queue.push(deadline, task);

        if !state.worker_running {
            self.spawn_worker(&mut state);
        }
        drop(state);

        self.shared.wakeup.notify_one();
    }
}

fn run_worker(shared: Arc<Shared>) {
    tracing::trace!("timer thread started");
    let mut state = shared.lock();

    loop {
        let now = Instant::now();

        if let Some(task) = state.queue.pop_due(now) {
            drop(state);
            task();
            state = shared.lock();
            continue;
        }

        match state.queue.next_deadline() {
            Some(deadline) => {
                state = shared
                    .wakeup
                    .wait_timeout(state, deadline.saturating_duration_since(now))
                    .unwrap_or_else(PoisonError::into_inner)
                    .0;
            }
            None if state.closed => break,
            None => {
                state = shared
                    .wakeup
                    .wait(state)
                    .unwrap_or_else(PoisonError::into_inner);
            }
        }
    }

    state.worker_running = false;
    tracing::trace!("timer thread stopped");
}

impl Default for ThreadScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ThreadScheduler {
    fn drop(&mut self) {
        self.shared.lock().closed = true;
        self.shared.wakeup.notify_all();
    }
}

impl fmt::Debug for ThreadScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.shared.lock();
        f.debug_struct("ThreadScheduler")
            .field("thread_name", &self.thread_name)
            .field("pending", &state.queue.len())
            .field("worker_running", &state.worker_running)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn test_runs_task_after_delay() {
        let scheduler = ThreadScheduler::new();
        let (tx, rx) = mpsc::channel();
        let start = Instant::now();

        scheduler.schedule(
            Duration::from_millis(20),
            Box::new(move || tx.send(Instant::now()).unwrap()),
        );

        let ran_at = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(ran_at.duration_since(start) >= Duration::from_millis(20));
    }

    #[test]
    fn test_equal_delays_run_in_order() {
        let scheduler = ThreadScheduler::new();
        let (tx, rx) = mpsc::channel();

        for i in 0..50 {
            let tx = tx.clone();
            scheduler.schedule(Duration::from_millis(5), Box::new(move || tx.send(i).unwrap()));
        }

        let order: Vec<i32> = (0..50)
            .map(|_| rx.recv_timeout(Duration::from_secs(5)).unwrap())
            .collect();
        assert_eq!(order, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn test_shorter_delay_runs_first() {
        let scheduler = ThreadScheduler::new();
        let (tx, rx) = mpsc::channel();

        let slow = tx.clone();
        scheduler.schedule(
            Duration::from_millis(60),
            Box::new(move || slow.send("slow").unwrap()),
        );
        scheduler.schedule(
            Duration::from_millis(10),
            Box::new(move || tx.send("fast").unwrap()),
        );

        assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap(), "fast");
        assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap(), "slow");
    }

    #[test]
    fn test_runs_on_named_thread() {
        let scheduler = ThreadScheduler::with_thread_name("custom-timer");
        let (tx, rx) = mpsc::channel();

        scheduler.schedule(
            Duration::ZERO,
            Box::new(move || {
                tx.send(thread::current().name().map(str::to_string))
                    .unwrap()
            }),
        );

        assert_eq!(
            rx.recv_timeout(Duration::from_secs(5)).unwrap().as_deref(),
            Some("custom-timer")
        );
    }

    #[test]
    fn test_drop_still_runs_scheduled_tasks() {
        let scheduler = ThreadScheduler::new();
        let (tx, rx) = mpsc::channel();

        scheduler.schedule(Duration::from_millis(30), Box::new(move || tx.send(()).unwrap()));
        drop(scheduler);

        assert!(rx.recv_timeout(Duration::from_secs(5)).is_ok());
    }
}
