//! Scheduler running deferred tasks on a tokio runtime.
//!
//! A single dispatcher task owns the timer queue. New tasks arrive over an
//! unbounded channel; the dispatcher sleeps until the next deadline or the
//! next arrival, whichever comes first. Running everything from one task
//! keeps deferred calls on one logical thread and preserves FIFO order for
//! equal deadlines.
//!
//! Time is measured with `tokio::time::Instant`, so tests using a paused
//! runtime clock control the scheduler too.

use crate::application::ports::{Scheduler, Task};
use crate::domain::timer::TimerQueue;
use std::panic;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};

/// Error returned when a scheduler cannot be created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedulerError {
    /// No tokio runtime is running on the current thread
    NoRuntime,
    /// The runtime was built without the time driver (`enable_time`)
    TimersDisabled,
}

impl std::fmt::Display for SchedulerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchedulerError::NoRuntime => {
                write!(f, "no tokio runtime available on the current thread")
            }
            SchedulerError::TimersDisabled => {
                write!(f, "tokio runtime has timers disabled, build it with enable_time()")
            }
        }
    }
}

impl std::error::Error for SchedulerError {}

struct Scheduled {
    deadline: Instant,
    task: Task,
}

/// Scheduler that runs deferred tasks on a tokio runtime.
///
/// Dropping the scheduler closes the channel; the dispatcher finishes the
/// tasks already queued and then exits.
///
/// # Example
/// ```
/// use funcs::{Funcs, TokioScheduler};
/// use std::sync::Arc;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let scheduler = TokioScheduler::current().unwrap();
/// let funcs = Funcs::with_scheduler(Arc::new(scheduler));
///
/// let (tx, rx) = tokio::sync::oneshot::channel();
/// let tx = std::sync::Mutex::new(Some(tx));
/// let notify = funcs.func(move |(value,): (u32,)| {
///     if let Some(tx) = tx.lock().unwrap().take() {
///         let _ = tx.send(value);
///     }
/// });
///
/// notify.defer().call((7,));
/// assert_eq!(rx.await.unwrap(), 7);
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    sender: mpsc::UnboundedSender<Scheduled>,
}

impl TokioScheduler {
    /// Create a scheduler on the runtime the caller is running in.
    ///
    /// # Errors
    /// Returns `SchedulerError::NoRuntime` outside a tokio runtime, or
    /// `SchedulerError::TimersDisabled` if the runtime has no time driver.
    pub fn current() -> Result<Self, SchedulerError> {
        let handle = Handle::try_current().map_err(|_| SchedulerError::NoRuntime)?;
        Self::with_handle(&handle)
    }

    /// Create a scheduler that runs its dispatcher on `handle`.
    ///
    /// # Errors
    /// Returns `SchedulerError::TimersDisabled` if the runtime behind `handle`
    /// has no time driver.
    pub fn with_handle(handle: &Handle) -> Result<Self, SchedulerError> {
        if !timers_enabled(handle) {
            return Err(SchedulerError::TimersDisabled);
        }

        let (sender, receiver) = mpsc::unbounded_channel();
        handle.spawn(dispatch(receiver));
        Ok(Self { sender })
    }
}

/// Creating a timer on a runtime without the time driver panics. The
/// dispatcher must never hit that panic, so the check happens up front.
fn timers_enabled(handle: &Handle) -> bool {
    let _guard = handle.enter();
    panic::catch_unwind(|| drop(tokio::time::sleep(Duration::ZERO))).is_ok()
}

impl Scheduler for TokioScheduler {
    fn schedule(&self, delay: Duration, task: Task) {
        let scheduled = Scheduled {
            deadline: Instant::now() + delay,
            task,
        };
        if self.sender.send(scheduled).is_err() {
            tracing::error!("tokio runtime shut down, dropping deferred call");
        }
    }
}

async fn dispatch(mut receiver: mpsc::UnboundedReceiver<Scheduled>) {
    let mut queue: TimerQueue<Instant, Task> = TimerQueue::new();
    let mut open = true;

    loop {
        let now = Instant::now();
        while let Some(task) = queue.pop_due(now) {
            task();
        }

        match (queue.next_deadline(), open) {
            (Some(deadline), true) => {
                tokio::select! {
                    received = receiver.recv() => match received {
                        Some(scheduled) => queue.push(scheduled.deadline, scheduled.task),
                        None => open = false,
                    },
                    _ = sleep_until(deadline) => {}
                }
            }
            (Some(deadline), false) => sleep_until(deadline).await,
            (None, true) => match receiver.recv().await {
                Some(scheduled) => queue.push(scheduled.deadline, scheduled.task),
                None => open = false,
            },
            (None, false) => break,
        }
    }

    tracing::trace!("tokio dispatcher stopped");
}
