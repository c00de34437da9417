//! Ports (interfaces) for the application layer.
//!
//! In hexagonal architecture, ports define the interfaces that the application
//! layer needs. Infrastructure adapters implement these ports.

use std::fmt::Debug;
use std::time::Duration;

/// A unit of deferred work handed to a scheduler.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Port for running deferred work (the host scheduling context).
///
/// This abstraction lets `delay` and `defer` wrappers hand calls off without
/// depending on a particular runtime. Infrastructure provides concrete
/// implementations (ThreadScheduler, TokioScheduler, ManualScheduler).
///
/// Implementations must:
/// - run every task exactly once
/// - never run a task before `delay` has elapsed since `schedule` was called
/// - run tasks with equal deadlines in the order they were scheduled
/// - never block the caller of `schedule` on the task itself
pub trait Scheduler: Send + Sync + Debug {
    /// Queue `task` to run after at least `delay`.
    fn schedule(&self, delay: Duration, task: Task);
}
