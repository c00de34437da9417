//! # funcs
//!
//! Function wrappers that change *when* and *how often* a callable runs.
//!
//! This crate wraps a callable into a [`Func`] whose invocation is limited
//! ([`max_times`], [`once`]), deferred ([`delay`]) or moved to a later
//! scheduling turn ([`defer`]). Wrappers chain left to right, so
//! `callback.once().delay(50)` waits 50ms and then runs the once-guarded
//! callback.
//!
//! ## Quick Start
//!
//! ```rust
//! use funcs::Func;
//!
//! // Arguments are passed as a tuple
//! let greet = Func::new(|(name,): (&'static str,)| format!("hello {}", name));
//!
//! // Only the first call goes through
//! let greet_once = greet.once();
//! assert_eq!(greet_once.call(("alice",)), Some("hello alice".to_string()));
//! assert_eq!(greet_once.call(("bob",)), None);
//!
//! // Wait 50ms, then run at most twice
//! let later = greet.max_times(2).delay(50);
//! assert_eq!(later.call(("carol",)), None); // deferred calls return nothing
//! ```
//!
//! ## Operations
//!
//! | Operation | Result |
//! |---|---|
//! | [`noop()`](noop) | callable that does nothing and returns `None` |
//! | [`is_function(&v)`](is_function) | whether `v` can be invoked |
//! | [`ensure(f)`](ensure) | `f` if present, otherwise `noop` |
//! | [`max_times(f, n)`](max_times) | wrapper forwarding at most `n` calls |
//! | [`once(f)`](once) | `max_times(f, 1)` |
//! | [`delay(f, ms)`](delay) | wrapper running each call after at least `ms` milliseconds |
//! | [`defer(f)`](defer) | `delay(f, 0)` |
//!
//! Invalid input never fails. A missing callable or a limit that is not a
//! non-negative integer yields `noop`; a negative delay returns the callable
//! unwrapped:
//!
//! ```rust
//! use funcs::Func;
//!
//! let f = Func::new(|(): ()| 42);
//!
//! assert!(funcs::ensure(None::<Func<(), i32>>).is_noop());
//! assert!(funcs::max_times(f.clone(), -3).is_noop());
//! assert!(funcs::delay(f.clone(), -1).ptr_eq(&f));
//! ```
//!
//! ## Invocation Limits
//!
//! Every limiter wrapper owns a private counter that starts at 0 and never
//! resets. Once the limit is reached, the wrapper is exhausted for good. The
//! check-and-increment is a single atomic step, so a wrapper shared between
//! threads never forwards more than its limit.
//!
//! ## Deferred Execution
//!
//! `delay` and `defer` wrappers capture their arguments, hand the call to a
//! [`Scheduler`] and return `None` immediately. The inner result is
//! discarded. Every call schedules its own invocation; nothing is coalesced
//! and nothing can be cancelled. Calls with equal deadlines run in the order
//! they were made.
//!
//! ### Schedulers
//!
//! - [`ThreadScheduler`] (default): one background timer thread per instance
//! - [`TokioScheduler`] (`async` feature, on by default): a dispatcher task on a tokio runtime
//! - [`ManualScheduler`]: virtual time driven by the caller, for tests and
//!   foreign event loops
//!
//! ```rust
//! use funcs::{Funcs, ManualScheduler};
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::time::Duration;
//!
//! let scheduler = ManualScheduler::new();
//! let funcs = Funcs::builder()
//!     .with_scheduler(Arc::new(scheduler.clone()))
//!     .build()
//!     .unwrap();
//!
//! let calls = Arc::new(AtomicUsize::new(0));
//! let counter = Arc::clone(&calls);
//! let tick = funcs.func(move |(): ()| counter.fetch_add(1, Ordering::SeqCst));
//!
//! let delayed = funcs.delay(tick, 10);
//! delayed.call(());
//! delayed.call(());
//!
//! scheduler.advance(Duration::from_millis(10));
//! assert_eq!(calls.load(Ordering::SeqCst), 2);
//! ```
//!
//! ## Instances
//!
//! The free functions in this crate use a process-wide instance returned by
//! [`global()`]. Independent instances, each with their own scheduler and
//! [`Metrics`], come from [`Funcs::new`] or [`Funcs::builder`].
//!
//! ## Observability
//!
//! The crate logs through `tracing`: fallbacks to `noop` at `debug`,
//! scheduling and exhausted limiters at `trace`, and panicking deferred calls
//! at `error`. A panic inside a deferred call is caught so the scheduler
//! keeps running. Counters are available per instance:
//!
//! ```rust
//! # use funcs::Funcs;
//! let funcs = Funcs::new();
//! let once = funcs.once(funcs.func(|(): ()| ()));
//! once.call(());
//! once.call(());
//!
//! let snapshot = funcs.metrics().snapshot();
//! assert_eq!(snapshot.calls_forwarded, 1);
//! assert_eq!(snapshot.calls_suppressed, 1);
//! ```

// Domain layer - pure logic
pub mod domain;

// Application layer - combinators
pub mod application;

// Infrastructure layer - schedulers and construction
pub mod infrastructure;

pub use domain::{
    delay::DelaySpec,
    limit::{Admission, IntoLimit, InvocationLimit},
    timer::TimerQueue,
};

pub use application::{
    func::{Func, FuncKind, IsCallable},
    funcs::Funcs,
    metrics::{Metrics, MetricsSnapshot},
    ports::{Scheduler, Task},
};

pub use infrastructure::{
    builder::{global, BuildError, FuncsBuilder},
    manual::ManualScheduler,
    thread::ThreadScheduler,
};

#[cfg(feature = "async")]
pub use infrastructure::runtime::{SchedulerError, TokioScheduler};

/// The fallback callable of the default instance. See [`Funcs::noop`].
pub fn noop<A: 'static, R: 'static>() -> Func<A, R> {
    global().noop()
}

/// Check whether `value` can be invoked. See [`Funcs::is_function`].
pub fn is_function<T: IsCallable + ?Sized>(value: &T) -> bool {
    value.is_callable()
}

/// `func` if present, otherwise `noop`. See [`Funcs::ensure`].
pub fn ensure<A, R>(func: impl Into<Option<Func<A, R>>>) -> Func<A, R>
where
    A: 'static,
    R: 'static,
{
    global().ensure(func)
}

/// Wrap `func` so it is invoked at most `times` times. See [`Funcs::max_times`].
pub fn max_times<A, R, T>(func: impl Into<Option<Func<A, R>>>, times: T) -> Func<A, R>
where
    A: 'static,
    R: 'static,
    T: IntoLimit,
{
    global().max_times(func, times)
}

/// Wrap `func` so it is invoked at most once. See [`Funcs::once`].
pub fn once<A, R>(func: impl Into<Option<Func<A, R>>>) -> Func<A, R>
where
    A: 'static,
    R: 'static,
{
    global().once(func)
}

/// Wrap `func` so each call runs it after at least `delay_ms` milliseconds.
/// See [`Funcs::delay`].
pub fn delay<A, R>(func: impl Into<Option<Func<A, R>>>, delay_ms: impl Into<Option<i64>>) -> Func<A, R>
where
    A: Send + 'static,
    R: 'static,
{
    global().delay(func, delay_ms)
}

/// Wrap `func` so each call runs it on a later scheduling turn. See [`Funcs::defer`].
pub fn defer<A, R>(func: impl Into<Option<Func<A, R>>>) -> Func<A, R>
where
    A: Send + 'static,
    R: 'static,
{
    global().defer(func)
}
