//! The combinator API.
//!
//! A [`Funcs`] instance owns a scheduler and a set of metrics, and exposes the
//! seven operations: `noop`, `is_function`, `ensure`, `max_times`, `once`,
//! `delay` and `defer`. Instances are independent of each other; the crate
//! root exposes the same operations on a process-wide default instance.
//!
//! Invalid input never fails: a missing callable or an unusable limit
//! degrades to `noop`, a negative delay hands the callable back unwrapped.

use crate::application::func::{Func, FuncKind, IsCallable};
use crate::application::metrics::Metrics;
use crate::application::ports::Scheduler;
use crate::domain::delay::DelaySpec;
use crate::domain::limit::{Admission, IntoLimit, InvocationLimit};
use std::panic;
use std::sync::Arc;

/// A set of function combinators bound to one scheduler.
///
/// Cloning is cheap and clones share the scheduler and metrics.
#[derive(Debug, Clone)]
pub struct Funcs {
    inner: Arc<FuncsInner>,
}

#[derive(Debug)]
struct FuncsInner {
    scheduler: Arc<dyn Scheduler>,
    metrics: Metrics,
}

impl Funcs {
    /// Create an instance that defers work onto `scheduler`.
    pub fn with_scheduler(scheduler: Arc<dyn Scheduler>) -> Self {
        Self {
            inner: Arc::new(FuncsInner {
                scheduler,
                metrics: Metrics::new(),
            }),
        }
    }

    /// The scheduler deferred calls run on.
    pub fn scheduler(&self) -> &Arc<dyn Scheduler> {
        &self.inner.scheduler
    }

    /// Metrics for every wrapper built by this instance.
    pub fn metrics(&self) -> &Metrics {
        &self.inner.metrics
    }

    /// Check if both handles refer to the same instance.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Lift a closure into a [`Func`] bound to this instance.
    ///
    /// Positional arguments are passed as a tuple.
    pub fn func<A, R, F>(&self, f: F) -> Func<A, R>
    where
        A: 'static,
        R: 'static,
        F: Fn(A) -> R + Send + Sync + 'static,
    {
        Func::from_parts(
            Arc::new(move |args: A| Some(f(args))),
            FuncKind::Plain,
            self.clone(),
        )
    }

    /// The fallback callable: accepts any arguments, does nothing, returns `None`.
    pub fn noop<A: 'static, R: 'static>(&self) -> Func<A, R> {
        Func::from_parts(Arc::new(|_: A| None::<R>), FuncKind::Noop, self.clone())
    }

    /// Check whether `value` can be invoked.
    ///
    /// ```
    /// use funcs::{Func, Funcs};
    ///
    /// let funcs = Funcs::new();
    /// assert!(funcs.is_function(&funcs.func(|(): ()| ())));
    /// assert!(!funcs.is_function(&5i32));
    /// assert!(!funcs.is_function(&None::<Func<()>>));
    /// ```
    pub fn is_function<T: IsCallable + ?Sized>(&self, value: &T) -> bool {
        value.is_callable()
    }

    /// Return `func` itself if present, otherwise `noop`.
    pub fn ensure<A, R>(&self, func: impl Into<Option<Func<A, R>>>) -> Func<A, R>
    where
        A: 'static,
        R: 'static,
    {
        match func.into() {
            Some(func) => func,
            None => self.fallback("ensure", "no callable provided"),
        }
    }

    /// Wrap `func` so it is invoked at most `times` times.
    ///
    /// The wrapper owns a private counter starting at 0. While the counter is
    /// below `times`, a call increments it and forwards the arguments to
    /// `func`, returning its result. Afterwards every call returns `None`
    /// without invoking `func`. A limit of 0 yields a wrapper that never
    /// invokes `func`.
    ///
    /// Returns `noop` if `func` is absent or `times` is absent (`None`) or not
    /// a non-negative integer. Integral floats such as `3.0` are accepted.
    ///
    /// ```
    /// use funcs::Funcs;
    ///
    /// let funcs = Funcs::new();
    /// let double = funcs.max_times(funcs.func(|(n,): (i32,)| n * 2), 2);
    ///
    /// assert_eq!(double.call((1,)), Some(2));
    /// assert_eq!(double.call((2,)), Some(4));
    /// assert_eq!(double.call((3,)), None);
    ///
    /// assert!(funcs.max_times(funcs.func(|(): ()| ()), -1).is_noop());
    /// ```
    pub fn max_times<A, R, T>(&self, func: impl Into<Option<Func<A, R>>>, times: T) -> Func<A, R>
    where
        A: 'static,
        R: 'static,
        T: IntoLimit,
    {
        let Some(inner) = func.into() else {
            return self.fallback("max_times", "no callable provided");
        };
        let Some(limit) = times.into_limit() else {
            return self.fallback("max_times", "limit is absent or not a non-negative integer");
        };

        let counter = InvocationLimit::new(limit);
        let metrics = self.metrics().clone();

        Func::from_parts(
            Arc::new(move |args: A| match counter.try_acquire() {
                Admission::Forward => {
                    metrics.record_forwarded();
                    inner.call(args)
                }
                Admission::Exhausted => {
                    metrics.record_suppressed();
                    tracing::trace!(limit, "invocation limit reached, dropping call");
                    None
                }
            }),
            FuncKind::MaxTimes { limit },
            self.clone(),
        )
    }

    /// Wrap `func` so it is invoked at most once. Same as `max_times(func, 1)`.
    pub fn once<A, R>(&self, func: impl Into<Option<Func<A, R>>>) -> Func<A, R>
    where
        A: 'static,
        R: 'static,
    {
        self.max_times(func, 1usize)
    }

    /// Wrap `func` so each call runs it after at least `delay_ms` milliseconds.
    ///
    /// Every call captures its arguments, schedules one deferred invocation
    /// and returns `None` right away; the inner result is discarded. Calls are
    /// never coalesced. A missing delay means 0.
    ///
    /// Returns `noop` if `func` is absent, and `func` itself, unwrapped, if
    /// `delay_ms` is negative.
    pub fn delay<A, R>(
        &self,
        func: impl Into<Option<Func<A, R>>>,
        delay_ms: impl Into<Option<i64>>,
    ) -> Func<A, R>
    where
        A: Send + 'static,
        R: 'static,
    {
        let Some(inner) = func.into() else {
            return self.fallback("delay", "no callable provided");
        };

        let delay = match DelaySpec::from_millis(delay_ms.into()) {
            DelaySpec::After(delay) => delay,
            DelaySpec::Passthrough => {
                tracing::debug!("negative delay, returning callable unwrapped");
                return inner;
            }
        };

        let scheduler = Arc::clone(self.scheduler());
        let metrics = self.metrics().clone();

        Func::from_parts(
            Arc::new(move |args: A| {
                let inner = inner.clone();
                let task_metrics = metrics.clone();

                metrics.record_scheduled();
                tracing::trace!(delay_ms = delay.as_millis() as u64, "scheduling deferred call");
                scheduler.schedule(
                    delay,
                    Box::new(move || {
                        run_deferred(&task_metrics, move || {
                            inner.call(args);
                        })
                    }),
                );
                None::<R>
            }),
            FuncKind::Delay { delay },
            self.clone(),
        )
    }

    /// Wrap `func` so each call runs it on a later scheduling turn. Same as `delay(func, 0)`.
    pub fn defer<A, R>(&self, func: impl Into<Option<Func<A, R>>>) -> Func<A, R>
    where
        A: Send + 'static,
        R: 'static,
    {
        self.delay(func, 0)
    }

    fn fallback<A: 'static, R: 'static>(&self, operation: &'static str, reason: &str) -> Func<A, R> {
        self.metrics().record_fallback();
        tracing::debug!(operation, reason, "invalid input, falling back to noop");
        self.noop()
    }
}

/// Run a deferred call, keeping panics inside the task.
///
/// A panicking callable must not take the scheduler down with it; the panic
/// is logged and counted instead.
fn run_deferred(metrics: &Metrics, call: impl FnOnce()) {
    match panic::catch_unwind(panic::AssertUnwindSafe(call)) {
        Ok(()) => metrics.record_completed(),
        Err(payload) => {
            metrics.record_panicked();
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            tracing::error!(panic = %message, "deferred call panicked");
        }
    }
}
