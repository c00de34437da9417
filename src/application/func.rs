//! The composable callable value.
//!
//! A [`Func`] is a cheaply clonable handle to a callable taking its positional
//! arguments as a tuple `A` and producing `Option<R>`, where `None` is the
//! "no result" value returned by `noop`, by exhausted limiters and by deferred
//! wrappers.
//!
//! Wrappers remember the [`Funcs`] instance that built them, so the chaining
//! methods ([`max_times`](Func::max_times), [`once`](Func::once),
//! [`delay`](Func::delay), [`defer`](Func::defer)) wrap again with the same
//! scheduler and metrics.

use crate::application::funcs::Funcs;
use crate::domain::limit::IntoLimit;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

pub(crate) type Body<A, R> = Arc<dyn Fn(A) -> Option<R> + Send + Sync>;

/// What produced a [`Func`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FuncKind {
    /// A lifted closure, not wrapped by any combinator
    Plain,
    /// The fallback that does nothing
    Noop,
    /// An invocation limiter admitting `limit` calls
    MaxTimes {
        /// Maximum number of forwarded calls
        limit: usize,
    },
    /// A deferred-execution wrapper
    Delay {
        /// Minimum delay before the inner callable runs
        delay: Duration,
    },
}

/// A composable callable.
///
/// # Example
/// ```
/// use funcs::{Funcs, ManualScheduler};
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicUsize, Ordering};
///
/// let scheduler = ManualScheduler::new();
/// let funcs = Funcs::with_scheduler(Arc::new(scheduler.clone()));
///
/// let calls = Arc::new(AtomicUsize::new(0));
/// let counter = Arc::clone(&calls);
/// let callback = funcs.func(move |(n,): (usize,)| counter.fetch_add(n, Ordering::SeqCst));
///
/// // Deferred by 50ms, and only ever once
/// let guarded = callback.once().delay(50);
/// assert_eq!(guarded.call((1,)), None);
/// assert_eq!(guarded.call((1,)), None);
///
/// scheduler.advance(std::time::Duration::from_millis(50));
/// assert_eq!(calls.load(Ordering::SeqCst), 1);
/// ```
pub struct Func<A, R = ()> {
    body: Body<A, R>,
    kind: FuncKind,
    owner: Funcs,
}

impl<A: 'static, R: 'static> Func<A, R> {
    /// Lift a closure into a `Func` bound to the process-wide default instance.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(A) -> R + Send + Sync + 'static,
    {
        crate::global().func(f)
    }

    pub(crate) fn from_parts(body: Body<A, R>, kind: FuncKind, owner: Funcs) -> Self {
        Self { body, kind, owner }
    }

    /// Invoke the callable with a tuple of positional arguments.
    pub fn call(&self, args: A) -> Option<R> {
        (self.body)(args)
    }

    /// What produced this callable.
    pub fn kind(&self) -> FuncKind {
        self.kind
    }

    /// Check if this is the noop fallback.
    pub fn is_noop(&self) -> bool {
        self.kind == FuncKind::Noop
    }

    /// Check if this is a wrapper produced by `max_times`, `once`, `delay` or `defer`.
    ///
    /// Lifted closures, `noop` and the negative-delay passthrough are not.
    pub fn is_chainable(&self) -> bool {
        matches!(self.kind, FuncKind::MaxTimes { .. } | FuncKind::Delay { .. })
    }

    /// Check if both handles point at the same callable.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        std::ptr::eq(
            Arc::as_ptr(&self.body) as *const (),
            Arc::as_ptr(&other.body) as *const (),
        )
    }

    /// The instance that built this callable.
    pub fn owner(&self) -> &Funcs {
        &self.owner
    }

    /// Limit this callable to `times` forwarded calls.
    pub fn max_times<T: IntoLimit>(&self, times: T) -> Self {
        self.owner.max_times(self.clone(), times)
    }

    /// Limit this callable to a single forwarded call.
    pub fn once(&self) -> Self {
        self.owner.once(self.clone())
    }
}

impl<A: Send + 'static, R: 'static> Func<A, R> {
    /// Defer every call of this callable by `delay_ms` milliseconds.
    pub fn delay(&self, delay_ms: impl Into<Option<i64>>) -> Self {
        self.owner.delay(self.clone(), delay_ms)
    }

    /// Run every call of this callable on a later scheduling turn.
    pub fn defer(&self) -> Self {
        self.owner.defer(self.clone())
    }
}

impl<A, R> Clone for Func<A, R> {
    fn clone(&self) -> Self {
        Self {
            body: Arc::clone(&self.body),
            kind: self.kind,
            owner: self.owner.clone(),
        }
    }
}

impl<A, R> fmt::Debug for Func<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Func")
            .field("kind", &self.kind)
            .field("body", &Arc::as_ptr(&self.body))
            .finish()
    }
}

/// Runtime capability check: can this value be invoked?
///
/// Implemented as `true` for [`Func`] and for `fn` pointers of up to six
/// arguments, delegating for `Option` and smart pointers, and `false` for
/// plain data. Closures have unnameable types; lift them with
/// [`Funcs::func`] or [`Func::new`] first.
pub trait IsCallable {
    /// True iff the value is invocable.
    fn is_callable(&self) -> bool;
}

impl<A, R> IsCallable for Func<A, R> {
    fn is_callable(&self) -> bool {
        true
    }
}

impl<T: IsCallable> IsCallable for Option<T> {
    fn is_callable(&self) -> bool {
        self.as_ref().is_some_and(IsCallable::is_callable)
    }
}

impl<T: IsCallable + ?Sized> IsCallable for &T {
    fn is_callable(&self) -> bool {
        (**self).is_callable()
    }
}

impl<T: IsCallable + ?Sized> IsCallable for Box<T> {
    fn is_callable(&self) -> bool {
        (**self).is_callable()
    }
}

impl<T: IsCallable + ?Sized> IsCallable for Arc<T> {
    fn is_callable(&self) -> bool {
        (**self).is_callable()
    }
}

impl<T: IsCallable + ?Sized> IsCallable for Rc<T> {
    fn is_callable(&self) -> bool {
        (**self).is_callable()
    }
}

macro_rules! fn_pointer_callable {
    ($($arg:ident),*) => {
        impl<R, $($arg),*> IsCallable for fn($($arg),*) -> R {
            fn is_callable(&self) -> bool {
                true
            }
        }
    };
}

fn_pointer_callable!();
fn_pointer_callable!(A1);
fn_pointer_callable!(A1, A2);
fn_pointer_callable!(A1, A2, A3);
fn_pointer_callable!(A1, A2, A3, A4);
fn_pointer_callable!(A1, A2, A3, A4, A5);
fn_pointer_callable!(A1, A2, A3, A4, A5, A6);

macro_rules! not_callable {
    ($($ty:ty),* $(,)?) => {
        $(
            impl IsCallable for $ty {
                fn is_callable(&self) -> bool {
                    false
                }
            }
        )*
    };
}

not_callable!(
    (),
    bool,
    char,
    i8,
    i16,
    i32,
    i64,
    i128,
    isize,
    u8,
    u16,
    u32,
    u64,
    u128,
    usize,
    f32,
    f64,
    str,
    String,
);

impl<T> IsCallable for [T] {
    fn is_callable(&self) -> bool {
        false
    }
}

impl<T> IsCallable for Vec<T> {
    fn is_callable(&self) -> bool {
        false
    }
}

impl<K, V, S> IsCallable for HashMap<K, V, S> {
    fn is_callable(&self) -> bool {
        false
    }
}

impl<K, V> IsCallable for BTreeMap<K, V> {
    fn is_callable(&self) -> bool {
        false
    }
}
