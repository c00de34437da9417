//! Invocation limits for wrapped callables.
//!
//! An [`InvocationLimit`] is the counter owned by a single limiter wrapper.
//! It admits up to N calls, then rejects every call after that. The counter
//! never resets. [`IntoLimit`] decides which argument values are usable
//! limits in the first place.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Conversion of a `max_times` argument into a usable limit.
///
/// Only non-negative integers qualify. Negative, fractional, non-finite and
/// absent (`None`) values map to `None`, which the combinators treat as a
/// reason to fall back to `noop`.
///
/// # Example
/// ```
/// use funcs::IntoLimit;
///
/// assert_eq!(5i32.into_limit(), Some(5));
/// assert_eq!((-1i32).into_limit(), None);
/// assert_eq!(3.0f64.into_limit(), Some(3));
/// assert_eq!(2.5f64.into_limit(), None);
/// assert_eq!(None::<usize>.into_limit(), None);
/// ```
pub trait IntoLimit {
    /// The limit, if this value is a non-negative integer.
    fn into_limit(self) -> Option<usize>;
}

macro_rules! integer_limit {
    ($($ty:ty),* $(,)?) => {
        $(
            impl IntoLimit for $ty {
                fn into_limit(self) -> Option<usize> {
                    usize::try_from(self).ok()
                }
            }
        )*
    };
}

integer_limit!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

macro_rules! float_limit {
    ($($ty:ty),* $(,)?) => {
        $(
            impl IntoLimit for $ty {
                fn into_limit(self) -> Option<usize> {
                    // The upper bound is exclusive: usize::MAX rounds up when cast
                    let integral = self.is_finite() && self.fract() == 0.0;
                    (integral && self >= 0.0 && self < usize::MAX as $ty).then(|| self as usize)
                }
            }
        )*
    };
}

float_limit!(f32, f64);

impl<T: IntoLimit> IntoLimit for Option<T> {
    fn into_limit(self) -> Option<usize> {
        self.and_then(IntoLimit::into_limit)
    }
}

/// Decision made by an invocation limit for a single call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Forward the call to the inner callable
    Forward,
    /// The limit is reached, drop the call
    Exhausted,
}

impl Admission {
    /// Check if this decision is Forward.
    pub fn is_forward(&self) -> bool {
        matches!(self, Admission::Forward)
    }

    /// Check if this decision is Exhausted.
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Admission::Exhausted)
    }
}

/// Monotonic counter that admits at most `max` calls.
///
/// Compare and increment happen in one atomic step, so concurrent callers
/// can never push the counter past `max`.
///
/// # Example
/// ```
/// use funcs::domain::limit::InvocationLimit;
///
/// let limit = InvocationLimit::new(2);
///
/// assert!(limit.try_acquire().is_forward());
/// assert!(limit.try_acquire().is_forward());
///
/// // 3rd and beyond rejected
/// assert!(limit.try_acquire().is_exhausted());
/// assert_eq!(limit.count(), 2);
/// ```
#[derive(Debug)]
pub struct InvocationLimit {
    max: usize,
    count: AtomicUsize,
}

impl InvocationLimit {
    /// Create a new limit admitting `max` calls.
    pub fn new(max: usize) -> Self {
        Self {
            max,
            count: AtomicUsize::new(0),
        }
    }

    /// Register a call and decide whether it may be forwarded.
    pub fn try_acquire(&self) -> Admission {
        let max = self.max;
        match self
            .count
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |count| {
                (count < max).then(|| count + 1)
            }) {
            Ok(_) => Admission::Forward,
            Err(_) => Admission::Exhausted,
        }
    }

    /// Number of calls admitted so far.
    pub fn count(&self) -> usize {
        self.count.load(Ordering::Acquire)
    }

    /// Maximum number of calls this limit admits.
    pub fn max(&self) -> usize {
        self.max
    }

    /// Calls still available before exhaustion.
    pub fn remaining(&self) -> usize {
        self.max.saturating_sub(self.count())
    }

    /// Check if no further calls will be admitted.
    pub fn is_exhausted(&self) -> bool {
        self.count() >= self.max
    }
}
