//! Interpretation of caller-supplied delays.

use std::time::Duration;

/// What a `delay` wrapper should do with a requested delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelaySpec {
    /// Schedule the call after at least this long
    After(Duration),
    /// Negative delay: hand the callable back unwrapped
    Passthrough,
}

impl DelaySpec {
    /// Parse a delay in milliseconds.
    ///
    /// A missing delay means zero. Negative values opt out of deferral.
    ///
    /// ```
    /// use funcs::domain::delay::DelaySpec;
    /// use std::time::Duration;
    ///
    /// assert_eq!(DelaySpec::from_millis(None), DelaySpec::After(Duration::ZERO));
    /// assert_eq!(DelaySpec::from_millis(Some(20)), DelaySpec::After(Duration::from_millis(20)));
    /// assert_eq!(DelaySpec::from_millis(Some(-1)), DelaySpec::Passthrough);
    /// ```
    pub fn from_millis(millis: Option<i64>) -> Self {
        match millis.unwrap_or(0) {
            ms if ms < 0 => DelaySpec::Passthrough,
            ms => DelaySpec::After(Duration::from_millis(ms.unsigned_abs())),
        }
    }

    /// The delay to schedule with, if any.
    pub fn duration(&self) -> Option<Duration> {
        match self {
            DelaySpec::After(duration) => Some(*duration),
            DelaySpec::Passthrough => None,
        }
    }
}
