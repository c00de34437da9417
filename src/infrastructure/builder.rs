//! Construction of [`Funcs`] instances.
//!
//! [`FuncsBuilder`] picks the scheduler an instance defers work onto. By
//! default every instance gets its own [`ThreadScheduler`]; a tokio runtime or
//! any custom [`Scheduler`] can be used instead.

use crate::application::funcs::Funcs;
use crate::application::ports::Scheduler;
use crate::infrastructure::thread::{ThreadScheduler, DEFAULT_THREAD_NAME};
use std::sync::{Arc, OnceLock};

#[cfg(feature = "async")]
use crate::infrastructure::runtime::{SchedulerError, TokioScheduler};

/// Error returned when building a [`Funcs`] instance fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// Timer thread name must not be empty
    EmptyThreadName,
    /// The requested scheduler could not be created
    #[cfg(feature = "async")]
    Scheduler(SchedulerError),
}

impl std::fmt::Display for BuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuildError::EmptyThreadName => write!(f, "timer thread name must not be empty"),
            #[cfg(feature = "async")]
            BuildError::Scheduler(e) => write!(f, "scheduler error: {}", e),
        }
    }
}

impl std::error::Error for BuildError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BuildError::EmptyThreadName => None,
            #[cfg(feature = "async")]
            BuildError::Scheduler(e) => Some(e),
        }
    }
}

#[cfg(feature = "async")]
impl From<SchedulerError> for BuildError {
    fn from(e: SchedulerError) -> Self {
        BuildError::Scheduler(e)
    }
}

#[derive(Debug)]
enum SchedulerChoice {
    Thread { name: String },
    #[cfg(feature = "async")]
    TokioCurrent,
    Custom(Arc<dyn Scheduler>),
}

/// Builder for configuring a [`Funcs`] instance.
///
/// # Example
/// ```
/// use funcs::{Funcs, ManualScheduler};
/// use std::sync::Arc;
///
/// let funcs = Funcs::builder()
///     .with_thread_name("callbacks")
///     .build()
///     .unwrap();
///
/// // Or drive deferred work by hand
/// let funcs = Funcs::builder()
///     .with_scheduler(Arc::new(ManualScheduler::new()))
///     .build()
///     .unwrap();
/// ```
#[derive(Debug)]
pub struct FuncsBuilder {
    scheduler: SchedulerChoice,
}

impl FuncsBuilder {
    /// Defer work onto a custom scheduler.
    pub fn with_scheduler(mut self, scheduler: Arc<dyn Scheduler>) -> Self {
        self.scheduler = SchedulerChoice::Custom(scheduler);
        self
    }

    /// Use a dedicated timer thread with the given name (the default scheduler).
    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        self.scheduler = SchedulerChoice::Thread { name: name.into() };
        self
    }

    /// Defer work onto the tokio runtime that calls [`build`](Self::build).
    #[cfg(feature = "async")]
    pub fn with_tokio_runtime(mut self) -> Self {
        self.scheduler = SchedulerChoice::TokioCurrent;
        self
    }

    /// Build the instance.
    ///
    /// # Errors
    /// Returns `BuildError::EmptyThreadName` if the timer thread name is empty,
    /// or `BuildError::Scheduler` if a tokio runtime was requested outside one
    /// or on a runtime without timers.
    pub fn build(self) -> Result<Funcs, BuildError> {
        let scheduler: Arc<dyn Scheduler> = match self.scheduler {
            SchedulerChoice::Thread { name } => {
                if name.trim().is_empty() {
                    return Err(BuildError::EmptyThreadName);
                }
                Arc::new(ThreadScheduler::with_thread_name(name))
            }
            #[cfg(feature = "async")]
            SchedulerChoice::TokioCurrent => Arc::new(TokioScheduler::current()?),
            SchedulerChoice::Custom(scheduler) => scheduler,
        };

        Ok(Funcs::with_scheduler(scheduler))
    }
}

impl Default for FuncsBuilder {
    fn default() -> Self {
        Self {
            scheduler: SchedulerChoice::Thread {
                name: DEFAULT_THREAD_NAME.to_string(),
            },
        }
    }
}

impl Funcs {
    /// Create an independent instance with its own timer thread.
    ///
    /// Equivalent to `Funcs::builder().build()` with default settings.
    pub fn new() -> Self {
        Self::with_scheduler(Arc::new(ThreadScheduler::new()))
    }

    /// Create a builder for configuring an instance.
    pub fn builder() -> FuncsBuilder {
        FuncsBuilder::default()
    }
}

impl Default for Funcs {
    fn default() -> Self {
        Self::new()
    }
}

/// The process-wide default instance, built on first use.
///
/// The crate-root functions ([`max_times`](crate::max_times),
/// [`delay`](crate::delay), ...) and [`Func::new`](crate::Func::new) all use
/// this instance. Its timer thread is only spawned once something is deferred.
pub fn global() -> &'static Funcs {
    static GLOBAL: OnceLock<Funcs> = OnceLock::new();
    GLOBAL.get_or_init(Funcs::new)
}
