//! Shared helpers for integration tests.

#![allow(dead_code)]

use funcs::{Func, Funcs};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tracing::Level;
use tracing_subscriber::Layer;

/// Arguments every counter callable expects.
pub type CounterArgs = (i32, &'static str);

/// A callable that records its arguments and returns the running call count.
#[derive(Clone)]
pub struct Counter {
    calls: Arc<AtomicUsize>,
    args: Arc<Mutex<Vec<CounterArgs>>>,
}

impl Counter {
    pub fn new() -> Self {
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
            args: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Lift the counter into a callable bound to `funcs`.
    pub fn func(&self, funcs: &Funcs) -> Func<CounterArgs, usize> {
        let counter = self.clone();
        funcs.func(move |args: CounterArgs| counter.record(args))
    }

    /// Lift the counter into a callable bound to the default instance.
    pub fn global_func(&self) -> Func<CounterArgs, usize> {
        let counter = self.clone();
        Func::new(move |args: CounterArgs| counter.record(args))
    }

    fn record(&self, args: CounterArgs) -> usize {
        self.args.lock().unwrap().push(args);
        self.calls.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn args(&self) -> Vec<CounterArgs> {
        self.args.lock().unwrap().clone()
    }
}

/// Layer that captures events for assertions.
#[derive(Clone, Default)]
pub struct CaptureLayer {
    captured: Arc<Mutex<Vec<CapturedEvent>>>,
}

#[derive(Debug, Clone)]
pub struct CapturedEvent {
    pub level: Level,
    pub message: String,
}

impl CaptureLayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_captured(&self) -> Vec<CapturedEvent> {
        self.captured.lock().unwrap().clone()
    }

    pub fn contains(&self, level: Level, needle: &str) -> bool {
        self.get_captured()
            .iter()
            .any(|e| e.level == level && e.message.contains(needle))
    }
}

impl<S> Layer<S> for CaptureLayer
where
    S: tracing::Subscriber,
{
    fn on_event(
        &self,
        event: &tracing::Event<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let mut visitor = MessageVisitor {
            message: String::new(),
        };
        event.record(&mut visitor);

        self.captured.lock().unwrap().push(CapturedEvent {
            level: *event.metadata().level(),
            message: visitor.message,
        });
    }
}

struct MessageVisitor {
    message: String,
}

impl tracing::field::Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        }
    }
}
