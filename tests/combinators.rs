//! Behavior of the seven operations, driven with virtual time.

mod common;

use common::Counter;
use funcs::{Func, FuncKind, Funcs, ManualScheduler};
use std::collections::HashMap;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn manual() -> (Funcs, ManualScheduler) {
    let scheduler = ManualScheduler::new();
    let funcs = Funcs::builder()
        .with_scheduler(Arc::new(scheduler.clone()))
        .build()
        .unwrap();
    (funcs, scheduler)
}

#[test]
fn test_noop() {
    let noop: Func<(i32,), i32> = funcs::noop();

    assert!(noop.is_noop());
    assert!(funcs::is_function(&noop));
    assert_eq!(noop.call((5,)), None);
}

#[test]
fn test_is_function() {
    let f = Func::new(|(): ()| true);

    assert!(funcs::is_function(&f));
    assert!(funcs::is_function(&Some(f)));

    fn square(x: i64) -> i64 {
        x * x
    }
    assert!(funcs::is_function(&(square as fn(i64) -> i64)));

    assert!(!funcs::is_function(&None::<Func<()>>));
    assert!(!funcs::is_function("test"));
    assert!(!funcs::is_function(&5i32));
    assert!(!funcs::is_function(&true));
    assert!(!funcs::is_function(&false));
    assert!(!funcs::is_function(&HashMap::<String, String>::new()));
}

#[test]
fn test_ensure() {
    let f = Func::new(|(): ()| true);

    assert!(funcs::ensure(None::<Func<(), bool>>).is_noop());
    assert!(funcs::ensure(f.clone()).ptr_eq(&f));
}

#[test]
fn test_max_times_scenario_five_of_seven() {
    let (funcs, _) = manual();
    let counter = Counter::new();
    let wrapped = funcs.max_times(counter.func(&funcs), 5);

    let results: Vec<Option<usize>> = (0..7).map(|_| wrapped.call((1, "test"))).collect();

    assert_eq!(
        results,
        vec![Some(1), Some(2), Some(3), Some(4), Some(5), None, None]
    );
    assert_eq!(counter.count(), 5);
}

#[test]
fn test_max_times_forwards_arguments_unmodified() {
    let (funcs, _) = manual();
    let counter = Counter::new();
    let wrapped = funcs.max_times(counter.func(&funcs), 2);

    wrapped.call((1, "first"));
    wrapped.call((2, "second"));
    wrapped.call((3, "dropped"));

    assert_eq!(counter.args(), vec![(1, "first"), (2, "second")]);
}

#[test]
fn test_max_times_zero() {
    let (funcs, _) = manual();
    let counter = Counter::new();
    let wrapped = funcs.max_times(counter.func(&funcs), 0usize);

    for _ in 0..3 {
        assert_eq!(wrapped.call((1, "test")), None);
    }
    assert_eq!(counter.count(), 0);
    assert_eq!(wrapped.kind(), FuncKind::MaxTimes { limit: 0 });
}

#[test]
fn test_max_times_invalid_limits() {
    let (funcs, _) = manual();
    let counter = Counter::new();

    assert!(funcs.max_times(counter.func(&funcs), -1).is_noop());
    assert!(funcs.max_times(counter.func(&funcs), i64::MIN).is_noop());
    assert!(funcs.max_times(None::<Func<(), ()>>, 5).is_noop());
    assert!(funcs.max_times(counter.func(&funcs), None::<i32>).is_noop());
    assert!(funcs.max_times(counter.func(&funcs), 1.5).is_noop());
    assert_eq!(funcs.metrics().fallbacks(), 5);

    // A limit given as Some(n) behaves like n
    let wrapped = funcs.max_times(counter.func(&funcs), Some(1));
    wrapped.call((1, "test"));
    wrapped.call((1, "test"));
    assert_eq!(counter.count(), 1);
}

#[test]
fn test_max_times_shared_between_threads() {
    let (funcs, _) = manual();
    let counter = Counter::new();
    let wrapped = funcs.max_times(counter.func(&funcs), 25);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let wrapped = wrapped.clone();
            thread::spawn(move || {
                (0..10)
                    .filter(|_| wrapped.call((1, "test")).is_some())
                    .count()
            })
        })
        .collect();

    let forwarded: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();

    assert_eq!(forwarded, 25);
    assert_eq!(counter.count(), 25);
}

#[test]
fn test_once_matches_max_times_one() {
    let (funcs, _) = manual();
    let counter = Counter::new();

    let once = funcs.once(counter.func(&funcs));
    assert_eq!(once.kind(), funcs.max_times(counter.func(&funcs), 1).kind());

    assert_eq!(once.call((1, "test")), Some(1));
    assert_eq!(once.call((1, "test")), None);
    assert_eq!(once.call((1, "test")), None);
    assert_eq!(counter.count(), 1);
}

#[test]
fn test_delay_negative_returns_same_callable() {
    let counter = Counter::new();
    let f = counter.global_func();

    let wrapped = funcs::delay(f.clone(), -1);
    assert!(wrapped.ptr_eq(&f));

    // Passthrough runs synchronously
    assert_eq!(wrapped.call((1, "test")), Some(1));
}

#[test]
fn test_delay_zero_runs_on_later_turn() {
    let (funcs, scheduler) = manual();
    let counter = Counter::new();
    let wrapped = funcs.delay(counter.func(&funcs), 0);

    assert_eq!(wrapped.call((1, "x")), None);
    assert_eq!(counter.count(), 0);

    scheduler.run_pending();
    assert_eq!(counter.args(), vec![(1, "x")]);
}

#[test]
fn test_delay_scenario_ten_millis() {
    let (funcs, scheduler) = manual();
    let counter = Counter::new();
    let wrapped = funcs.delay(counter.func(&funcs), 10);

    wrapped.call((1, "x"));

    scheduler.advance(Duration::from_millis(9));
    assert_eq!(counter.count(), 0);

    scheduler.advance(Duration::from_millis(1));
    assert_eq!(counter.count(), 1);
    assert_eq!(counter.args(), vec![(1, "x")]);
}

#[test]
fn test_delay_calls_are_independent_and_ordered() {
    let (funcs, scheduler) = manual();
    let counter = Counter::new();
    let wrapped = funcs.delay(counter.func(&funcs), 5);

    for i in 0..4 {
        wrapped.call((i, "x"));
    }
    scheduler.advance(Duration::from_millis(5));

    assert_eq!(counter.args(), vec![(0, "x"), (1, "x"), (2, "x"), (3, "x")]);
}

#[test]
fn test_defer_matches_delay_zero() {
    let (funcs, scheduler) = manual();
    let counter = Counter::new();

    let deferred = funcs.defer(counter.func(&funcs));
    assert_eq!(deferred.kind(), funcs.delay(counter.func(&funcs), 0).kind());

    assert_eq!(deferred.call((1, "test")), None);
    assert_eq!(counter.count(), 0);

    scheduler.run_pending();
    assert_eq!(counter.count(), 1);
}

#[test]
fn test_chain_once_then_defer() {
    let (funcs, scheduler) = manual();
    let counter = Counter::new();
    let wrapped = counter.func(&funcs).once().defer();

    wrapped.call((1, "test"));
    wrapped.call((1, "test"));
    assert_eq!(counter.count(), 0);

    scheduler.run_all();
    assert_eq!(counter.count(), 1);
}

#[test]
fn test_chain_once_then_delay() {
    let (funcs, scheduler) = manual();
    let counter = Counter::new();
    let wrapped = funcs.once(counter.func(&funcs)).delay(50);

    wrapped.call((1, "test"));
    wrapped.call((2, "test"));

    scheduler.advance(Duration::from_millis(49));
    assert_eq!(counter.count(), 0);

    scheduler.advance(Duration::from_millis(1));
    assert_eq!(counter.args(), vec![(1, "test")]);
}

#[test]
fn test_chain_delay_then_max_times() {
    let (funcs, scheduler) = manual();
    let counter = Counter::new();
    let wrapped = funcs.delay(counter.func(&funcs), 20).max_times(2);

    for _ in 0..5 {
        assert_eq!(wrapped.call((1, "test")), None);
    }
    assert_eq!(scheduler.pending(), 2);

    scheduler.run_all();
    assert_eq!(counter.count(), 2);
}

#[test]
fn test_long_chain() {
    let (funcs, scheduler) = manual();
    let counter = Counter::new();
    let wrapped = counter
        .func(&funcs)
        .max_times(3)
        .delay(10)
        .max_times(2)
        .defer()
        .once();

    for _ in 0..4 {
        wrapped.call((1, "test"));
    }

    scheduler.run_all();
    assert_eq!(counter.count(), 1);
    assert_eq!(scheduler.elapsed(), Duration::from_millis(10));
}

#[test]
fn test_chaining_on_noop_stays_noop_behavior() {
    let (funcs, scheduler) = manual();
    let noop = funcs.noop::<(i32,), i32>();

    assert!(!noop.is_chainable());
    let wrapped = noop.once().defer();
    assert_eq!(wrapped.call((1,)), None);

    scheduler.run_all();
    assert_eq!(funcs.metrics().calls_forwarded(), 1);
}

#[test]
fn test_independent_instances() {
    let (a, scheduler_a) = manual();
    let (b, scheduler_b) = manual();
    let counter = Counter::new();

    a.defer(counter.func(&a)).call((1, "a"));
    b.defer(counter.func(&b)).call((2, "b"));

    scheduler_b.run_all();
    assert_eq!(counter.args(), vec![(2, "b")]);
    assert_eq!(scheduler_a.pending(), 1);

    scheduler_a.run_all();
    assert_eq!(a.metrics().tasks_completed(), 1);
    assert_eq!(b.metrics().tasks_completed(), 1);
}
