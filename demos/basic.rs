//! Basic example demonstrating invocation limits and delayed calls.
//!
//! Run with `RUST_LOG=funcs=trace` to see fallbacks, scheduling and
//! suppressed calls as they happen.

use funcs::Func;
use std::thread;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_thread_names(true)
        .init();

    println!("=== Basic Combinators Example ===\n");

    let greet = Func::new(|(name,): (&'static str,)| {
        info!(name, "greeting");
        format!("hello {}", name)
    });

    // At most 3 calls get through
    println!("Calling a max_times(3) wrapper 5 times:");
    let limited = funcs::max_times(greet.clone(), 3);
    for name in ["alice", "bob", "carol", "dave", "erin"] {
        println!("  {} -> {:?}", name, limited.call((name,)));
    }

    println!();

    // Once-only initialization
    println!("Calling a once wrapper twice:");
    let init = funcs::once(Func::new(|(): ()| println!("  initialized")));
    init.call(());
    init.call(());

    println!();

    // Deferred calls return immediately and run on the timer thread
    println!("Delaying two greetings by 50ms:");
    let later = greet.delay(50);
    println!("  returned {:?}", later.call(("frank",)));
    println!("  returned {:?}", later.call(("grace",)));
    thread::sleep(Duration::from_millis(100));

    println!();

    // Invalid input never fails
    println!("Fallbacks:");
    println!(
        "  ensure(None).is_noop() = {}",
        funcs::ensure(None::<Func<(), ()>>).is_noop()
    );
    println!(
        "  max_times(f, -1).is_noop() = {}",
        funcs::max_times(greet.clone(), -1).is_noop()
    );
    println!(
        "  delay(f, -1) is f = {}",
        funcs::delay(greet.clone(), -1).ptr_eq(&greet)
    );

    let snapshot = funcs::global().metrics().snapshot();
    println!("\n=== Example Complete ===");
    println!(
        "forwarded={} suppressed={} fallbacks={} deferred={}",
        snapshot.calls_forwarded,
        snapshot.calls_suppressed,
        snapshot.fallbacks,
        snapshot.tasks_completed
    );
}
