//! Chained wrappers running on a tokio runtime.
//!
//! A button handler that may fire many times is guarded so the expensive
//! work runs once, 200ms after the first click.

use funcs::Funcs;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let funcs = Funcs::builder().with_tokio_runtime().build()?;

    let on_click = funcs
        .func(|(button, clicks): (&'static str, u32)| {
            info!(button, clicks, "handling click");
        })
        .once()
        .delay(200);

    for clicks in 1..=5 {
        on_click.call(("submit", clicks));
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    // Background refresh, at most 3 times, each on a later turn
    let refresh = funcs
        .func(|(round,): (u32,)| info!(round, "refreshing"))
        .max_times(3)
        .defer();

    for round in 1..=10 {
        refresh.call((round,));
    }

    tokio::time::sleep(Duration::from_millis(300)).await;

    let snapshot = funcs.metrics().snapshot();
    info!(
        forwarded = snapshot.calls_forwarded,
        suppressed = snapshot.calls_suppressed,
        completed = snapshot.tasks_completed,
        "done"
    );
    Ok(())
}
