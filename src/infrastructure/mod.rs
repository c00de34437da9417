//! Infrastructure layer - scheduler adapters and construction.
//!
//! This layer provides adapters for:
//! - A dedicated timer thread (default scheduler)
//! - Tokio runtimes (`async` feature)
//! - Manually driven virtual time (tests, embedding in foreign event loops)
//! - Builder for configuring instances, and the process-wide default

pub mod builder;
pub mod manual;
pub mod thread;

#[cfg(feature = "async")]
pub mod runtime;
