//! Application layer - the combinators themselves.
//!
//! This layer turns domain logic into callable wrappers:
//! - `Func`, the composable callable value
//! - `Funcs`, an instance exposing the seven operations
//! - Metrics for wrapper behavior
//!
//! ## Ports
//!
//! The application layer defines the `Scheduler` port that infrastructure
//! adapters implement. Deferred calls only ever see this trait.

pub mod func;
pub mod funcs;
pub mod metrics;
pub mod ports;
