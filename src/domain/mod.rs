//! Domain layer - pure logic with no external dependencies.
//!
//! This layer contains the core concepts of the combinators:
//! - Invocation limits (the private counter of a limiter wrapper, and which
//!   argument values count as a limit)
//! - Delay interpretation (defer, or pass the callable through)
//! - Deadline-ordered timer queue with FIFO ties
//!
//! All types in this layer are pure and easily testable.

pub mod delay;
pub mod limit;
pub mod timer;
