//! Body transforms
//!
//! Retry and repeat wrap a step body in an attempt loop. Wrapping never
//! changes the step's shape, only how many times its body runs.

pub mod repeat;
pub mod retry;

pub use repeat::{repeat, RepeatLoop};
pub use retry::{retry, RetryLoop};
