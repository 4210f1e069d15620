//! Thread-scoped ambient state
//!
//! Each thread owns its own hidden depth and soft assertion stack. Scopes are
//! entered through guards and released when the guard drops, including during
//! unwinding.

pub mod hidden;
pub mod soft_assertions;

pub use hidden::{hidden, HiddenScope};
pub use soft_assertions::{soft_assertions, SoftAssertionScope};
