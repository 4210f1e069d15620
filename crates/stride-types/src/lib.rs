//! # Stride Types
//!
//! Shared data model for the stride step execution kernel:
//! 1. Typed attribute descriptors and immutable attribute stores
//! 2. The four step shapes and their bodies
//! 3. Step errors, runtime error-type matching and the soft assertion aggregate
//! 4. Retry and repeat policies

pub mod attributes;
pub mod error;
pub mod keys;
pub mod policy;
pub mod step;

pub use attributes::{AttributeDescriptor, AttributeEntry, AttributeStore};
pub use error::{
    matches_any, AttributeError, ErrorType, ExecutionError, SoftAssertionError, StepError,
    StepResult,
};
pub use keys::Parameter;
pub use policy::{RepeatPolicy, RetryPolicy};
pub use step::{AttemptLoop, HasAttributes, Step, StepBody, StepRewrite, StepShape};
