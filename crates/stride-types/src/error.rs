//! Error handling module for stride-types
//!
//! `StepError` is the "exception" flowing through the kernel: a cheaply clonable
//! handle over an `anyhow::Error`, so that a failure can be observed by
//! listeners, captured by a soft assertion scope and still returned to the
//! caller. `ErrorType` provides the runtime "is-a" check used by retry and
//! repeat allow/deny lists.

use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Result type for step bodies and pipeline executions
pub type StepResult<T> = std::result::Result<T, StepError>;

/// Error raised by a step body, an extension or a listener
#[derive(Clone)]
pub struct StepError {
    inner: Arc<anyhow::Error>,
}

impl StepError {
    /// Wrap a concrete error value
    pub fn new<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(anyhow::Error::new(error)),
        }
    }

    /// Create an error from a printable message
    pub fn msg<M>(message: M) -> Self
    where
        M: fmt::Display + fmt::Debug + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(anyhow::Error::msg(message)),
        }
    }

    /// Wrap an existing `anyhow::Error`, keeping its context chain
    pub fn from_anyhow(error: anyhow::Error) -> Self {
        Self {
            inner: Arc::new(error),
        }
    }

    /// Borrow the underlying error as its concrete type
    pub fn downcast_ref<E>(&self) -> Option<&E>
    where
        E: fmt::Display + fmt::Debug + Send + Sync + 'static,
    {
        self.inner.downcast_ref::<E>()
    }

    /// Check whether the underlying error is of type `E`
    pub fn is<E>(&self) -> bool
    where
        E: fmt::Display + fmt::Debug + Send + Sync + 'static,
    {
        self.inner.is::<E>()
    }

    /// Identity comparison: true when both handles point at the same raised error
    pub fn same_as(&self, other: &StepError) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Borrow the wrapped `anyhow::Error`
    pub fn as_anyhow(&self) -> &anyhow::Error {
        &self.inner
    }

    /// Lowest level cause of this error
    pub fn root_cause(&self) -> &(dyn std::error::Error + 'static) {
        self.inner.root_cause()
    }
}

impl fmt::Display for StepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&*self.inner, f)
    }
}

impl fmt::Debug for StepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.inner, f)
    }
}

impl<E> From<E> for StepError
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn from(error: E) -> Self {
        Self::new(error)
    }
}

/// Runtime error type descriptor used by allow/deny lists
///
/// Rust has no inheritance, so "assignable to" is expressed as a predicate over
/// the error value. `ErrorType::of::<E>()` matches errors whose concrete type is
/// `E`; `ErrorType::any()` matches every error.
#[derive(Clone, Copy)]
pub struct ErrorType {
    name: &'static str,
    matcher: fn(&StepError) -> bool,
}

impl ErrorType {
    /// Match errors of concrete type `E`
    pub fn of<E>() -> Self
    where
        E: fmt::Display + fmt::Debug + Send + Sync + 'static,
    {
        Self {
            name: std::any::type_name::<E>(),
            matcher: is_error::<E>,
        }
    }

    /// Match every error
    pub fn any() -> Self {
        Self {
            name: "any",
            matcher: |_| true,
        }
    }

    /// Match errors accepted by a custom predicate, e.g. a family of error types
    pub fn custom(name: &'static str, matcher: fn(&StepError) -> bool) -> Self {
        Self { name, matcher }
    }

    /// Type name used in logs
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Check whether `error` is of this type
    pub fn matches(&self, error: &StepError) -> bool {
        (self.matcher)(error)
    }
}

impl fmt::Debug for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ErrorType").field(&self.name).finish()
    }
}

fn is_error<E>(error: &StepError) -> bool
where
    E: fmt::Display + fmt::Debug + Send + Sync + 'static,
{
    error.is::<E>()
}

/// Check `error` against a type list. An empty list never matches.
pub fn matches_any(types: &[ErrorType], error: &StepError) -> bool {
    types.iter().any(|t| t.matches(error))
}

/// Aggregate raised once when a soft assertion scope exits with failures
#[derive(Debug, Error)]
#[error("{} soft assertion(s) failed: {}", .errors.len(), summarize(.errors))]
pub struct SoftAssertionError {
    errors: Vec<StepError>,
}

impl SoftAssertionError {
    /// Create an aggregate from collected errors, in capture order
    pub fn new(errors: Vec<StepError>) -> Self {
        Self { errors }
    }

    /// Collected errors, deferred step errors first, block error last
    pub fn errors(&self) -> &[StepError] {
        &self.errors
    }

    /// Consume the aggregate, returning the collected errors
    pub fn into_errors(self) -> Vec<StepError> {
        self.errors
    }

    /// Number of collected errors
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Check if no error was collected
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

fn summarize(errors: &[StepError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Attribute descriptor construction errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AttributeError {
    /// A non-nullable descriptor was declared without a default value
    #[error("attribute '{key}' is not nullable but declares no default value")]
    MissingDefault { key: &'static str },
}

/// Kernel precondition failures
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExecutionError {
    /// A context-taking step was invoked without a context value
    #[error("step takes a context value but none was supplied")]
    MissingContext,

    /// An attempt loop returned success without running its attempt
    #[error("attempt loop finished without producing a result")]
    AttemptLoopWithoutResult,
}
