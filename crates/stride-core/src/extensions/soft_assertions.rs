//! Soft assertions extension

use crate::extension::{ContextRef, Extension};
use crate::scope::soft_assertions;
use stride_constants::order::LATE;
use stride_types::{matches_any, ErrorType, HasAttributes, StepError};
use tracing::debug;

/// Defers step errors raised inside a soft assertion scope
///
/// While a scope is active on the thread, a matching error is captured into
/// the scope and the step returns without it. Errors already suppressed by an
/// earlier extension are left alone.
#[derive(Debug, Clone)]
pub struct SoftAssertionsExtension {
    capture: Vec<ErrorType>,
}

impl SoftAssertionsExtension {
    /// Capture every error
    pub fn new() -> Self {
        Self {
            capture: vec![ErrorType::any()],
        }
    }

    /// Only capture errors matching `types`
    pub fn capturing(types: Vec<ErrorType>) -> Self {
        Self { capture: types }
    }
}

impl Default for SoftAssertionsExtension {
    fn default() -> Self {
        Self::new()
    }
}

impl Extension for SoftAssertionsExtension {
    fn name(&self) -> &'static str {
        "softassert"
    }

    fn order(&self) -> i32 {
        LATE
    }

    fn throw_exception(
        &self,
        step: &dyn HasAttributes,
        _context: ContextRef<'_>,
        error: &StepError,
        thrown: bool,
    ) -> bool {
        if !thrown || !soft_assertions::is_active() || !matches_any(&self.capture, error) {
            return thrown;
        }

        debug!(step = %step.display_name(), error = %error, "Deferring soft assertion failure");
        !soft_assertions::capture(error.clone())
    }
}
