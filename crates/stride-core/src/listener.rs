//! Listener interface
//!
//! Listeners are pure observers. They never rewrite steps, values or errors;
//! an error returned by a listener aborts the execution it observes.

use crate::config::{Config, ConfigError};
use crate::extension::ContextRef;
use std::any::Any;
use stride_constants::order::MIDDLE;
use stride_types::{HasAttributes, StepError, StepResult};

/// Observer of step lifecycle events
pub trait Listener: Send + Sync {
    /// Stable name, used for configuration keys and logs
    fn name(&self) -> &'static str;

    /// Read configuration once, at build time
    fn configure(&mut self, _config: &Config) -> Result<(), ConfigError> {
        Ok(())
    }

    /// Position among listeners; lower runs first
    fn order(&self) -> i32 {
        MIDDLE
    }

    /// Called before the body runs
    fn on_step_start(&self, _step: &dyn HasAttributes, _context: ContextRef<'_>) -> StepResult<()> {
        Ok(())
    }

    /// `result` is absent for shapes without a result
    fn on_step_success(
        &self,
        _step: &dyn HasAttributes,
        _context: ContextRef<'_>,
        _result: Option<&dyn Any>,
    ) -> StepResult<()> {
        Ok(())
    }

    /// Not called for errors hidden by an extension
    fn on_step_failure(
        &self,
        _step: &dyn HasAttributes,
        _context: ContextRef<'_>,
        _error: &StepError,
    ) -> StepResult<()> {
        Ok(())
    }

    /// Called once `on_step_start` was called, however the execution ends
    ///
    /// Runs after every other phase, including on hidden failures, aborted
    /// executions and panics unwinding out of the body.
    fn on_step_finished(&self, _step: &dyn HasAttributes, _context: ContextRef<'_>) {}
}
