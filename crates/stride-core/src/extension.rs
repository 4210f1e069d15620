//! Extension interface
//!
//! Extensions are pluggable behaviors driven by the pipeline through every
//! lifecycle phase of a step. Each hook has a pass-through default, so an
//! extension only implements the capabilities it needs.
//!
//! Steps are seen through `HasAttributes`, context and result values as `Any`
//! so that one extension works across every step shape and value type.
//! Interceptors receive the value mutably and may replace it in place.

use crate::config::{Config, ConfigError};
use std::any::Any;
use stride_constants::order::MIDDLE;
use stride_types::{HasAttributes, StepError, StepResult, StepRewrite};

/// Optional context handed to hooks; absent for shapes without context
pub type ContextRef<'a> = Option<&'a dyn Any>;

/// A pluggable behavior around step execution
pub trait Extension: Send + Sync {
    /// Stable name, used for configuration keys and logs
    fn name(&self) -> &'static str;

    /// Read configuration once, when the pipeline is built
    fn configure(&mut self, _config: &Config) -> Result<(), ConfigError> {
        Ok(())
    }

    /// Sort key; lower runs first
    fn order(&self) -> i32 {
        MIDDLE
    }

    /// Rewrite the context value. Only called for shapes taking a context.
    fn intercept_context(&self, _step: &dyn HasAttributes, _context: &mut dyn Any) -> StepResult<()> {
        Ok(())
    }

    /// Rewrite the step's attributes or body before it runs
    fn intercept_step(&self, _step: &mut dyn StepRewrite, _context: ContextRef<'_>) -> StepResult<()> {
        Ok(())
    }

    /// Called before listeners see the step start
    fn before_start(&self, _step: &dyn HasAttributes, _context: ContextRef<'_>) -> StepResult<()> {
        Ok(())
    }

    /// Called after listeners saw the step start
    fn after_start(&self, _step: &dyn HasAttributes, _context: ContextRef<'_>) -> StepResult<()> {
        Ok(())
    }

    /// Rewrite the body's result. Only called for shapes producing a result.
    fn intercept_result(
        &self,
        _step: &dyn HasAttributes,
        _context: ContextRef<'_>,
        _result: &mut dyn Any,
    ) -> StepResult<()> {
        Ok(())
    }

    /// Called before listeners see the success
    fn before_success(
        &self,
        _step: &dyn HasAttributes,
        _context: ContextRef<'_>,
        _result: Option<&dyn Any>,
    ) -> StepResult<()> {
        Ok(())
    }

    /// Called after listeners saw the success
    fn after_success(
        &self,
        _step: &dyn HasAttributes,
        _context: ContextRef<'_>,
        _result: Option<&dyn Any>,
    ) -> StepResult<()> {
        Ok(())
    }

    /// Substitute the body's error
    fn intercept_exception(
        &self,
        _step: &dyn HasAttributes,
        _context: ContextRef<'_>,
        error: StepError,
    ) -> StepError {
        error
    }

    /// Vote on whether the error is hidden from listeners
    ///
    /// `hidden` is the running decision of the extensions ordered before this one.
    fn hide_exception(
        &self,
        _step: &dyn HasAttributes,
        _context: ContextRef<'_>,
        _error: &StepError,
        hidden: bool,
    ) -> bool {
        hidden
    }

    /// Vote on whether the error is returned to the caller
    ///
    /// `thrown` is the running decision of the extensions ordered before this one.
    fn throw_exception(
        &self,
        _step: &dyn HasAttributes,
        _context: ContextRef<'_>,
        _error: &StepError,
        thrown: bool,
    ) -> bool {
        thrown
    }

    /// Called before listeners see the failure
    fn before_failure(
        &self,
        _step: &dyn HasAttributes,
        _context: ContextRef<'_>,
        _error: &StepError,
    ) -> StepResult<()> {
        Ok(())
    }

    /// Called after listeners saw the failure
    fn after_failure(
        &self,
        _step: &dyn HasAttributes,
        _context: ContextRef<'_>,
        _error: &StepError,
    ) -> StepResult<()> {
        Ok(())
    }
}
