//! Tracing listener
//!
//! Emits one `tracing` event per step lifecycle event: `debug` on start,
//! `info` on success and `warn` on failure. Hidden steps are logged at
//! `trace` unless `stride.listener.tracing.hidden` is set.

use std::any::Any;
use stride_constants::config::listener_hidden;
use stride_constants::order::MIDDLE;
use stride_core::{Config, ConfigError, ContextRef, Listener};
use stride_types::{HasAttributes, StepError, StepResult};
use tracing::{debug, info, trace, warn};

const NAME: &str = "tracing";

/// Listener logging step events through `tracing`
#[derive(Debug, Clone, Default)]
pub struct TracingListener {
    log_hidden: bool,
}

impl TracingListener {
    /// Listener skipping hidden steps at regular levels
    pub fn new() -> Self {
        Self::default()
    }

    /// Log hidden steps at the regular levels
    pub fn log_hidden(mut self, log_hidden: bool) -> Self {
        self.log_hidden = log_hidden;
        self
    }

    fn quiet(&self, step: &dyn HasAttributes) -> bool {
        !self.log_hidden && step.is_hidden()
    }
}

impl Listener for TracingListener {
    fn name(&self) -> &'static str {
        NAME
    }

    fn configure(&mut self, config: &Config) -> Result<(), ConfigError> {
        self.log_hidden = config.get_bool(&listener_hidden(NAME), self.log_hidden)?;
        Ok(())
    }

    fn order(&self) -> i32 {
        MIDDLE
    }

    fn on_step_start(&self, step: &dyn HasAttributes, _context: ContextRef<'_>) -> StepResult<()> {
        let name = step.display_name();
        if self.quiet(step) {
            trace!(step = %name, "Hidden step started");
        } else {
            debug!(step = %name, shape = %step.shape(), "Step started");
        }
        Ok(())
    }

    fn on_step_success(
        &self,
        step: &dyn HasAttributes,
        _context: ContextRef<'_>,
        result: Option<&dyn Any>,
    ) -> StepResult<()> {
        let name = step.display_name();
        if self.quiet(step) {
            trace!(step = %name, "Hidden step succeeded");
        } else {
            info!(step = %name, has_result = result.is_some(), "Step succeeded");
        }
        Ok(())
    }

    fn on_step_failure(
        &self,
        step: &dyn HasAttributes,
        _context: ContextRef<'_>,
        error: &StepError,
    ) -> StepResult<()> {
        let name = step.display_name();
        if self.quiet(step) {
            trace!(step = %name, error = %error, "Hidden step failed");
        } else {
            warn!(step = %name, error = %error, "Step failed");
        }
        Ok(())
    }
}
