//! Repeat extension

use crate::config::{Config, ConfigError};
use crate::extension::{ContextRef, Extension};
use crate::transform::RepeatLoop;
use std::sync::Arc;
use stride_constants::config::{REPEAT_COUNT, REPEAT_DELAY};
use stride_constants::order::MIDDLE;
use stride_types::{keys, RepeatPolicy, StepResult, StepRewrite};
use tracing::debug;

/// Wraps step bodies in a `RepeatLoop`
///
/// Runs after `RetryExtension`, so each repetition retries on its own.
#[derive(Debug, Clone, Default)]
pub struct RepeatExtension {
    default_policy: Option<RepeatPolicy>,
}

impl RepeatExtension {
    /// Repeat extension without a default policy
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply `policy` to steps without a `repeat` attribute
    pub fn with_default_policy(mut self, policy: RepeatPolicy) -> Self {
        self.default_policy = Some(policy);
        self
    }

    /// Policy applied to steps without a repeat attribute
    pub fn default_policy(&self) -> Option<&RepeatPolicy> {
        self.default_policy.as_ref()
    }
}

impl Extension for RepeatExtension {
    fn name(&self) -> &'static str {
        "repeat"
    }

    fn configure(&mut self, config: &Config) -> Result<(), ConfigError> {
        if config.contains(REPEAT_COUNT) {
            let count = config.get_u32(REPEAT_COUNT, 1)?;
            let base = self
                .default_policy
                .take()
                .unwrap_or_else(|| RepeatPolicy::new(count));
            self.default_policy = Some(RepeatPolicy { count, ..base });
        }

        if let Some(policy) = self.default_policy.as_mut() {
            policy.delay_ms = config.get_u64(REPEAT_DELAY, policy.delay_ms)?;
        }
        Ok(())
    }

    fn order(&self) -> i32 {
        MIDDLE
    }

    fn intercept_step(&self, step: &mut dyn StepRewrite, _context: ContextRef<'_>) -> StepResult<()> {
        let policy = step
            .attributes()
            .get(&keys::repeat())
            .or_else(|| self.default_policy.clone());

        if let Some(policy) = policy.filter(RepeatPolicy::is_effective) {
            debug!(
                step = %step.display_name(),
                count = policy.count,
                delay_ms = policy.delay_ms,
                "Applying repeat policy"
            );
            step.wrap_body(Arc::new(RepeatLoop::new(policy)));
        }
        Ok(())
    }
}
