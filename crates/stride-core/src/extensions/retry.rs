//! Retry extension

use crate::config::{Config, ConfigError};
use crate::extension::{ContextRef, Extension};
use crate::transform::RetryLoop;
use std::sync::Arc;
use stride_constants::config::{RETRY_COUNT, RETRY_DELAY};
use stride_constants::order::MID_EARLY;
use stride_types::{keys, RetryPolicy, StepResult, StepRewrite};
use tracing::debug;

/// Wraps step bodies in a `RetryLoop`
///
/// The policy comes from the step's `retry` attribute, or from the default
/// policy set programmatically or through `stride.retry.count` and
/// `stride.retry.delay`.
#[derive(Debug, Clone, Default)]
pub struct RetryExtension {
    default_policy: Option<RetryPolicy>,
}

impl RetryExtension {
    /// Retry extension without a default policy
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply `policy` to steps without a `retry` attribute
    pub fn with_default_policy(mut self, policy: RetryPolicy) -> Self {
        self.default_policy = Some(policy);
        self
    }

    /// Policy applied to steps without a retry attribute
    pub fn default_policy(&self) -> Option<&RetryPolicy> {
        self.default_policy.as_ref()
    }
}

impl Extension for RetryExtension {
    fn name(&self) -> &'static str {
        "retry"
    }

    fn configure(&mut self, config: &Config) -> Result<(), ConfigError> {
        if config.contains(RETRY_COUNT) {
            let count = config.get_u32(RETRY_COUNT, 1)?;
            let base = self
                .default_policy
                .take()
                .unwrap_or_else(|| RetryPolicy::new(count));
            self.default_policy = Some(RetryPolicy { count, ..base });
        }

        if let Some(policy) = self.default_policy.as_mut() {
            policy.delay_ms = config.get_u64(RETRY_DELAY, policy.delay_ms)?;
        }
        Ok(())
    }

    fn order(&self) -> i32 {
        MID_EARLY
    }

    fn intercept_step(&self, step: &mut dyn StepRewrite, _context: ContextRef<'_>) -> StepResult<()> {
        let policy = step
            .attributes()
            .get(&keys::retry())
            .or_else(|| self.default_policy.clone());

        if let Some(policy) = policy.filter(RetryPolicy::is_effective) {
            debug!(
                step = %step.display_name(),
                count = policy.count,
                delay_ms = policy.delay_ms,
                "Applying retry policy"
            );
            step.wrap_body(Arc::new(RetryLoop::new(policy)));
        }
        Ok(())
    }
}
