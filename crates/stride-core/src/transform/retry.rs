//! Bounded retry

use std::sync::Arc;
use std::thread;
use stride_types::{AttemptLoop, RetryPolicy, Step, StepResult};
use tracing::debug;

/// Attempt loop running the body until it succeeds, at most `count` times
#[derive(Debug, Clone)]
pub struct RetryLoop {
    policy: RetryPolicy,
}

impl RetryLoop {
    /// Retry loop driven by `policy`
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    /// Policy driving this loop
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    fn pause(&self) {
        if self.policy.delay_ms > 0 {
            thread::sleep(self.policy.delay());
        }
    }
}

impl AttemptLoop for RetryLoop {
    fn drive(&self, attempt: &mut dyn FnMut() -> StepResult<()>) -> StepResult<()> {
        let count = self.policy.count.max(1);
        let mut number = 1;

        loop {
            match attempt() {
                Ok(()) => {
                    debug!(attempt = number, count = count, "Retry attempt succeeded");
                    self.pause();
                    return Ok(());
                }
                Err(error) if number < count && self.policy.should_retry(&error) => {
                    debug!(
                        attempt = number,
                        count = count,
                        error = %error,
                        "Retry attempt failed, retrying"
                    );
                    self.pause();
                    number += 1;
                }
                Err(error) => {
                    if number == count {
                        debug!(attempt = number, error = %error, "Retry attempts exhausted");
                        self.pause();
                    } else {
                        debug!(attempt = number, error = %error, "Retry aborted on non-retryable error");
                    }
                    return Err(error);
                }
            }
        }
    }
}

/// Wrap `step` so its body is retried according to `policy`
///
/// An ineffective policy returns the step unchanged.
pub fn retry<T: 'static, R: 'static>(step: &Step<T, R>, policy: &RetryPolicy) -> Step<T, R> {
    if !policy.is_effective() {
        return step.clone();
    }

    step.with_body(step.body().wrap(Arc::new(RetryLoop::new(policy.clone()))))
}
