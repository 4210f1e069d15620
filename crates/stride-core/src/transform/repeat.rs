//! Bounded repeat

use std::sync::Arc;
use std::thread;
use stride_types::{AttemptLoop, RepeatPolicy, Step, StepResult};
use tracing::debug;

/// Attempt loop running the body exactly `count` times
#[derive(Debug, Clone)]
pub struct RepeatLoop {
    policy: RepeatPolicy,
}

impl RepeatLoop {
    /// Repeat loop driven by `policy`
    pub fn new(policy: RepeatPolicy) -> Self {
        Self { policy }
    }

    /// Policy driving this loop
    pub fn policy(&self) -> &RepeatPolicy {
        &self.policy
    }

    fn pause(&self) {
        if self.policy.delay_ms > 0 {
            thread::sleep(self.policy.delay());
        }
    }
}

impl AttemptLoop for RepeatLoop {
    fn drive(&self, attempt: &mut dyn FnMut() -> StepResult<()>) -> StepResult<()> {
        let count = self.policy.count.max(1);

        for number in 1..count {
            if let Err(error) = attempt() {
                if !self.policy.should_skip(&error) {
                    debug!(attempt = number, error = %error, "Repeat aborted on unskipped error");
                    return Err(error);
                }
                debug!(attempt = number, count = count, error = %error, "Skipping repeat failure");
            }
            self.pause();
        }

        let last = attempt();
        debug!(attempt = count, success = last.is_ok(), "Final repeat attempt finished");
        self.pause();
        last
    }
}

/// Wrap `step` so its body is repeated according to `policy`
///
/// An ineffective policy returns the step unchanged.
pub fn repeat<T: 'static, R: 'static>(step: &Step<T, R>, policy: &RepeatPolicy) -> Step<T, R> {
    if !policy.is_effective() {
        return step.clone();
    }

    step.with_body(step.body().wrap(Arc::new(RepeatLoop::new(policy.clone()))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::{Duration, Instant};
    use stride_types::{AttributeStore, ErrorType, StepError};

    fn failing_on(attempts: &'static [u32]) -> (Arc<AtomicU32>, Step<u32, u32>) {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);
        let step = Step::function(AttributeStore::new(), move |base: &u32| {
            let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
            if attempts.contains(&n) {
                Err(StepError::msg(format!("attempt {n} failed")))
            } else {
                Ok(base + n)
            }
        });
        (calls, step)
    }

    #[test]
    fn test_runs_every_attempt() {
        let (calls, step) = failing_on(&[]);
        let repeated = repeat(&step, &RepeatPolicy::new(3));

        assert_eq!(repeated.invoke(Some(&100)).unwrap(), Some(103));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_unskipped_error_aborts() {
        let (calls, step) = failing_on(&[1]);
        let repeated = repeat(&step, &RepeatPolicy::new(3));

        assert_eq!(repeated.invoke(Some(&0)).unwrap_err().to_string(), "attempt 1 failed");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_skipped_error_continues() {
        let (calls, step) = failing_on(&[2]);
        let policy = RepeatPolicy::new(3).with_skip(vec![ErrorType::any()]);

        assert_eq!(repeat(&step, &policy).invoke(Some(&0)).unwrap(), Some(3));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_final_error_surfaces_even_when_skippable() {
        let (_, step) = failing_on(&[3]);
        let policy = RepeatPolicy::new(3).with_skip(vec![ErrorType::any()]);

        let error = repeat(&step, &policy).invoke(Some(&0)).unwrap_err();
        assert_eq!(error.to_string(), "attempt 3 failed");
    }

    #[test]
    fn test_deny_wins_over_skip() {
        let (calls, step) = failing_on(&[1]);
        let policy = RepeatPolicy::new(3)
            .with_skip(vec![ErrorType::any()])
            .with_but(vec![ErrorType::any()]);

        assert!(repeat(&step, &policy).invoke(Some(&0)).is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_delay_includes_final_attempt() {
        let (calls, step) = failing_on(&[]);
        let repeated = repeat(&step, &RepeatPolicy::new(2).with_delay_ms(30));

        let started = Instant::now();
        repeated.invoke(Some(&0)).unwrap();

        // one pause between the attempts, one after the last
        assert!(started.elapsed() >= Duration::from_millis(60));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
