//! Retry and repeat policies
//!
//! Policies are structured values attached to steps through the `retry` and
//! `repeat` attributes. Allow/deny lists hold `ErrorType`s; a deny (`but`) match
//! always wins over an allow match.

use crate::error::{matches_any, ErrorType, StepError};
use std::time::Duration;

/// Bounded retry: run the body up to `count` times, stopping at the first success
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of attempts, first attempt included
    pub count: u32,
    /// Pause after each attempt, in milliseconds
    pub delay_ms: u64,
    /// Errors that trigger another attempt
    pub on: Vec<ErrorType>,
    /// Errors that never trigger another attempt
    pub but: Vec<ErrorType>,
}

impl RetryPolicy {
    /// Retry on any error, without delay
    pub fn new(count: u32) -> Self {
        Self {
            count,
            delay_ms: 0,
            on: vec![ErrorType::any()],
            but: Vec::new(),
        }
    }

    /// Set the delay between attempts
    pub fn with_delay_ms(mut self, delay_ms: u64) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    /// Replace the allow-list
    pub fn with_on(mut self, on: Vec<ErrorType>) -> Self {
        self.on = on;
        self
    }

    /// Replace the deny-list
    pub fn with_but(mut self, but: Vec<ErrorType>) -> Self {
        self.but = but;
        self
    }

    /// A policy with fewer than two attempts or an empty allow-list does nothing
    pub fn is_effective(&self) -> bool {
        self.count >= 2 && !self.on.is_empty()
    }

    /// Check whether a failed attempt may be retried
    pub fn should_retry(&self, error: &StepError) -> bool {
        matches_any(&self.on, error) && !matches_any(&self.but, error)
    }

    /// Delay between attempts
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

/// Bounded repeat: always run the body `count` times
#[derive(Debug, Clone)]
pub struct RepeatPolicy {
    /// Total number of attempts
    pub count: u32,
    /// Pause after each attempt, in milliseconds
    pub delay_ms: u64,
    /// Errors from non-final attempts that are skipped
    pub skip: Vec<ErrorType>,
    /// Errors that are never skipped
    pub but: Vec<ErrorType>,
}

impl RepeatPolicy {
    /// Repeat without skipping any error, without delay
    pub fn new(count: u32) -> Self {
        Self {
            count,
            delay_ms: 0,
            skip: Vec::new(),
            but: Vec::new(),
        }
    }

    /// Set the delay between attempts
    pub fn with_delay_ms(mut self, delay_ms: u64) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    /// Replace the skip-list
    pub fn with_skip(mut self, skip: Vec<ErrorType>) -> Self {
        self.skip = skip;
        self
    }

    /// Replace the deny-list
    pub fn with_but(mut self, but: Vec<ErrorType>) -> Self {
        self.but = but;
        self
    }

    /// A policy with fewer than two attempts does nothing
    pub fn is_effective(&self) -> bool {
        self.count >= 2
    }

    /// Check whether a failed non-final attempt may be skipped
    pub fn should_skip(&self, error: &StepError) -> bool {
        matches_any(&self.skip, error) && !matches_any(&self.but, error)
    }

    /// Delay between attempts
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}
