//! Soft assertion scope
//!
//! Inside a `SoftAssertionScope`, step errors selected by the soft assertion
//! extension are captured instead of returned. When the scope finishes, every
//! captured error is raised at once as a `SoftAssertionError`.
//!
//! Pending errors are kept per nesting depth on the current thread; each scope
//! owns the list at its own depth.

use std::cell::RefCell;
use std::marker::PhantomData;
use stride_types::{SoftAssertionError, StepError, StepResult};
use tracing::debug;

thread_local! {
    static PENDING: RefCell<Vec<Vec<StepError>>> = const { RefCell::new(Vec::new()) };
}

/// Guard for an active soft assertion scope
#[derive(Debug)]
#[must_use = "call finish() to raise captured errors"]
pub struct SoftAssertionScope {
    depth: usize,
    finished: bool,
    _thread_bound: PhantomData<*const ()>,
}

impl SoftAssertionScope {
    /// Depth this guard entered at, 0 for the outermost scope
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Exit the scope
    ///
    /// Captured errors come first, `block_error` last. A non-empty list is
    /// returned as one `SoftAssertionError`; the depth is released either way.
    pub fn finish(self, block_error: Option<StepError>) -> StepResult<()> {
        let depth = self.depth;
        let mut errors = self.take_errors();
        errors.extend(block_error);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(raise(depth, errors))
        }
    }

    fn take_errors(mut self) -> Vec<StepError> {
        self.finished = true;
        release(self.depth)
    }
}

impl Drop for SoftAssertionScope {
    fn drop(&mut self) {
        if !self.finished {
            release(self.depth);
        }
    }
}

fn release(depth: usize) -> Vec<StepError> {
    PENDING.with(|pending| {
        let mut pending = pending.borrow_mut();
        pending.truncate(depth + 1);
        if pending.len() == depth + 1 {
            pending.pop().unwrap_or_default()
        } else {
            Vec::new()
        }
    })
}

fn raise(depth: usize, errors: Vec<StepError>) -> StepError {
    debug!(depth = depth, errors = errors.len(), "Raising soft assertion aggregate");
    SoftAssertionError::new(errors).into()
}

/// Enter a soft assertion scope on the current thread
pub fn enter() -> SoftAssertionScope {
    let depth = PENDING.with(|pending| {
        let mut pending = pending.borrow_mut();
        pending.push(Vec::new());
        pending.len() - 1
    });

    SoftAssertionScope {
        depth,
        finished: false,
        _thread_bound: PhantomData,
    }
}

/// Capture an error at the current depth
///
/// Returns false when no scope is active, leaving the error to the caller.
pub fn capture(error: StepError) -> bool {
    PENDING.with(|pending| match pending.borrow_mut().last_mut() {
        Some(errors) => {
            errors.push(error);
            true
        }
        None => false,
    })
}

/// Current depth, `None` outside of any soft assertion scope
pub fn depth() -> Option<usize> {
    PENDING.with(|pending| pending.borrow().len().checked_sub(1))
}

/// Check whether the current thread is inside a soft assertion scope
pub fn is_active() -> bool {
    depth().is_some()
}

/// Number of errors captured at the current depth
pub fn pending_count() -> usize {
    PENDING.with(|pending| pending.borrow().last().map_or(0, Vec::len))
}

/// Run `block` inside a soft assertion scope
///
/// Returns the block's value when nothing failed, otherwise one aggregate of
/// the captured errors followed by the block's own error.
pub fn soft_assertions<F, R>(block: F) -> StepResult<R>
where
    F: FnOnce() -> StepResult<R>,
{
    let scope = enter();
    match block() {
        Ok(value) => scope.finish(None).map(|()| value),
        Err(error) => {
            let depth = scope.depth;
            let mut errors = scope.take_errors();
            errors.push(error);
            Err(raise(depth, errors))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn messages(error: &StepError) -> Vec<String> {
        error
            .downcast_ref::<SoftAssertionError>()
            .map(|aggregate| aggregate.errors().iter().map(ToString::to_string).collect())
            .unwrap_or_default()
    }

    #[test]
    fn test_aggregate_keeps_capture_order() {
        let error = soft_assertions(|| -> StepResult<()> {
            assert!(capture(StepError::msg("e1")));
            assert!(capture(StepError::msg("e2")));
            Err(StepError::msg("e3"))
        })
        .unwrap_err();

        assert_eq!(messages(&error), vec!["e1", "e2", "e3"]);
        assert_eq!(depth(), None);
    }

    #[test]
    fn test_block_error_alone_is_aggregated() {
        let error =
            soft_assertions(|| -> StepResult<()> { Err(StepError::msg("only")) }).unwrap_err();

        assert_eq!(messages(&error), vec!["only"]);
        assert_eq!(depth(), None);
    }

    #[test]
    fn test_clean_exit_is_noop() {
        assert_eq!(soft_assertions(|| Ok(5)).unwrap(), 5);
        assert_eq!(depth(), None);
    }

    #[test]
    fn test_capture_outside_scope() {
        assert!(!capture(StepError::msg("lost")));
        assert_eq!(pending_count(), 0);
    }

    #[test]
    fn test_nested_scopes_keep_separate_lists() {
        let outer = enter();
        capture(StepError::msg("outer"));

        let inner = enter();
        capture(StepError::msg("inner"));
        assert_eq!(pending_count(), 1);
        let inner_error = inner.finish(None).unwrap_err();
        assert_eq!(messages(&inner_error), vec!["inner"]);

        assert_eq!(depth(), Some(0));
        assert_eq!(pending_count(), 1);
        let outer_error = outer.finish(None).unwrap_err();
        assert_eq!(messages(&outer_error), vec!["outer"]);
        assert_eq!(depth(), None);
    }

    #[test]
    fn test_dropped_scope_releases_depth() {
        {
            let _scope = enter();
            capture(StepError::msg("dropped"));
        }

        assert_eq!(depth(), None);
    }
}
