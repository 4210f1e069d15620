//! Tests for the built-in extensions running inside a pipeline

#[path = "common/mod.rs"]
mod common;

use common::{init_tracing, Journal, JournalListener};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use stride_core::extensions::{RepeatExtension, RetryExtension, SoftAssertionsExtension};
use stride_core::scope::{hidden, soft_assertions};
use stride_core::{default_extensions, Config, ContextRef, ExecutionPipeline, Listener};
use stride_types::{
    keys, AttributeStore, ErrorType, HasAttributes, RepeatPolicy, RetryPolicy, SoftAssertionError,
    Step, StepError, StepResult,
};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("assertion failed: {0}")]
struct AssertionFailed(&'static str);

fn default_pipeline(journal: &Journal) -> ExecutionPipeline {
    ExecutionPipeline::builder()
        .extensions(default_extensions())
        .listener(JournalListener::new("journal", 0, journal))
        .build()
        .unwrap()
}

/// Supplier failing on the first `failures` calls, then returning the call number
fn flaky(failures: u32) -> (Arc<AtomicU32>, Step<(), u32>) {
    let calls = Arc::new(AtomicU32::new(0));
    let counter = Arc::clone(&calls);
    let step = Step::supplier(AttributeStore::new(), move || {
        let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
        if n <= failures {
            Err(StepError::msg(format!("attempt {n} failed")))
        } else {
            Ok(n)
        }
    });
    (calls, step)
}

fn failing(message: &'static str) -> Step {
    Step::runnable(AttributeStore::new(), move || Err(AssertionFailed(message).into()))
}

#[test]
fn test_default_extension_order() {
    let pipeline = default_pipeline(&Journal::new());

    assert_eq!(
        pipeline.extension_names(),
        vec!["hidden", "retry", "repeat", "softassert"]
    );
}

#[test]
fn test_retry_attribute_until_success() {
    init_tracing();
    let journal = Journal::new();
    let pipeline = default_pipeline(&journal);
    let (calls, step) = flaky(1);
    let step = step.with_attribute(&keys::retry(), RetryPolicy::new(3));

    assert_eq!(pipeline.supply(&step).unwrap(), Some(2));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(journal.phase("on_step_start"), vec!["journal"]);
    assert_eq!(journal.phase("on_step_success"), vec!["journal"]);
}

#[test]
fn test_retry_exhausted_surfaces_last_error() {
    let journal = Journal::new();
    let pipeline = default_pipeline(&journal);
    let (calls, step) = flaky(u32::MAX);
    let step = step.with_attribute(&keys::retry(), RetryPolicy::new(2));

    let error = pipeline.supply(&step).unwrap_err();

    assert_eq!(error.to_string(), "attempt 2 failed");
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(journal.phase("on_step_failure"), vec!["journal"]);
}

#[test]
fn test_repeat_attribute_runs_every_time() {
    let pipeline = default_pipeline(&Journal::new());
    let (calls, step) = flaky(0);
    let step = step.with_attribute(&keys::repeat(), RepeatPolicy::new(3));

    assert_eq!(pipeline.supply(&step).unwrap(), Some(3));
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[test]
fn test_each_repetition_retries() {
    let pipeline = default_pipeline(&Journal::new());
    let calls = Arc::new(AtomicU32::new(0));
    let counter = Arc::clone(&calls);
    // odd calls fail, even calls succeed
    let step = Step::runnable(AttributeStore::new(), move || {
        if counter.fetch_add(1, Ordering::SeqCst) % 2 == 0 {
            Err(StepError::msg("odd call"))
        } else {
            Ok(())
        }
    })
    .with_attribute(&keys::retry(), RetryPolicy::new(2))
    .with_attribute(&keys::repeat(), RepeatPolicy::new(2));

    pipeline.run(&step).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 4);
}

#[test]
fn test_configured_default_policies() {
    let config = Config::new()
        .set("stride.retry.count", 3)
        .set("stride.repeat.count", 2);
    let pipeline = ExecutionPipeline::builder()
        .config(config)
        .extension(RetryExtension::new())
        .extension(RepeatExtension::new())
        .build()
        .unwrap();
    let (calls, step) = flaky(2);

    // first repetition retries twice, second succeeds at once
    assert_eq!(pipeline.supply(&step).unwrap(), Some(4));
    assert_eq!(calls.load(Ordering::SeqCst), 4);
}

#[test]
fn test_attribute_policy_wins_over_default() {
    let pipeline = ExecutionPipeline::builder()
        .extension(RetryExtension::new().with_default_policy(RetryPolicy::new(5)))
        .build()
        .unwrap();
    let (calls, step) = flaky(u32::MAX);
    let step = step.with_attribute(&keys::retry(), RetryPolicy::new(1));

    assert!(pipeline.supply(&step).is_err());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

/// Records whether each started step was hidden
#[derive(Clone, Default)]
struct HiddenMarks(Arc<Mutex<Vec<bool>>>);

impl Listener for HiddenMarks {
    fn name(&self) -> &'static str {
        "hidden-marks"
    }

    fn on_step_start(&self, step: &dyn HasAttributes, _context: ContextRef<'_>) -> StepResult<()> {
        self.0.lock().unwrap().push(step.is_hidden());
        Ok(())
    }
}

#[test]
fn test_hidden_scope_marks_steps() {
    let marks = HiddenMarks::default();
    let pipeline = ExecutionPipeline::builder()
        .extensions(default_extensions())
        .listener(marks.clone())
        .build()
        .unwrap();
    let step = Step::runnable(AttributeStore::new(), || Ok(()));

    pipeline.run(&step).unwrap();
    {
        let outer = hidden::enter();
        let inner = hidden::enter();
        pipeline.run(&step).unwrap();
        inner.exit();
        pipeline.run(&step).unwrap();
        outer.exit();
    }
    pipeline.run(&step).unwrap();

    assert_eq!(*marks.0.lock().unwrap(), vec![false, true, true, false]);
    assert_eq!(hidden::depth(), None);
    assert!(!step.is_hidden());
}

#[test]
fn test_hidden_scope_is_thread_local() {
    let marks = HiddenMarks::default();
    let pipeline = Arc::new(
        ExecutionPipeline::builder()
            .extensions(default_extensions())
            .listener(marks.clone())
            .build()
            .unwrap(),
    );

    hidden::hidden(|| {
        let pipeline = Arc::clone(&pipeline);
        std::thread::spawn(move || {
            assert!(!hidden::is_active());
            let step = Step::runnable(AttributeStore::new(), || Ok(()));
            pipeline.run(&step).unwrap();
        })
        .join()
        .unwrap();
    });

    assert_eq!(*marks.0.lock().unwrap(), vec![false]);
}

fn aggregate_messages(error: &StepError) -> Vec<String> {
    error
        .downcast_ref::<SoftAssertionError>()
        .map(|aggregate| aggregate.errors().iter().map(ToString::to_string).collect())
        .unwrap_or_default()
}

#[test]
fn test_soft_assertions_aggregate_step_and_block_errors() {
    let journal = Journal::new();
    let pipeline = default_pipeline(&journal);

    let error = soft_assertions::soft_assertions(|| -> StepResult<()> {
        pipeline.run(&failing("e1"))?;
        pipeline.run(&failing("e2"))?;
        assert_eq!(soft_assertions::pending_count(), 2);
        Err(StepError::msg("e3"))
    })
    .unwrap_err();

    assert_eq!(
        aggregate_messages(&error),
        vec!["assertion failed: e1", "assertion failed: e2", "e3"]
    );
    // deferred failures are still reported
    assert_eq!(journal.phase("on_step_failure").len(), 2);
    assert_eq!(soft_assertions::depth(), None);
}

#[test]
fn test_soft_assertions_clean_block() {
    let pipeline = default_pipeline(&Journal::new());
    let step = Step::supplier(AttributeStore::new(), || Ok(7));

    let value = soft_assertions::soft_assertions(|| pipeline.supply(&step)).unwrap();

    assert_eq!(value, Some(7));
    assert_eq!(soft_assertions::depth(), None);
}

#[test]
fn test_soft_assertions_state_cleared_after_panic() {
    let pipeline = default_pipeline(&Journal::new());

    let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        soft_assertions::soft_assertions(|| -> StepResult<()> {
            pipeline.run(&failing("e1"))?;
            panic!("block panicked");
        })
    }));

    assert!(outcome.is_err());
    assert_eq!(soft_assertions::depth(), None);
}

#[test]
fn test_soft_assertions_only_capture_configured_types() {
    let pipeline = ExecutionPipeline::builder()
        .extension(SoftAssertionsExtension::capturing(vec![
            ErrorType::of::<AssertionFailed>(),
        ]))
        .build()
        .unwrap();
    let io_like = Step::runnable(AttributeStore::new(), || Err(StepError::msg("io failure")));

    let error = soft_assertions::soft_assertions(|| -> StepResult<()> {
        pipeline.run(&failing("captured"))?;
        pipeline.run(&io_like)?;
        Ok(())
    })
    .unwrap_err();

    assert_eq!(
        aggregate_messages(&error),
        vec!["assertion failed: captured", "io failure"]
    );
}

#[test]
fn test_errors_thrown_outside_soft_assertion_scope() {
    let pipeline = default_pipeline(&Journal::new());

    let error = pipeline.run(&failing("plain")).unwrap_err();

    assert!(error.is::<AssertionFailed>());
}

#[test]
fn test_soft_assertion_scopes_are_thread_local() {
    let pipeline = Arc::new(default_pipeline(&Journal::new()));

    let error = soft_assertions::soft_assertions(|| -> StepResult<()> {
        pipeline.run(&failing("local"))?;
        let other = Arc::clone(&pipeline);
        let thrown = std::thread::spawn(move || other.run(&failing("remote")).is_err())
            .join()
            .unwrap();
        assert!(thrown);
        Ok(())
    })
    .unwrap_err();

    assert_eq!(aggregate_messages(&error), vec!["assertion failed: local"]);
}

#[test]
fn test_nested_soft_assertion_scopes_capture_at_inner_depth() {
    let pipeline = default_pipeline(&Journal::new());

    let error = soft_assertions::soft_assertions(|| -> StepResult<()> {
        pipeline.run(&failing("outer-1"))?;

        let inner = soft_assertions::soft_assertions(|| -> StepResult<()> {
            assert_eq!(soft_assertions::depth(), Some(1));
            pipeline.run(&failing("inner-1"))?;
            assert_eq!(soft_assertions::pending_count(), 1);
            Ok(())
        })
        .unwrap_err();
        assert_eq!(aggregate_messages(&inner), vec!["assertion failed: inner-1"]);

        assert_eq!(soft_assertions::depth(), Some(0));
        assert_eq!(soft_assertions::pending_count(), 1);
        pipeline.run(&failing("outer-2"))?;
        Ok(())
    })
    .unwrap_err();

    assert_eq!(
        aggregate_messages(&error),
        vec!["assertion failed: outer-1", "assertion failed: outer-2"]
    );
    assert_eq!(soft_assertions::depth(), None);
}
