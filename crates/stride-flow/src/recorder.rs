//! In-memory flow recorder
//!
//! `FlowRecorder` is a listener collecting every step event of a session. It
//! is a cheap handle: keep one clone, register another with the pipeline, and
//! read the flow back once steps have run.

use crate::error::FlowResult;
use crate::types::{FlowLog, StepEvent, StepEventKind, StepStatistics};
use crate::utils::FlowUtils;
use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, ThreadId};
use stride_constants::config::listener_hidden;
use stride_constants::order::LATE;
use stride_core::{Config, ConfigError, ContextRef, Listener};
use stride_types::{HasAttributes, StepError, StepResult};
use tracing::debug;

const NAME: &str = "recorder";

/// Listener recording step events into a shared `FlowLog`
#[derive(Debug, Clone)]
pub struct FlowRecorder {
    log: Arc<Mutex<FlowLog>>,
    depths: Arc<Mutex<HashMap<ThreadId, u32>>>,
    include_hidden: bool,
}

impl FlowRecorder {
    /// Create a recorder with a fresh session id
    pub fn new() -> Self {
        Self::with_session_id(FlowUtils::new_session_id())
    }

    /// Create a recorder for an existing session
    pub fn with_session_id(session_id: impl Into<String>) -> Self {
        Self {
            log: Arc::new(Mutex::new(FlowLog::new(session_id))),
            depths: Arc::new(Mutex::new(HashMap::new())),
            include_hidden: false,
        }
    }

    /// Record hidden steps too
    pub fn include_hidden(mut self, include: bool) -> Self {
        self.include_hidden = include;
        self
    }

    /// Session the recorded events belong to
    pub fn session_id(&self) -> String {
        self.log().session_id.clone()
    }

    /// Snapshot of the recorded events
    pub fn events(&self) -> Vec<StepEvent> {
        self.log().events.clone()
    }

    /// Snapshot of the whole flow
    pub fn flow_log(&self) -> FlowLog {
        self.log().clone()
    }

    /// Statistics over the recorded events
    pub fn statistics(&self) -> StepStatistics {
        FlowUtils::statistics(&self.log().events)
    }

    /// Recorded events as JSON lines
    pub fn to_jsonl(&self) -> FlowResult<String> {
        FlowUtils::to_jsonl(&self.log().events)
    }

    /// Drop every recorded event, keeping the session
    pub fn clear(&self) {
        self.log().events.clear();
        lock(&self.depths).clear();
    }

    fn log(&self) -> MutexGuard<'_, FlowLog> {
        lock(&self.log)
    }

    fn skips(&self, step: &dyn HasAttributes) -> bool {
        !self.include_hidden && step.is_hidden()
    }

    fn enter(&self) -> u32 {
        let mut depths = lock(&self.depths);
        let depth = depths.entry(thread::current().id()).or_insert(0);
        let current = *depth;
        *depth += 1;
        current
    }

    /// Depth of the innermost started step on this thread
    fn current(&self) -> u32 {
        let depths = lock(&self.depths);
        depths
            .get(&thread::current().id())
            .copied()
            .unwrap_or(0)
            .saturating_sub(1)
    }

    fn leave(&self) {
        let mut depths = lock(&self.depths);
        let id = thread::current().id();
        let remaining = depths.get(&id).copied().unwrap_or(0).saturating_sub(1);
        if remaining == 0 {
            depths.remove(&id);
        } else {
            depths.insert(id, remaining);
        }
    }

    fn record(&self, step: &dyn HasAttributes, kind: StepEventKind, depth: u32) {
        let mut log = self.log();
        let event = StepEvent::for_step(&log.session_id, step, kind, depth, thread_label());
        debug!(step = %event.display_name(), depth = depth, "Recorded step event");
        log.events.push(event);
    }
}

impl Default for FlowRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl Listener for FlowRecorder {
    fn name(&self) -> &'static str {
        NAME
    }

    fn configure(&mut self, config: &Config) -> Result<(), ConfigError> {
        self.include_hidden = config.get_bool(&listener_hidden(NAME), self.include_hidden)?;
        Ok(())
    }

    fn order(&self) -> i32 {
        LATE
    }

    fn on_step_start(&self, step: &dyn HasAttributes, _context: ContextRef<'_>) -> StepResult<()> {
        if !self.skips(step) {
            let depth = self.enter();
            self.record(step, StepEventKind::Started, depth);
        }
        Ok(())
    }

    fn on_step_success(
        &self,
        step: &dyn HasAttributes,
        _context: ContextRef<'_>,
        result: Option<&dyn Any>,
    ) -> StepResult<()> {
        if !self.skips(step) {
            let depth = self.current();
            let kind = StepEventKind::Succeeded {
                has_result: result.is_some(),
            };
            self.record(step, kind, depth);
        }
        Ok(())
    }

    fn on_step_failure(
        &self,
        step: &dyn HasAttributes,
        _context: ContextRef<'_>,
        error: &StepError,
    ) -> StepResult<()> {
        if !self.skips(step) {
            let depth = self.current();
            let kind = StepEventKind::Failed {
                message: error.to_string(),
            };
            self.record(step, kind, depth);
        }
        Ok(())
    }

    fn on_step_finished(&self, step: &dyn HasAttributes, _context: ContextRef<'_>) {
        if !self.skips(step) {
            self.leave();
        }
    }
}

/// Recover the data of a poisoned lock; events stay readable after a panic
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn thread_label() -> String {
    let current = thread::current();
    match current.name() {
        Some(name) => name.to_string(),
        None => format!("{:?}", current.id()),
    }
}
