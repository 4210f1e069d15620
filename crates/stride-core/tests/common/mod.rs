//! Shared helpers for stride-core integration tests

#![allow(dead_code)]

use std::any::Any;
use std::sync::{Arc, Mutex};
use stride_core::{ContextRef, Extension, Listener};
use stride_types::{HasAttributes, StepError, StepResult, StepRewrite};

/// Ordered log of hook invocations shared by journal components
#[derive(Clone, Default)]
pub struct Journal {
    entries: Arc<Mutex<Vec<String>>>,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, entry: impl Into<String>) {
        self.entries.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().unwrap().clone()
    }

    /// Labels recorded for one phase, in call order
    pub fn phase(&self, phase: &str) -> Vec<String> {
        let prefix = format!("{phase}:");
        self.entries()
            .into_iter()
            .filter_map(|entry| entry.strip_prefix(&prefix).map(str::to_string))
            .collect()
    }

    /// Phase names, in call order
    pub fn phases(&self) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter_map(|entry| entry.split(':').next().map(str::to_string))
            .collect()
    }
}

/// Extension recording every hook as `phase:label`
pub struct JournalExtension {
    pub label: &'static str,
    pub order: i32,
    pub journal: Journal,
    pub hide: Option<bool>,
    pub throw: Option<bool>,
}

impl JournalExtension {
    pub fn new(label: &'static str, order: i32, journal: &Journal) -> Self {
        Self {
            label,
            order,
            journal: journal.clone(),
            hide: None,
            throw: None,
        }
    }

    pub fn hiding(mut self, hide: bool) -> Self {
        self.hide = Some(hide);
        self
    }

    pub fn throwing(mut self, throw: bool) -> Self {
        self.throw = Some(throw);
        self
    }

    fn record(&self, phase: &str) {
        self.journal.push(format!("{phase}:{}", self.label));
    }
}

impl Extension for JournalExtension {
    fn name(&self) -> &'static str {
        self.label
    }

    fn order(&self) -> i32 {
        self.order
    }

    fn intercept_context(&self, _step: &dyn HasAttributes, _context: &mut dyn Any) -> StepResult<()> {
        self.record("intercept_context");
        Ok(())
    }

    fn intercept_step(&self, _step: &mut dyn StepRewrite, _context: ContextRef<'_>) -> StepResult<()> {
        self.record("intercept_step");
        Ok(())
    }

    fn before_start(&self, _step: &dyn HasAttributes, _context: ContextRef<'_>) -> StepResult<()> {
        self.record("before_start");
        Ok(())
    }

    fn after_start(&self, _step: &dyn HasAttributes, _context: ContextRef<'_>) -> StepResult<()> {
        self.record("after_start");
        Ok(())
    }

    fn intercept_result(
        &self,
        _step: &dyn HasAttributes,
        _context: ContextRef<'_>,
        _result: &mut dyn Any,
    ) -> StepResult<()> {
        self.record("intercept_result");
        Ok(())
    }

    fn before_success(
        &self,
        _step: &dyn HasAttributes,
        _context: ContextRef<'_>,
        _result: Option<&dyn Any>,
    ) -> StepResult<()> {
        self.record("before_success");
        Ok(())
    }

    fn after_success(
        &self,
        _step: &dyn HasAttributes,
        _context: ContextRef<'_>,
        _result: Option<&dyn Any>,
    ) -> StepResult<()> {
        self.record("after_success");
        Ok(())
    }

    fn intercept_exception(
        &self,
        _step: &dyn HasAttributes,
        _context: ContextRef<'_>,
        error: StepError,
    ) -> StepError {
        self.record("intercept_exception");
        error
    }

    fn hide_exception(
        &self,
        _step: &dyn HasAttributes,
        _context: ContextRef<'_>,
        _error: &StepError,
        hidden: bool,
    ) -> bool {
        self.record("hide_exception");
        self.hide.unwrap_or(hidden)
    }

    fn throw_exception(
        &self,
        _step: &dyn HasAttributes,
        _context: ContextRef<'_>,
        _error: &StepError,
        thrown: bool,
    ) -> bool {
        self.record("throw_exception");
        self.throw.unwrap_or(thrown)
    }

    fn before_failure(
        &self,
        _step: &dyn HasAttributes,
        _context: ContextRef<'_>,
        _error: &StepError,
    ) -> StepResult<()> {
        self.record("before_failure");
        Ok(())
    }

    fn after_failure(
        &self,
        _step: &dyn HasAttributes,
        _context: ContextRef<'_>,
        _error: &StepError,
    ) -> StepResult<()> {
        self.record("after_failure");
        Ok(())
    }
}

/// Listener recording every event as `phase:label`
pub struct JournalListener {
    pub label: &'static str,
    pub order: i32,
    pub journal: Journal,
}

impl JournalListener {
    pub fn new(label: &'static str, order: i32, journal: &Journal) -> Self {
        Self {
            label,
            order,
            journal: journal.clone(),
        }
    }
}

impl Listener for JournalListener {
    fn name(&self) -> &'static str {
        self.label
    }

    fn order(&self) -> i32 {
        self.order
    }

    fn on_step_start(&self, _step: &dyn HasAttributes, _context: ContextRef<'_>) -> StepResult<()> {
        self.journal.push(format!("on_step_start:{}", self.label));
        Ok(())
    }

    fn on_step_success(
        &self,
        _step: &dyn HasAttributes,
        _context: ContextRef<'_>,
        _result: Option<&dyn Any>,
    ) -> StepResult<()> {
        self.journal.push(format!("on_step_success:{}", self.label));
        Ok(())
    }

    fn on_step_failure(
        &self,
        _step: &dyn HasAttributes,
        _context: ContextRef<'_>,
        _error: &StepError,
    ) -> StepResult<()> {
        self.journal.push(format!("on_step_failure:{}", self.label));
        Ok(())
    }

    fn on_step_finished(&self, _step: &dyn HasAttributes, _context: ContextRef<'_>) {
        self.journal.push(format!("on_step_finished:{}", self.label));
    }
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt::try_init();
}
