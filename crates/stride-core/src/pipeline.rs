//! Step execution pipeline
//!
//! An `ExecutionPipeline` drives one step at a time through a fixed lifecycle:
//!
//! 1. `intercept_context` (shapes taking a context)
//! 2. `intercept_step`
//! 3. `before_start`, listeners' `on_step_start`, `after_start`
//! 4. the body
//! 5. on success: `intercept_result` (shapes producing a result),
//!    `before_success`, listeners' `on_step_success`, `after_success`
//! 6. on failure: `intercept_exception`, the hidden vote, `before_failure`,
//!    listeners' `on_step_failure` unless hidden, `after_failure`, the thrown vote
//! 7. listeners' `on_step_finished`, for every listener that was started
//!
//! Extensions and listeners run in ascending order; equal orders keep
//! registration order. An error returned by any extension or listener hook is
//! returned as is and the remaining phases are skipped, except for
//! `on_step_finished`.

use crate::config::{Config, ConfigError};
use crate::extension::{ContextRef, Extension};
use crate::listener::Listener;
use std::any::Any;
use std::fmt;
use stride_constants::config::{extension_enabled, extension_order, listener_enabled, listener_order};
use stride_types::{ExecutionError, HasAttributes, Step, StepError, StepResult};
use tracing::{debug, info, trace};

/// Initial state of the hidden vote: errors reach listeners
pub const HIDDEN_BY_DEFAULT: bool = false;

/// Initial state of the thrown vote: errors reach the caller
pub const THROWN_BY_DEFAULT: bool = true;

struct Ordered<C: ?Sized> {
    order: i32,
    component: Box<C>,
}

/// Builder collecting configuration, extensions and listeners
#[derive(Default)]
pub struct PipelineBuilder {
    config: Config,
    extensions: Vec<Box<dyn Extension>>,
    listeners: Vec<Box<dyn Listener>>,
}

impl PipelineBuilder {
    /// Empty builder with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration handed to every component at build time
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Register an extension
    pub fn extension<E: Extension + 'static>(mut self, extension: E) -> Self {
        self.extensions.push(Box::new(extension));
        self
    }

    /// Register boxed extensions, in iteration order
    pub fn extensions<I>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = Box<dyn Extension>>,
    {
        self.extensions.extend(extensions);
        self
    }

    /// Register a listener
    pub fn listener<L: Listener + 'static>(mut self, listener: L) -> Self {
        self.listeners.push(Box::new(listener));
        self
    }

    /// Register boxed listeners, in iteration order
    pub fn listeners<I>(mut self, listeners: I) -> Self
    where
        I: IntoIterator<Item = Box<dyn Listener>>,
    {
        self.listeners.extend(listeners);
        self
    }

    /// Configure, filter and sort the registered components
    pub fn build(self) -> Result<ExecutionPipeline, ConfigError> {
        let config = self.config;

        let mut extensions = Vec::with_capacity(self.extensions.len());
        for mut extension in self.extensions {
            let name = extension.name();
            if !config.get_bool(&extension_enabled(name), true)? {
                debug!(extension = %name, "Extension disabled by configuration");
                continue;
            }
            extension.configure(&config)?;
            let order = config.get_i32(&extension_order(name), extension.order())?;
            extensions.push(Ordered {
                order,
                component: extension,
            });
        }

        let mut listeners = Vec::with_capacity(self.listeners.len());
        for mut listener in self.listeners {
            let name = listener.name();
            if !config.get_bool(&listener_enabled(name), true)? {
                debug!(listener = %name, "Listener disabled by configuration");
                continue;
            }
            listener.configure(&config)?;
            let order = config.get_i32(&listener_order(name), listener.order())?;
            listeners.push(Ordered {
                order,
                component: listener,
            });
        }

        // sort_by_key is stable
        extensions.sort_by_key(|e| e.order);
        listeners.sort_by_key(|l| l.order);

        info!(
            extensions = extensions.len(),
            listeners = listeners.len(),
            "Built execution pipeline"
        );

        Ok(ExecutionPipeline {
            extensions,
            listeners,
        })
    }
}

/// Ordered extensions and listeners, shared by every execution
pub struct ExecutionPipeline {
    extensions: Vec<Ordered<dyn Extension>>,
    listeners: Vec<Ordered<dyn Listener>>,
}

impl ExecutionPipeline {
    /// Start building a pipeline
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    /// Extension names, in execution order
    pub fn extension_names(&self) -> Vec<&'static str> {
        self.extensions.iter().map(|e| e.component.name()).collect()
    }

    /// Listener names, in execution order
    pub fn listener_names(&self) -> Vec<&'static str> {
        self.listeners.iter().map(|l| l.component.name()).collect()
    }

    /// Effective extension orders, in execution order
    pub fn extension_orders(&self) -> Vec<i32> {
        self.extensions.iter().map(|e| e.order).collect()
    }

    /// Effective listener orders, in execution order
    pub fn listener_orders(&self) -> Vec<i32> {
        self.listeners.iter().map(|l| l.order).collect()
    }

    /// Execute a step of any shape
    ///
    /// Returns the (intercepted) result for shapes producing one, `None`
    /// otherwise. A failure whose thrown vote resolved to false also returns
    /// `Ok(None)`.
    pub fn execute<T, R>(&self, step: &Step<T, R>, context: Option<T>) -> StepResult<Option<R>>
    where
        T: 'static,
        R: 'static,
    {
        let shape = step.shape();
        let mut context = if shape.takes_context() {
            Some(context.ok_or(ExecutionError::MissingContext)?)
        } else {
            None
        };

        if let Some(value) = context.as_mut() {
            for extension in &self.extensions {
                extension.component.intercept_context(step, &mut *value)?;
            }
        }

        let mut current = step.clone();
        for extension in &self.extensions {
            extension
                .component
                .intercept_step(&mut current, observed(&context))?;
        }

        let ctx = observed(&context);
        trace!(step = %current.display_name(), shape = %shape, "Starting step");

        for extension in &self.extensions {
            extension.component.before_start(&current, ctx)?;
        }
        let mut started = Started {
            listeners: &self.listeners,
            step: &current,
            context: ctx,
            count: 0,
        };
        for listener in &self.listeners {
            started.count += 1;
            listener.component.on_step_start(&current, ctx)?;
        }
        for extension in &self.extensions {
            extension.component.after_start(&current, ctx)?;
        }

        match current.invoke(context.as_ref()) {
            Ok(result) => self.succeed(&current, ctx, result),
            Err(error) => self.fail(&current, ctx, error),
        }
    }

    /// Execute a step without context and without result
    pub fn run(&self, step: &Step<(), ()>) -> StepResult<()> {
        self.execute(step, None).map(|_| ())
    }

    /// Execute a step without context, producing a result
    pub fn supply<R: 'static>(&self, step: &Step<(), R>) -> StepResult<Option<R>> {
        self.execute(step, None)
    }

    /// Execute a step taking `context`, without result
    pub fn consume<T: 'static>(&self, step: &Step<T, ()>, context: T) -> StepResult<()> {
        self.execute(step, Some(context)).map(|_| ())
    }

    /// Execute a step taking `context`, producing a result
    pub fn apply<T: 'static, R: 'static>(&self, step: &Step<T, R>, context: T) -> StepResult<Option<R>> {
        self.execute(step, Some(context))
    }

    fn succeed<R: 'static>(
        &self,
        step: &dyn HasAttributes,
        ctx: ContextRef<'_>,
        mut result: Option<R>,
    ) -> StepResult<Option<R>> {
        if let Some(value) = result.as_mut() {
            for extension in &self.extensions {
                extension.component.intercept_result(step, ctx, &mut *value)?;
            }
        }

        let observed_result = result.as_ref().map(|value| value as &dyn Any);
        for extension in &self.extensions {
            extension.component.before_success(step, ctx, observed_result)?;
        }
        for listener in &self.listeners {
            listener.component.on_step_success(step, ctx, observed_result)?;
        }
        for extension in &self.extensions {
            extension.component.after_success(step, ctx, observed_result)?;
        }

        trace!(step = %step.display_name(), "Step succeeded");
        Ok(result)
    }

    fn fail<R>(
        &self,
        step: &dyn HasAttributes,
        ctx: ContextRef<'_>,
        error: StepError,
    ) -> StepResult<Option<R>> {
        let error = self.extensions.iter().fold(error, |error, extension| {
            extension.component.intercept_exception(step, ctx, error)
        });

        let hidden = self.extensions.iter().fold(HIDDEN_BY_DEFAULT, |hidden, extension| {
            extension.component.hide_exception(step, ctx, &error, hidden)
        });

        for extension in &self.extensions {
            extension.component.before_failure(step, ctx, &error)?;
        }
        if !hidden {
            for listener in &self.listeners {
                listener.component.on_step_failure(step, ctx, &error)?;
            }
        }
        for extension in &self.extensions {
            extension.component.after_failure(step, ctx, &error)?;
        }

        let thrown = self.extensions.iter().fold(THROWN_BY_DEFAULT, |thrown, extension| {
            extension.component.throw_exception(step, ctx, &error, thrown)
        });

        if thrown {
            Err(error)
        } else {
            debug!(step = %step.display_name(), error = %error, "Step failure suppressed");
            Ok(None)
        }
    }
}

/// Listeners whose `on_step_start` was called; finishes them when dropped
struct Started<'a> {
    listeners: &'a [Ordered<dyn Listener>],
    step: &'a dyn HasAttributes,
    context: ContextRef<'a>,
    count: usize,
}

impl Drop for Started<'_> {
    fn drop(&mut self) {
        for listener in &self.listeners[..self.count] {
            listener.component.on_step_finished(self.step, self.context);
        }
    }
}

impl fmt::Debug for ExecutionPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionPipeline")
            .field("extensions", &self.extension_names())
            .field("listeners", &self.listener_names())
            .finish()
    }
}

fn observed<T: 'static>(context: &Option<T>) -> ContextRef<'_> {
    context.as_ref().map(|value| value as &dyn Any)
}
