//! Step variants
//!
//! A step pairs an `AttributeStore` with a body of one of four shapes:
//! - `Runnable`: `() -> ()`
//! - `Supplier`: `() -> R`
//! - `Consumer`: `(&T) -> ()`
//! - `Function`: `(&T) -> R`
//!
//! Steps are immutable values. Rewrites (`with_attributes`, `with_body`, body
//! wrapping) always build a new step of the same shape.

use crate::attributes::{AttributeDescriptor, AttributeStore};
use crate::error::{ExecutionError, StepResult};
use crate::keys;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// The four step signatures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepShape {
    Runnable,
    Supplier,
    Consumer,
    Function,
}

impl StepShape {
    /// Whether the body receives a context value
    pub fn takes_context(self) -> bool {
        matches!(self, StepShape::Consumer | StepShape::Function)
    }

    /// Whether the body produces a result
    pub fn produces_result(self) -> bool {
        matches!(self, StepShape::Supplier | StepShape::Function)
    }

    /// Lowercase shape name used in logs
    pub fn as_str(self) -> &'static str {
        match self {
            StepShape::Runnable => "runnable",
            StepShape::Supplier => "supplier",
            StepShape::Consumer => "consumer",
            StepShape::Function => "function",
        }
    }
}

impl fmt::Display for StepShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shape-agnostic attempt loop used to wrap step bodies
///
/// `drive` decides how many times `attempt` runs and which outcome is surfaced.
/// Result shapes keep the value produced by the last successful attempt.
pub trait AttemptLoop: Send + Sync {
    fn drive(&self, attempt: &mut dyn FnMut() -> StepResult<()>) -> StepResult<()>;
}

/// Callable body of a step
pub enum StepBody<T, R> {
    Runnable(Arc<dyn Fn() -> StepResult<()> + Send + Sync>),
    Supplier(Arc<dyn Fn() -> StepResult<R> + Send + Sync>),
    Consumer(Arc<dyn Fn(&T) -> StepResult<()> + Send + Sync>),
    Function(Arc<dyn Fn(&T) -> StepResult<R> + Send + Sync>),
}

impl<T, R> StepBody<T, R> {
    /// Shape of this body
    pub fn shape(&self) -> StepShape {
        match self {
            StepBody::Runnable(_) => StepShape::Runnable,
            StepBody::Supplier(_) => StepShape::Supplier,
            StepBody::Consumer(_) => StepShape::Consumer,
            StepBody::Function(_) => StepShape::Function,
        }
    }

    /// Call the body once
    ///
    /// Context shapes fail with `ExecutionError::MissingContext` when no context
    /// is given; other shapes ignore it. No-result shapes return `Ok(None)`.
    pub fn invoke(&self, context: Option<&T>) -> StepResult<Option<R>> {
        match self {
            StepBody::Runnable(body) => body().map(|()| None),
            StepBody::Supplier(body) => body().map(Some),
            StepBody::Consumer(body) => {
                let context = context.ok_or(ExecutionError::MissingContext)?;
                body(context).map(|()| None)
            }
            StepBody::Function(body) => {
                let context = context.ok_or(ExecutionError::MissingContext)?;
                body(context).map(Some)
            }
        }
    }
}

impl<T: 'static, R: 'static> StepBody<T, R> {
    /// Wrap the body in an attempt loop, keeping its shape
    pub fn wrap(&self, attempts: Arc<dyn AttemptLoop>) -> Self {
        match self {
            StepBody::Runnable(body) => {
                let body = Arc::clone(body);
                StepBody::Runnable(Arc::new(move || attempts.drive(&mut || body())))
            }
            StepBody::Supplier(body) => {
                let body = Arc::clone(body);
                StepBody::Supplier(Arc::new(move || -> StepResult<R> {
                    let mut last = None;
                    attempts.drive(&mut || {
                        last = Some(body()?);
                        Ok(())
                    })?;
                    last.ok_or_else(|| ExecutionError::AttemptLoopWithoutResult.into())
                }))
            }
            StepBody::Consumer(body) => {
                let body = Arc::clone(body);
                StepBody::Consumer(Arc::new(move |context: &T| {
                    attempts.drive(&mut || body(context))
                }))
            }
            StepBody::Function(body) => {
                let body = Arc::clone(body);
                StepBody::Function(Arc::new(move |context: &T| -> StepResult<R> {
                    let mut last = None;
                    attempts.drive(&mut || {
                        last = Some(body(context)?);
                        Ok(())
                    })?;
                    last.ok_or_else(|| ExecutionError::AttemptLoopWithoutResult.into())
                }))
            }
        }
    }
}

impl<T, R> Clone for StepBody<T, R> {
    fn clone(&self) -> Self {
        match self {
            StepBody::Runnable(body) => StepBody::Runnable(Arc::clone(body)),
            StepBody::Supplier(body) => StepBody::Supplier(Arc::clone(body)),
            StepBody::Consumer(body) => StepBody::Consumer(Arc::clone(body)),
            StepBody::Function(body) => StepBody::Function(Arc::clone(body)),
        }
    }
}

impl<T, R> fmt::Debug for StepBody<T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("StepBody").field(&self.shape()).finish()
    }
}

/// Signature-agnostic view of a step
pub trait HasAttributes {
    /// Attributes describing the step
    fn attributes(&self) -> &AttributeStore;

    /// Shape of the step body
    fn shape(&self) -> StepShape;

    /// Step name, if any
    fn name(&self) -> Option<String> {
        self.attributes().get(&keys::name())
    }

    /// Whether the step is hidden from reporting
    fn is_hidden(&self) -> bool {
        self.attributes().get_or(&keys::hidden(), false)
    }

    /// Name used in logs
    fn display_name(&self) -> String {
        self.name().unwrap_or_else(|| "<unnamed>".to_string())
    }
}

/// Object-safe rewrite capability handed to step-intercepting extensions
///
/// Each rewrite replaces the held step with a newly built one; the previous
/// value is never mutated.
pub trait StepRewrite: HasAttributes {
    /// Replace the attribute store
    fn set_attributes(&mut self, attributes: AttributeStore);

    /// Wrap the body in an attempt loop
    fn wrap_body(&mut self, attempts: Arc<dyn AttemptLoop>);

    /// The held step, for downcasting to a concrete `Step<T, R>`
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl dyn StepRewrite + '_ {
    /// The held step, if its signature is `Step<T, R>`
    ///
    /// Gives access to body replacement for extensions that know the
    /// signature of the steps they rewrite.
    pub fn downcast_mut<T: 'static, R: 'static>(&mut self) -> Option<&mut Step<T, R>> {
        self.as_any_mut().downcast_mut::<Step<T, R>>()
    }
}

/// A step: attributes plus a body
pub struct Step<T = (), R = ()> {
    attributes: AttributeStore,
    body: StepBody<T, R>,
}

impl Step<(), ()> {
    /// Step without context and without result
    pub fn runnable<F>(attributes: AttributeStore, body: F) -> Self
    where
        F: Fn() -> StepResult<()> + Send + Sync + 'static,
    {
        Self {
            attributes,
            body: StepBody::Runnable(Arc::new(body)),
        }
    }
}

impl<R: 'static> Step<(), R> {
    /// Step without context, producing a result
    pub fn supplier<F>(attributes: AttributeStore, body: F) -> Self
    where
        F: Fn() -> StepResult<R> + Send + Sync + 'static,
    {
        Self {
            attributes,
            body: StepBody::Supplier(Arc::new(body)),
        }
    }
}

impl<T: 'static> Step<T, ()> {
    /// Step taking a context value, without result
    pub fn consumer<F>(attributes: AttributeStore, body: F) -> Self
    where
        F: Fn(&T) -> StepResult<()> + Send + Sync + 'static,
    {
        Self {
            attributes,
            body: StepBody::Consumer(Arc::new(body)),
        }
    }
}

impl<T: 'static, R: 'static> Step<T, R> {
    /// Step taking a context value, producing a result
    pub fn function<F>(attributes: AttributeStore, body: F) -> Self
    where
        F: Fn(&T) -> StepResult<R> + Send + Sync + 'static,
    {
        Self {
            attributes,
            body: StepBody::Function(Arc::new(body)),
        }
    }

    /// Assemble a step from an existing body
    pub fn from_parts(attributes: AttributeStore, body: StepBody<T, R>) -> Self {
        Self { attributes, body }
    }

    /// Attributes describing the step
    pub fn attributes(&self) -> &AttributeStore {
        &self.attributes
    }

    /// Body of the step
    pub fn body(&self) -> &StepBody<T, R> {
        &self.body
    }

    /// Shape of the step body
    pub fn shape(&self) -> StepShape {
        self.body.shape()
    }

    /// New step with the given attributes and the same body
    pub fn with_attributes(&self, attributes: AttributeStore) -> Self {
        Self {
            attributes,
            body: self.body.clone(),
        }
    }

    /// New step with the given body and the same attributes
    pub fn with_body(&self, body: StepBody<T, R>) -> Self {
        Self {
            attributes: self.attributes.clone(),
            body,
        }
    }

    /// New step with one attribute overridden
    pub fn with_attribute<V>(&self, descriptor: &AttributeDescriptor<V>, value: V) -> Self
    where
        V: Clone + Send + Sync + 'static,
    {
        self.with_attributes(self.attributes.with(descriptor, value))
    }

    /// New step with the given name
    pub fn with_name(&self, name: impl Into<String>) -> Self {
        self.with_attribute(&keys::name(), name.into())
    }

    /// Call the body once, outside of any pipeline
    pub fn invoke(&self, context: Option<&T>) -> StepResult<Option<R>> {
        self.body.invoke(context)
    }
}

impl<T, R> Clone for Step<T, R> {
    fn clone(&self) -> Self {
        Self {
            attributes: self.attributes.clone(),
            body: self.body.clone(),
        }
    }
}

impl<T, R> fmt::Debug for Step<T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Step")
            .field("shape", &self.body.shape())
            .field("attributes", &self.attributes)
            .finish()
    }
}

impl<T, R> HasAttributes for Step<T, R> {
    fn attributes(&self) -> &AttributeStore {
        &self.attributes
    }

    fn shape(&self) -> StepShape {
        self.body.shape()
    }
}

impl<T: 'static, R: 'static> StepRewrite for Step<T, R> {
    fn set_attributes(&mut self, attributes: AttributeStore) {
        *self = self.with_attributes(attributes);
    }

    fn wrap_body(&mut self, attempts: Arc<dyn AttemptLoop>) {
        *self = self.with_body(self.body.wrap(attempts));
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
