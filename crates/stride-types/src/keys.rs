//! Well-known step attributes
//!
//! Descriptors for the attributes every producer and extension agrees on. The
//! keys themselves live in `stride_constants::attributes`.

use crate::attributes::AttributeDescriptor;
use crate::policy::{RepeatPolicy, RetryPolicy};
use serde::{Deserialize, Serialize};
use stride_constants::attributes::{
    STEP_DESCRIPTION, STEP_HIDDEN, STEP_KEYWORD, STEP_NAME, STEP_PARAMETERS, STEP_REPEAT,
    STEP_RETRY,
};

/// Named step parameter, rendered as text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub value: String,
}

impl Parameter {
    /// Create a parameter from anything printable
    pub fn new(name: impl Into<String>, value: impl ToString) -> Self {
        Self {
            name: name.into(),
            value: value.to_string(),
        }
    }
}

fn trimmed(value: String) -> String {
    let trimmed = value.trim();
    if trimmed.len() == value.len() {
        value
    } else {
        trimmed.to_string()
    }
}

/// Step name
pub fn name() -> AttributeDescriptor<String> {
    AttributeDescriptor::optional(STEP_NAME).with_normalize(trimmed)
}

/// Step keyword
pub fn keyword() -> AttributeDescriptor<String> {
    AttributeDescriptor::optional(STEP_KEYWORD).with_normalize(trimmed)
}

/// Step description
pub fn description() -> AttributeDescriptor<String> {
    AttributeDescriptor::optional(STEP_DESCRIPTION)
}

/// Step parameters, empty by default
pub fn parameters() -> AttributeDescriptor<Vec<Parameter>> {
    AttributeDescriptor::required(STEP_PARAMETERS, Vec::new())
}

/// Hidden flag, false by default
pub fn hidden() -> AttributeDescriptor<bool> {
    AttributeDescriptor::required(STEP_HIDDEN, false)
}

/// Retry policy
pub fn retry() -> AttributeDescriptor<RetryPolicy> {
    AttributeDescriptor::optional(STEP_RETRY)
}

/// Repeat policy
pub fn repeat() -> AttributeDescriptor<RepeatPolicy> {
    AttributeDescriptor::optional(STEP_REPEAT)
}
