//! Stable, namespaced attribute keys
//!
//! External producers (annotation processors, DSL builders) set these keys on a
//! step before it reaches the pipeline.

/// Human readable step name
pub const STEP_NAME: &str = "stride.step.name";

/// Step keyword (e.g. "Given", "Arrange")
pub const STEP_KEYWORD: &str = "stride.step.keyword";

/// Free-form step description
pub const STEP_DESCRIPTION: &str = "stride.step.description";

/// Named step parameters
pub const STEP_PARAMETERS: &str = "stride.step.parameters";

/// Hidden step flag
pub const STEP_HIDDEN: &str = "stride.step.hidden";

/// Retry policy attached to a step
pub const STEP_RETRY: &str = "stride.step.retry";

/// Repeat policy attached to a step
pub const STEP_REPEAT: &str = "stride.step.repeat";

/// Get all well-known attribute keys
pub fn all_attribute_keys() -> Vec<&'static str> {
    vec![
        STEP_NAME,
        STEP_KEYWORD,
        STEP_DESCRIPTION,
        STEP_PARAMETERS,
        STEP_HIDDEN,
        STEP_RETRY,
        STEP_REPEAT,
    ]
}

/// Check if a key belongs to the stride namespace
pub fn is_stride_key(key: &str) -> bool {
    key.starts_with("stride.")
}
