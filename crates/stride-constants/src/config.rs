//! Configuration keys recognized by the kernel
//!
//! Keys are flat, dot separated strings. Per-extension and per-listener keys are
//! built from the component name.

/// Prefix of environment variables mapped into configuration keys
pub const ENV_PREFIX: &str = "STRIDE_";

/// Default retry attempt count used by the retry extension
pub const RETRY_COUNT: &str = "stride.retry.count";

/// Default delay between retry attempts, in milliseconds
pub const RETRY_DELAY: &str = "stride.retry.delay";

/// Default repeat count used by the repeat extension
pub const REPEAT_COUNT: &str = "stride.repeat.count";

/// Default delay between repeat attempts, in milliseconds
pub const REPEAT_DELAY: &str = "stride.repeat.delay";

/// Key toggling an extension on or off
pub fn extension_enabled(name: &str) -> String {
    format!("stride.extension.{name}.enabled")
}

/// Key overriding an extension's order
pub fn extension_order(name: &str) -> String {
    format!("stride.extension.{name}.order")
}

/// Key toggling a listener on or off
pub fn listener_enabled(name: &str) -> String {
    format!("stride.listener.{name}.enabled")
}

/// Key overriding a listener's order
pub fn listener_order(name: &str) -> String {
    format!("stride.listener.{name}.order")
}

/// Key controlling whether a listener reports hidden steps
pub fn listener_hidden(name: &str) -> String {
    format!("stride.listener.{name}.hidden")
}
