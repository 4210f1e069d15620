//! Built-in extensions

pub mod hidden;
pub mod repeat;
pub mod retry;
pub mod soft_assertions;

pub use hidden::HiddenStepsExtension;
pub use repeat::RepeatExtension;
pub use retry::RetryExtension;
pub use soft_assertions::SoftAssertionsExtension;

use crate::extension::Extension;

/// Get all built-in extensions, with default settings
pub fn default_extensions() -> Vec<Box<dyn Extension>> {
    vec![
        Box::new(HiddenStepsExtension::new()),
        Box::new(RetryExtension::new()),
        Box::new(RepeatExtension::new()),
        Box::new(SoftAssertionsExtension::new()),
    ]
}
