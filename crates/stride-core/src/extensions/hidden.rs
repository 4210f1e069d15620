//! Hidden steps extension

use crate::extension::{ContextRef, Extension};
use crate::scope::hidden;
use stride_constants::order::EARLY;
use stride_types::{keys, StepResult, StepRewrite};
use tracing::trace;

/// Marks every step hidden while a hidden scope is active on the thread
#[derive(Debug, Clone, Default)]
pub struct HiddenStepsExtension;

impl HiddenStepsExtension {
    /// Extension marking steps run inside a hidden scope
    pub fn new() -> Self {
        Self
    }
}

impl Extension for HiddenStepsExtension {
    fn name(&self) -> &'static str {
        "hidden"
    }

    fn order(&self) -> i32 {
        EARLY
    }

    fn intercept_step(&self, step: &mut dyn StepRewrite, _context: ContextRef<'_>) -> StepResult<()> {
        if hidden::is_active() && !step.is_hidden() {
            trace!(step = %step.display_name(), "Marking step hidden");
            let attributes = step.attributes().with(&keys::hidden(), true);
            step.set_attributes(attributes);
        }
        Ok(())
    }
}
