//! Tracing subscriber setup

use crate::error::{FlowError, FlowResult};
use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is not set
pub const DEFAULT_FILTER: &str = "stride_core=info,stride_flow=info,warn";

/// Install a global fmt subscriber filtered by `RUST_LOG`, or `default_filter`
///
/// Fails when a global subscriber is already installed.
pub fn init_tracing(default_filter: &str) -> FlowResult<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|e| FlowError::subscriber(e.to_string()))
}
