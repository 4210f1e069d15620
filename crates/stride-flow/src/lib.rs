//! # Stride Flow
//!
//! Listeners and flow utilities built on the stride kernel:
//! 1. `FlowRecorder`, collecting step events per session
//! 2. `TracingListener`, logging step events through `tracing`
//! 3. Flow statistics and JSONL export
//! 4. Tracing subscriber setup

pub mod error;
pub mod logger;
pub mod logging;
pub mod recorder;
pub mod types;
pub mod utils;

pub use error::{FlowError, FlowResult};
pub use logger::TracingListener;
pub use logging::init_tracing;
pub use recorder::FlowRecorder;
pub use types::*;
pub use utils::FlowUtils;
