//! # Stride Core
//!
//! Step execution kernel for stride:
//! 1. `ExecutionPipeline`, driving steps through ordered extensions and listeners
//! 2. Retry and repeat body transforms
//! 3. Thread-scoped hidden and soft assertion state
//! 4. Built-in extensions wiring the above into the pipeline
//! 5. Flat key/value configuration

pub mod config;
pub mod extension;
pub mod extensions;
pub mod listener;
pub mod pipeline;
pub mod scope;
pub mod transform;

pub use config::{Config, ConfigError};
pub use extension::{ContextRef, Extension};
pub use extensions::default_extensions;
pub use listener::Listener;
pub use pipeline::{ExecutionPipeline, PipelineBuilder};
pub use scope::{hidden, soft_assertions};
pub use transform::{repeat, retry};
