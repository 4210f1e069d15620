//! Constants for the stride ecosystem
//!
//! Ordering tiers, well-known attribute keys and configuration keys shared
//! by the kernel and its listeners.

pub mod attributes;
pub mod config;
pub mod order;
