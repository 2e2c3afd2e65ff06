//! Shared types and configuration for the flocking kernel.
//!
//! # Invariants
//! - Tags are plain values; ordering on tags is the world's iteration order.
//! - Every tunable constant lives in [`SimConfig`] with its default.

mod config;
mod types;

pub use config::{BoidParams, ConfigError, SimConfig, SteeringConfig, UpdateMode};
pub use types::BoidTag;
