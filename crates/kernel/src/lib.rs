//! Flock Kernel: authoritative boid state, steering, deterministic stepping and replay.
//!
//! # Invariants
//! - The world owns every boid; iteration is in ascending tag order.
//! - A tick is pure with respect to its inputs: same boids, config and delta
//!   sequence produce the same trajectories.
//! - Degenerate numerics (empty neighbor sets, zero velocity) never produce NaN.
//! - Zero, negative or non-finite deltas, caps and masses are rejected before
//!   any state changes.

pub mod boid;
pub mod error;
pub mod steering;
pub mod world;

pub use boid::{Boid, SteeringUpdate};
pub use error::SimError;
pub use steering::SteeringForces;
pub use world::{World, WorldEvent};
