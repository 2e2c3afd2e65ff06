//! Developer Tooling: read-only flock inspection and population setup.
//!
//! # Invariants
//! - Inspection never mutates the world.
//! - Seeded setup is reproducible: same config, same boids.

mod inspector;
mod scatter;

pub use inspector::{BoidInfo, FlockInspector, FlockSummary, FriendLink};
pub use scatter::{ScatterConfig, ScatterError, scatter};

pub fn crate_info() -> &'static str {
    "flock-tools v0.1.0"
}
