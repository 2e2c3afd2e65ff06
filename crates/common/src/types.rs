use serde::{Deserialize, Serialize};

/// Unique, stable identifier of a boid in the world.
///
/// Ordering is the world's iteration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BoidTag(pub u64);

impl std::fmt::Display for BoidTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u64> for BoidTag {
    fn from(value: u64) -> Self {
        Self(value)
    }
}
