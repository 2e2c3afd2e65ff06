use flock_common::{BoidTag, ConfigError};

/// Errors from boid and world operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SimError {
    #[error("invalid tick delta {0}: must be positive and finite")]
    InvalidDelta(f32),
    #[error("boid {0} not found")]
    BoidNotFound(BoidTag),
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

/// A tick delta must be positive and finite; `speed` is divided by it.
pub(crate) fn check_delta(delta: f32) -> Result<(), SimError> {
    if delta.is_finite() && delta > 0.0 {
        Ok(())
    } else {
        Err(SimError::InvalidDelta(delta))
    }
}
