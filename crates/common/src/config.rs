use serde::{Deserialize, Serialize};

/// Errors from configuration validation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("{field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: f32 },
    #[error("{field} must be finite")]
    NonFinite { field: &'static str },
}

/// How `World::update` applies a tick to the population.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateMode {
    /// Boids are updated one at a time in tag order. A boid updated later in
    /// the tick sees neighbors already moved this tick.
    #[default]
    Sequential,
    /// Neighbors and steering are computed for every boid from the
    /// start-of-tick state, then all integrations are applied.
    TwoPhase,
}

/// Divisors for the three steering terms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SteeringConfig {
    pub cohesion_divisor: f32,
    pub separation_divisor: f32,
    pub alignment_divisor: f32,
}

impl Default for SteeringConfig {
    fn default() -> Self {
        Self {
            cohesion_divisor: 100.0,
            separation_divisor: 150.0,
            alignment_divisor: 320.0,
        }
    }
}

/// Per-boid caps and mass applied to newly created boids.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoidParams {
    pub max_speed: f32,
    pub max_force: f32,
    pub mass: f32,
}

impl Default for BoidParams {
    fn default() -> Self {
        Self {
            max_speed: 2.0,
            max_force: 0.2,
            mass: 1.0,
        }
    }
}

/// Simulation configuration owned by a world.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Boids strictly closer than this are friends.
    pub neighbor_cutoff: f32,
    pub update_mode: UpdateMode,
    pub steering: SteeringConfig,
    pub boid: BoidParams,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            neighbor_cutoff: 1.0,
            update_mode: UpdateMode::default(),
            steering: SteeringConfig::default(),
            boid: BoidParams::default(),
        }
    }
}

impl BoidParams {
    /// Reject zero, negative or non-finite caps and mass.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_positive(&[
            ("boid.max_speed", self.max_speed),
            ("boid.max_force", self.max_force),
            ("boid.mass", self.mass),
        ])
    }
}

impl SimConfig {
    /// Reject zero, negative or non-finite constants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_positive(&[
            ("neighbor_cutoff", self.neighbor_cutoff),
            ("steering.cohesion_divisor", self.steering.cohesion_divisor),
            ("steering.separation_divisor", self.steering.separation_divisor),
            ("steering.alignment_divisor", self.steering.alignment_divisor),
        ])?;
        self.boid.validate()
    }
}

fn check_positive(fields: &[(&'static str, f32)]) -> Result<(), ConfigError> {
    for &(field, value) in fields {
        if !value.is_finite() {
            return Err(ConfigError::NonFinite { field });
        }
        if value <= 0.0 {
            return Err(ConfigError::NonPositive { field, value });
        }
    }
    Ok(())
}
