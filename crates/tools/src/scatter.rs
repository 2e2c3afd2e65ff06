use flock_common::BoidTag;
use flock_kernel::{Boid, SimError, World};
use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Errors from population setup.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScatterError {
    #[error("extent must be positive and finite, got {0}")]
    InvalidExtent(f32),
    #[error("initial speed must be non-negative and finite, got {0}")]
    InvalidSpeed(f32),
    #[error("{count} tags starting at {first_tag} overflow u64")]
    TagOverflow { first_tag: u64, count: usize },
    #[error(transparent)]
    Sim(#[from] SimError),
}

/// Random flock on the XZ plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScatterConfig {
    pub count: usize,
    /// Positions are drawn from `[-extent, extent)` on X and Z.
    pub extent: f32,
    pub speed: f32,
    pub seed: u64,
    /// Tag of the first boid; the rest follow consecutively.
    pub first_tag: u64,
}

impl Default for ScatterConfig {
    fn default() -> Self {
        Self {
            count: 100,
            extent: 5.0,
            speed: 0.75,
            seed: 42,
            first_tag: 0,
        }
    }
}

/// Add `config.count` boids to `world` and return their tags.
///
/// Each boid sits at `y = 0` with a random unit direction in the XZ plane.
/// Caps and mass come from the world's config.
pub fn scatter(world: &mut World, config: &ScatterConfig) -> Result<Vec<BoidTag>, ScatterError> {
    if !(config.extent.is_finite() && config.extent > 0.0) {
        return Err(ScatterError::InvalidExtent(config.extent));
    }
    if !(config.speed.is_finite() && config.speed >= 0.0) {
        return Err(ScatterError::InvalidSpeed(config.speed));
    }

    let span = config.count.saturating_sub(1) as u64;
    if config.first_tag.checked_add(span).is_none() {
        return Err(ScatterError::TagOverflow {
            first_tag: config.first_tag,
            count: config.count,
        });
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let params = world.config().boid;
    let mut tags = Vec::with_capacity(config.count);
    for i in 0..config.count {
        let tag = BoidTag(config.first_tag + i as u64);
        let position = Vec3::new(
            rng.gen_range(-config.extent..config.extent),
            0.0,
            rng.gen_range(-config.extent..config.extent),
        );
        let angle: f32 = rng.gen_range(0.0..std::f32::consts::TAU);
        let direction = Vec3::new(angle.cos(), 0.0, angle.sin());
        world.add_boid(Boid::from_params(
            tag,
            position,
            direction,
            config.speed,
            &params,
        ))?;
        tags.push(tag);
    }

    tracing::info!(
        count = config.count,
        seed = config.seed,
        extent = config.extent,
        "scattered flock"
    );
    Ok(tags)
}
