use flock_common::{BoidParams, BoidTag, SteeringConfig};
use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::{SimError, check_delta};
use crate::steering::SteeringForces;

/// One flocking agent.
///
/// `friends` holds the tags of the boids that were within the neighbor cutoff
/// at this boid's last update. It is recomputed every tick and is not part of
/// the serialized state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Boid {
    pub tag: BoidTag,
    pub position: Vec3,
    /// Unit length whenever `speed > 0`.
    pub direction: Vec3,
    pub speed: f32,
    pub max_speed: f32,
    pub max_force: f32,
    pub mass: f32,
    #[serde(skip)]
    pub friends: Vec<BoidTag>,
}

/// Friends and steering computed for one boid but not yet applied.
#[derive(Debug, Clone, PartialEq)]
pub struct SteeringUpdate {
    pub friends: Vec<BoidTag>,
    pub forces: SteeringForces,
}

impl Boid {
    /// Create a boid with default caps and mass. `direction` is normalized.
    pub fn new(tag: BoidTag, position: Vec3, direction: Vec3, speed: f32) -> Self {
        Self::from_params(tag, position, direction, speed, &BoidParams::default())
    }

    pub fn from_params(
        tag: BoidTag,
        position: Vec3,
        direction: Vec3,
        speed: f32,
        params: &BoidParams,
    ) -> Self {
        Self {
            tag,
            position,
            direction: direction.normalize_or_zero(),
            speed: speed.max(0.0),
            max_speed: params.max_speed,
            max_force: params.max_force,
            mass: params.mass,
            friends: Vec::new(),
        }
    }

    pub fn with_max_speed(mut self, max_speed: f32) -> Self {
        self.max_speed = max_speed;
        self
    }

    pub fn with_max_force(mut self, max_force: f32) -> Self {
        self.max_force = max_force;
        self
    }

    pub fn with_mass(mut self, mass: f32) -> Self {
        self.mass = mass;
        self
    }

    /// Caps and mass as a [`BoidParams`] for validation.
    pub fn params(&self) -> BoidParams {
        BoidParams {
            max_speed: self.max_speed,
            max_force: self.max_force,
            mass: self.mass,
        }
    }

    /// `direction * speed`. Derived, never stored.
    pub fn velocity(&self) -> Vec3 {
        self.direction * self.speed
    }

    /// Compute friends and steering from `neighbors` without mutating.
    pub fn steer(&self, neighbors: &[&Boid], config: &SteeringConfig) -> SteeringUpdate {
        SteeringUpdate {
            friends: neighbors.iter().map(|b| b.tag).collect(),
            forces: SteeringForces::compute(self, neighbors, config),
        }
    }

    /// Store the friends and integrate the summed steering force.
    pub(crate) fn apply(&mut self, update: SteeringUpdate, delta: f32) {
        self.friends = update.friends;
        self.integrate(update.forces.total(), delta);
    }

    /// Full per-tick cycle for a boid that is not borrowed from a world.
    ///
    /// Rejects an invalid delta or invalid caps before touching any state.
    pub fn update(
        &mut self,
        delta: f32,
        neighbors: &[&Boid],
        config: &SteeringConfig,
    ) -> Result<(), SimError> {
        check_delta(delta)?;
        self.params().validate()?;
        let update = self.steer(neighbors, config);
        self.apply(update, delta);
        Ok(())
    }

    /// Advance position, speed and direction by one tick of `delta` seconds.
    ///
    /// Callers have checked `delta` and the caps. When the integrated velocity
    /// is zero the previous direction is kept.
    pub(crate) fn integrate(&mut self, steering_force: Vec3, delta: f32) {
        debug_assert!(delta > 0.0 && delta.is_finite());

        let steering_force = steering_force.clamp_length_max(self.max_force * delta);
        let acceleration = steering_force / self.mass;

        let velocity = (self.direction * self.speed * delta + acceleration)
            .clamp_length_max(self.max_speed * delta);

        self.position += velocity;
        self.speed = velocity.length() / delta;
        if let Some(direction) = velocity.try_normalize() {
            self.direction = direction;
        }
    }
}
