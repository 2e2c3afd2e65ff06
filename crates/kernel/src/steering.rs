//! Cohesion, separation and alignment terms.
//!
//! Each term is a pure function of a boid and its current friends. Friends
//! are summed in the order given, so the result depends only on that order.

use flock_common::SteeringConfig;
use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::boid::Boid;

/// The three steering contributions for one boid in one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SteeringForces {
    pub cohesion: Vec3,
    pub separation: Vec3,
    pub alignment: Vec3,
}

impl SteeringForces {
    pub fn compute(boid: &Boid, friends: &[&Boid], config: &SteeringConfig) -> Self {
        Self {
            cohesion: cohesion(boid, friends, config.cohesion_divisor),
            separation: separation(boid, friends, config.separation_divisor),
            alignment: alignment(boid, friends, config.alignment_divisor),
        }
    }

    /// Unweighted sum of the three terms.
    pub fn total(&self) -> Vec3 {
        self.cohesion + self.separation + self.alignment
    }
}

/// Pull toward the friends' center of mass. Zero without friends.
pub fn cohesion(boid: &Boid, friends: &[&Boid], divisor: f32) -> Vec3 {
    if friends.is_empty() {
        return Vec3::ZERO;
    }
    let center = friends
        .iter()
        .fold(Vec3::ZERO, |acc, friend| acc + friend.position)
        / friends.len() as f32;
    (center - boid.position) / divisor
}

/// Push away from the summed offsets to every friend.
pub fn separation(boid: &Boid, friends: &[&Boid], divisor: f32) -> Vec3 {
    let offset = friends
        .iter()
        .fold(Vec3::ZERO, |acc, friend| acc + (friend.position - boid.position));
    -offset / divisor
}

/// Match the friends' mean velocity. Zero without friends.
pub fn alignment(boid: &Boid, friends: &[&Boid], divisor: f32) -> Vec3 {
    if friends.is_empty() {
        return Vec3::ZERO;
    }
    let mean_velocity = friends
        .iter()
        .fold(Vec3::ZERO, |acc, friend| acc + friend.velocity())
        / friends.len() as f32;
    (mean_velocity - boid.velocity()) / divisor
}
