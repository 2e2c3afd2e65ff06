use flock_common::BoidTag;
use flock_kernel::{SteeringForces, World};
use glam::Vec3;
use serde::Serialize;

/// Flock inspector for renderers and developer tooling.
///
/// Provides read-only queries against the world: aggregate summary, per-boid
/// readout, and friend links for neighbor-line visualization.
pub struct FlockInspector;

impl FlockInspector {
    /// Produce a summary of the flock.
    pub fn summary(world: &World) -> FlockSummary {
        let count = world.boid_count();
        let mut speed_sum = 0.0;
        let mut friend_sum = 0usize;
        let mut position_sum = Vec3::ZERO;
        world.for_each_boid(|b| {
            speed_sum += b.speed;
            friend_sum += b.friends.len();
            position_sum += b.position;
        });
        let (mean_speed, mean_friends, centroid) = if count == 0 {
            (0.0, 0.0, Vec3::ZERO)
        } else {
            let n = count as f32;
            (speed_sum / n, friend_sum as f32 / n, position_sum / n)
        };
        FlockSummary {
            tick: world.tick(),
            boid_count: count,
            mean_speed,
            mean_friends,
            centroid: centroid.to_array(),
            pending_events: world.events().len(),
        }
    }

    /// Readout of one boid, or `None` if the tag is absent.
    pub fn inspect_boid(world: &World, tag: BoidTag) -> Option<BoidInfo> {
        world.get_boid(tag).map(|b| BoidInfo {
            tag,
            position: b.position.to_array(),
            direction: b.direction.to_array(),
            speed: b.speed,
            velocity: b.velocity().to_array(),
            friends: b.friends.clone(),
        })
    }

    /// Steering the boid would receive if its neighbors were scanned now.
    pub fn steering_at(world: &World, tag: BoidTag) -> Option<SteeringForces> {
        let boid = world.get_boid(tag)?;
        let neighbors = world.find_nearby_boids(boid, world.config().neighbor_cutoff);
        Some(SteeringForces::compute(
            boid,
            &neighbors,
            &world.config().steering,
        ))
    }

    /// All tags in iteration order.
    pub fn list_boids(world: &World) -> Vec<BoidTag> {
        world.boids().keys().copied().collect()
    }

    /// One segment per (boid, friend) pair from the last tick.
    ///
    /// Friends that are no longer in the world are skipped.
    pub fn friend_links(world: &World) -> Vec<FriendLink> {
        let mut links = Vec::new();
        world.for_each_boid(|b| {
            for friend_tag in &b.friends {
                if let Some(friend) = world.get_boid(*friend_tag) {
                    links.push(FriendLink {
                        from: b.tag,
                        to: friend.tag,
                        start: b.position.to_array(),
                        end: friend.position.to_array(),
                    });
                }
            }
        });
        links
    }
}

/// Summary of flock state for the inspector.
#[derive(Debug, Clone, Serialize)]
pub struct FlockSummary {
    pub tick: u64,
    pub boid_count: usize,
    pub mean_speed: f32,
    pub mean_friends: f32,
    pub centroid: [f32; 3],
    pub pending_events: usize,
}

impl std::fmt::Display for FlockSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Flock: tick={} boids={} mean_speed={:.3} mean_friends={:.2} centroid=({:.2}, {:.2}, {:.2})",
            self.tick,
            self.boid_count,
            self.mean_speed,
            self.mean_friends,
            self.centroid[0],
            self.centroid[1],
            self.centroid[2],
        )
    }
}

/// Detailed readout of a single boid.
#[derive(Debug, Clone, Serialize)]
pub struct BoidInfo {
    pub tag: BoidTag,
    pub position: [f32; 3],
    pub direction: [f32; 3],
    pub speed: f32,
    pub velocity: [f32; 3],
    pub friends: Vec<BoidTag>,
}

impl std::fmt::Display for BoidInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Boid {} pos=({:.3}, {:.3}, {:.3}) dir=({:.3}, {:.3}, {:.3}) speed={:.3} friends={}",
            self.tag,
            self.position[0],
            self.position[1],
            self.position[2],
            self.direction[0],
            self.direction[1],
            self.direction[2],
            self.speed,
            self.friends.len(),
        )
    }
}

/// Line segment between a boid and one of its friends.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FriendLink {
    pub from: BoidTag,
    pub to: BoidTag,
    pub start: [f32; 3],
    pub end: [f32; 3],
}
