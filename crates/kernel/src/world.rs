use flock_common::{BoidTag, SimConfig, UpdateMode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::boid::{Boid, SteeringUpdate};
use crate::error::{SimError, check_delta};

/// An event record produced by every mutation to the world.
///
/// Replaying the log into a fresh world with the same config reproduces the
/// same state, since ticks are deterministic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum WorldEvent {
    /// Boid inserted (or replaced) with this initial state.
    BoidAdded { boid: Boid },
    /// Simulation advanced one tick by `delta` seconds.
    Stepped { tick: u64, delta: f32 },
}

/// The authoritative flock state.
///
/// Owns every boid, keyed by tag. Uses BTreeMap so iteration is ascending tag
/// order on every platform and every tick.
///
/// The event log is unbounded: every add and every tick appends to it. A
/// long-running driver must call [`World::drain_events`] (or
/// [`World::clear_events`]) to hand it off or discard it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct World {
    boids: BTreeMap<BoidTag, Boid>,
    tick: u64,
    config: SimConfig,
    /// Append-only event log of all mutations.
    #[serde(skip)]
    event_log: Vec<WorldEvent>,
}

impl World {
    /// Create an empty world with the default config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty world with a validated config.
    pub fn with_config(config: SimConfig) -> Result<Self, SimError> {
        config.validate()?;
        Ok(Self {
            config,
            ..Default::default()
        })
    }

    /// Number of ticks applied so far.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn boid_count(&self) -> usize {
        self.boids.len()
    }

    /// Read-only access to all boids in iteration order.
    pub fn boids(&self) -> &BTreeMap<BoidTag, Boid> {
        &self.boids
    }

    /// Drain and return the event log. The caller owns keeping it bounded.
    pub fn drain_events(&mut self) -> Vec<WorldEvent> {
        std::mem::take(&mut self.event_log)
    }

    /// Discard the event log, keeping its allocation.
    pub fn clear_events(&mut self) {
        self.event_log.clear();
    }

    /// Read-only access to the event log.
    pub fn events(&self) -> &[WorldEvent] {
        &self.event_log
    }

    /// Insert a boid at its tag, replacing any boid already there.
    ///
    /// Boids with a non-positive or non-finite `max_speed`, `max_force` or
    /// `mass` are rejected and the world is unchanged.
    pub fn add_boid(&mut self, mut boid: Boid) -> Result<(), SimError> {
        boid.params().validate()?;
        boid.friends.clear();
        let tag = boid.tag;
        self.event_log.push(WorldEvent::BoidAdded { boid: boid.clone() });
        if self.boids.insert(tag, boid).is_some() {
            tracing::debug!(%tag, "replaced existing boid");
        }
        Ok(())
    }

    /// The boid at `tag`, or `None`.
    pub fn get_boid(&self, tag: BoidTag) -> Option<&Boid> {
        self.boids.get(&tag)
    }

    /// Like [`World::get_boid`] but with an error for absent tags.
    pub fn boid(&self, tag: BoidTag) -> Result<&Boid, SimError> {
        self.get_boid(tag).ok_or(SimError::BoidNotFound(tag))
    }

    /// Call `f` once per boid in iteration order.
    pub fn for_each_boid(&self, mut f: impl FnMut(&Boid)) {
        for boid in self.boids.values() {
            f(boid);
        }
    }

    /// Every boid strictly closer than `cutoff` to `from`, in scan order.
    ///
    /// `from` itself is skipped by identity, so a detached copy of a boid at
    /// the same position is still reported as a neighbor of the original.
    pub fn find_nearby_boids(&self, from: &Boid, cutoff: f32) -> Vec<&Boid> {
        self.boids
            .values()
            .filter(|other| !std::ptr::eq(from, *other))
            .filter(|other| from.position.distance(other.position) < cutoff)
            .collect()
    }

    fn plan(&self, tag: BoidTag) -> Option<SteeringUpdate> {
        let boid = self.boids.get(&tag)?;
        let neighbors = self.find_nearby_boids(boid, self.config.neighbor_cutoff);
        Some(boid.steer(&neighbors, &self.config.steering))
    }

    /// Advance every boid by one tick of `delta` seconds.
    ///
    /// In [`UpdateMode::Sequential`] each boid is planned and applied before
    /// the next is planned, so later boids see this tick's earlier moves. In
    /// [`UpdateMode::TwoPhase`] every plan is made from the start-of-tick state
    /// first. A rejected delta leaves the world untouched.
    pub fn update(&mut self, delta: f32) -> Result<(), SimError> {
        if let Err(err) = check_delta(delta) {
            tracing::warn!(delta, "rejecting tick delta");
            return Err(err);
        }
        let _span = tracing::debug_span!("flock_update", tick = self.tick + 1).entered();

        let tags: Vec<BoidTag> = self.boids.keys().copied().collect();
        match self.config.update_mode {
            UpdateMode::Sequential => {
                for tag in tags {
                    if let Some(update) = self.plan(tag) {
                        self.apply(tag, update, delta);
                    }
                }
            }
            UpdateMode::TwoPhase => {
                let plans: Vec<(BoidTag, SteeringUpdate)> = tags
                    .into_iter()
                    .filter_map(|tag| self.plan(tag).map(|update| (tag, update)))
                    .collect();
                for (tag, update) in plans {
                    self.apply(tag, update, delta);
                }
            }
        }

        self.tick += 1;
        self.event_log.push(WorldEvent::Stepped {
            tick: self.tick,
            delta,
        });

        tracing::trace!(
            boids = self.boids.len(),
            friend_links = self.boids.values().map(|b| b.friends.len()).sum::<usize>(),
            "tick complete"
        );
        Ok(())
    }

    fn apply(&mut self, tag: BoidTag, update: SteeringUpdate, delta: f32) {
        if let Some(boid) = self.boids.get_mut(&tag) {
            boid.apply(update, delta);
        }
    }

    /// Rebuild a world from an event log by re-adding boids and re-running ticks.
    pub fn replay(config: SimConfig, events: &[WorldEvent]) -> Result<Self, SimError> {
        let mut world = Self::with_config(config)?;
        for event in events {
            match event {
                WorldEvent::BoidAdded { boid } => world.add_boid(boid.clone())?,
                WorldEvent::Stepped { delta, .. } => world.update(*delta)?,
            }
        }
        Ok(world)
    }

    /// Deterministic hash of the tick and every boid's kinematic state, in
    /// canonical (tag) order.
    pub fn state_hash(&self) -> u64 {
        let mut h: u64 = 0xcbf2_9ce4_8422_2325; // FNV offset basis
        let mix = |h: &mut u64, bytes: &[u8]| {
            for &b in bytes {
                *h ^= b as u64;
                *h = h.wrapping_mul(0x0100_0000_01b3);
            }
        };
        mix(&mut h, &self.tick.to_le_bytes());
        for (tag, boid) in &self.boids {
            mix(&mut h, &tag.0.to_le_bytes());
            for v in [boid.position, boid.direction] {
                mix(&mut h, &v.x.to_le_bytes());
                mix(&mut h, &v.y.to_le_bytes());
                mix(&mut h, &v.z.to_le_bytes());
            }
            mix(&mut h, &boid.speed.to_le_bytes());
        }
        h
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flock_common::ConfigError;
    use glam::Vec3;

    const DELTA: f32 = 1.0 / 60.0;

    fn boid(tag: u64, position: Vec3) -> Boid {
        Boid::new(BoidTag(tag), position, Vec3::X, 0.75)
    }

    fn line_world(count: u64, spacing: f32) -> World {
        let mut w = World::new();
        for i in 0..count {
            let dir = if i % 2 == 0 { Vec3::X } else { Vec3::Z };
            w.add_boid(Boid::new(
                BoidTag(i),
                Vec3::new(i as f32 * spacing, 0.0, (i % 3) as f32 * 0.1),
                dir,
                0.75,
            ))
            .unwrap();
        }
        w
    }

    #[test]
    fn world_starts_empty() {
        let w = World::new();
        assert_eq!(w.tick(), 0);
        assert_eq!(w.boid_count(), 0);
        assert_eq!(w.config(), &SimConfig::default());
    }

    #[test]
    fn with_config_rejects_invalid() {
        let config = SimConfig {
            neighbor_cutoff: -1.0,
            ..SimConfig::default()
        };
        assert!(matches!(
            World::with_config(config),
            Err(SimError::Config(ConfigError::NonPositive { .. }))
        ));
    }

    #[test]
    fn add_boid_overwrites_same_tag() {
        let mut w = World::new();
        w.add_boid(boid(7, Vec3::ZERO)).unwrap();
        w.add_boid(boid(7, Vec3::new(2.0, 0.0, 0.0))).unwrap();
        assert_eq!(w.boid_count(), 1);
        assert_eq!(w.get_boid(BoidTag(7)).unwrap().position, Vec3::new(2.0, 0.0, 0.0));
    }

    #[test]
    fn add_boid_rejects_non_positive_caps() {
        let mut w = World::new();
        let zero_mass = boid(0, Vec3::ZERO).with_mass(0.0);
        assert_eq!(
            w.add_boid(zero_mass),
            Err(SimError::Config(ConfigError::NonPositive {
                field: "boid.mass",
                value: 0.0
            }))
        );
        assert!(w.add_boid(boid(1, Vec3::ZERO).with_max_speed(-1.0)).is_err());
        assert!(w.add_boid(boid(2, Vec3::ZERO).with_max_force(f32::NAN)).is_err());
        assert_eq!(w.boid_count(), 0);
        assert!(w.events().is_empty());

        // Nothing left in the world can turn a tick into NaN.
        w.add_boid(boid(3, Vec3::ZERO)).unwrap();
        w.update(DELTA).unwrap();
        assert!(!w.get_boid(BoidTag(3)).unwrap().position.is_nan());
    }

    #[test]
    fn absent_tag_is_not_found() {
        let w = World::new();
        assert!(w.get_boid(BoidTag(3)).is_none());
        assert!(matches!(
            w.boid(BoidTag(3)),
            Err(SimError::BoidNotFound(BoidTag(3)))
        ));
    }

    #[test]
    fn for_each_boid_visits_in_tag_order() {
        let mut w = World::new();
        for tag in [5, 1, 3] {
            w.add_boid(boid(tag, Vec3::ZERO)).unwrap();
        }
        let mut seen = Vec::new();
        w.for_each_boid(|b| seen.push(b.tag.0));
        assert_eq!(seen, vec![1, 3, 5]);
    }

    #[test]
    fn cutoff_is_strict() {
        let mut w = World::new();
        w.add_boid(boid(0, Vec3::ZERO)).unwrap();
        w.add_boid(boid(1, Vec3::new(1.0, 0.0, 0.0))).unwrap();
        w.add_boid(boid(2, Vec3::new(0.0, 0.0, -0.999))).unwrap();
        let me = w.get_boid(BoidTag(0)).unwrap();
        let tags: Vec<BoidTag> = w.find_nearby_boids(me, 1.0).iter().map(|b| b.tag).collect();
        assert_eq!(tags, vec![BoidTag(2)]);
    }

    #[test]
    fn self_is_excluded_by_identity() {
        let mut w = World::new();
        w.add_boid(boid(0, Vec3::ZERO)).unwrap();
        w.add_boid(boid(1, Vec3::ZERO)).unwrap();
        let me = w.get_boid(BoidTag(0)).unwrap();
        let nearby = w.find_nearby_boids(me, 1.0);
        assert_eq!(nearby.len(), 1);
        assert_eq!(nearby[0].tag, BoidTag(1));

        // A detached copy is a different boid, so the original counts.
        let copy = me.clone();
        assert_eq!(w.find_nearby_boids(&copy, 1.0).len(), 2);
    }

    #[test]
    fn single_boid_moves_in_straight_line() {
        let mut w = World::new();
        w.add_boid(boid(0, Vec3::ZERO)).unwrap();
        w.update(DELTA).unwrap();
        let b = w.get_boid(BoidTag(0)).unwrap();
        assert!((b.position - Vec3::new(0.0125, 0.0, 0.0)).length() < 1e-6);
        assert!((b.direction - Vec3::X).length() < 1e-6);
        assert!((b.speed - 0.75).abs() < 1e-4);
        assert!(b.friends.is_empty());
    }

    #[test]
    fn close_pair_are_friends_and_separate() {
        let mut w = World::new();
        w.add_boid(Boid::new(BoidTag(0), Vec3::ZERO, Vec3::Z, 0.75)).unwrap();
        w.add_boid(Boid::new(BoidTag(1), Vec3::new(0.5, 0.0, 0.0), Vec3::Z, 0.75)).unwrap();

        let a = w.get_boid(BoidTag(0)).unwrap();
        let b = w.get_boid(BoidTag(1)).unwrap();
        let forces = crate::SteeringForces::compute(a, &[b], &w.config().steering);
        assert!(forces.separation.x < 0.0);

        w.update(DELTA).unwrap();
        assert_eq!(w.get_boid(BoidTag(0)).unwrap().friends, vec![BoidTag(1)]);
        assert_eq!(w.get_boid(BoidTag(1)).unwrap().friends, vec![BoidTag(0)]);
    }

    #[test]
    fn invalid_delta_is_rejected_without_mutation() {
        let mut w = line_world(4, 0.3);
        let before = w.state_hash();
        for delta in [0.0, -DELTA, f32::NAN, f32::INFINITY] {
            assert!(matches!(w.update(delta), Err(SimError::InvalidDelta(_))));
        }
        assert_eq!(w.tick(), 0);
        assert_eq!(w.state_hash(), before);
    }

    #[test]
    fn directions_stay_unit_length() {
        let mut w = line_world(12, 0.4);
        for _ in 0..120 {
            w.update(DELTA).unwrap();
        }
        w.for_each_boid(|b| {
            assert!(!b.position.is_nan());
            if b.speed > 0.0 {
                assert!((b.direction.length() - 1.0).abs() < 1e-4);
            }
        });
    }

    #[test]
    fn identical_runs_are_identical() {
        let mut w1 = line_world(16, 0.35);
        let mut w2 = line_world(16, 0.35);
        for _ in 0..200 {
            w1.update(DELTA).unwrap();
            w2.update(DELTA).unwrap();
            assert_eq!(w1.state_hash(), w2.state_hash());
        }
        for (a, b) in w1.boids().values().zip(w2.boids().values()) {
            assert_eq!(a.position, b.position);
            assert_eq!(a.direction, b.direction);
        }
    }

    #[test]
    fn sequential_sees_earlier_moves() {
        // Boid 1 sits just outside boid 0's cutoff and boid 0 moves toward it,
        // so only the sequential update lets boid 1 see boid 0 this tick.
        let setup = |mode| {
            let config = SimConfig {
                update_mode: mode,
                ..SimConfig::default()
            };
            let mut w = World::with_config(config).unwrap();
            w.add_boid(Boid::new(BoidTag(0), Vec3::ZERO, Vec3::X, 1.5)).unwrap();
            w.add_boid(Boid::new(BoidTag(1), Vec3::new(1.01, 0.0, 0.0), Vec3::X, 0.0)).unwrap();
            w.update(DELTA).unwrap();
            w
        };
        let sequential = setup(UpdateMode::Sequential);
        let two_phase = setup(UpdateMode::TwoPhase);

        assert!(sequential.get_boid(BoidTag(0)).unwrap().friends.is_empty());
        assert_eq!(
            sequential.get_boid(BoidTag(1)).unwrap().friends,
            vec![BoidTag(0)]
        );
        assert!(two_phase.get_boid(BoidTag(1)).unwrap().friends.is_empty());
    }

    #[test]
    fn two_phase_ignores_tag_order() {
        let config = SimConfig {
            update_mode: UpdateMode::TwoPhase,
            ..SimConfig::default()
        };
        let positions = [
            Vec3::ZERO,
            Vec3::new(0.4, 0.0, 0.0),
            Vec3::new(0.2, 0.0, 0.3),
        ];
        let last = positions.len() as u64 - 1;
        let mut forward = World::with_config(config).unwrap();
        let mut reversed = World::with_config(config).unwrap();
        for (i, p) in positions.iter().enumerate() {
            forward.add_boid(boid(i as u64, *p)).unwrap();
            reversed.add_boid(boid(last - i as u64, *p)).unwrap();
        }
        for _ in 0..10 {
            forward.update(DELTA).unwrap();
            reversed.update(DELTA).unwrap();
        }
        for i in 0..=last {
            let a = forward.get_boid(BoidTag(i)).unwrap();
            let b = reversed.get_boid(BoidTag(last - i)).unwrap();
            assert!((a.position - b.position).length() < 1e-5);
        }
    }

    #[test]
    fn events_are_recorded() {
        let mut w = World::new();
        w.add_boid(boid(0, Vec3::ZERO)).unwrap();
        w.update(DELTA).unwrap();
        w.add_boid(boid(1, Vec3::ONE)).unwrap();
        assert_eq!(w.events().len(), 3);
        assert!(matches!(w.events()[1], WorldEvent::Stepped { tick: 1, .. }));
    }

    #[test]
    fn drain_events_clears_log() {
        let mut w = World::new();
        w.add_boid(boid(0, Vec3::ZERO)).unwrap();
        let events = w.drain_events();
        assert_eq!(events.len(), 1);
        assert!(w.events().is_empty());
    }

    #[test]
    fn draining_each_tick_keeps_log_bounded() {
        let mut w = line_world(4, 0.3);
        w.drain_events();
        for _ in 0..100 {
            w.update(DELTA).unwrap();
            assert_eq!(w.drain_events().len(), 1);
        }
        w.update(DELTA).unwrap();
        w.clear_events();
        assert!(w.events().is_empty());
        assert_eq!(w.tick(), 101);
    }

    #[test]
    fn replay_equivalence() {
        let mut w = line_world(10, 0.3);
        for _ in 0..30 {
            w.update(DELTA).unwrap();
        }
        w.add_boid(boid(99, Vec3::new(0.1, 0.0, 0.1))).unwrap();
        for _ in 0..30 {
            w.update(1.0 / 30.0).unwrap();
        }

        let replayed = World::replay(*w.config(), w.events()).unwrap();
        assert_eq!(replayed.tick(), w.tick());
        assert_eq!(replayed.boid_count(), w.boid_count());
        assert_eq!(replayed.state_hash(), w.state_hash());
    }

    #[test]
    fn state_hash_tracks_motion() {
        let mut w = line_world(3, 2.0);
        let before = w.state_hash();
        w.update(DELTA).unwrap();
        assert_ne!(before, w.state_hash());
    }

    #[test]
    fn independent_worlds_do_not_share_state() {
        let mut a = World::new();
        let b = World::new();
        a.add_boid(boid(0, Vec3::ZERO)).unwrap();
        assert_eq!(a.boid_count(), 1);
        assert_eq!(b.boid_count(), 0);
    }
}
