use std::hint::black_box;
use std::time::Instant;

use flock_common::{BoidTag, SimConfig, UpdateMode};
use flock_kernel::{Boid, World};
use glam::Vec3;

const DELTA: f32 = 1.0 / 60.0;

fn make_world(boid_count: usize, spacing: f32, mode: UpdateMode) -> World {
    let config = SimConfig {
        update_mode: mode,
        ..SimConfig::default()
    };
    let mut world = World::with_config(config).expect("default config is valid");
    let side = (boid_count as f32).sqrt().ceil() as usize;
    for i in 0..boid_count {
        let x = (i % side) as f32 * spacing;
        let z = (i / side) as f32 * spacing;
        let angle = i as f32 * 0.618;
        world.add_boid(Boid::new(
            BoidTag(i as u64),
            Vec3::new(x, 0.0, z),
            Vec3::new(angle.cos(), 0.0, angle.sin()),
            0.75,
        ))
        .expect("default caps are valid");
    }
    world
}

fn bench_update(boid_count: usize, mode: UpdateMode, iterations: usize) {
    let mut world = make_world(boid_count, 0.5, mode);

    let start = Instant::now();
    for _ in 0..iterations {
        world.update(black_box(DELTA)).expect("delta is valid");
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!(
        "  update {mode:?} ({boid_count} boids, {iterations} ticks): {per_iter:?}/tick, total {elapsed:?}"
    );
}

fn bench_neighbor_query(boid_count: usize, iterations: usize) {
    let world = make_world(boid_count, 0.5, UpdateMode::Sequential);
    let Some(from) = world.get_boid(BoidTag(0)) else {
        return;
    };

    let start = Instant::now();
    for _ in 0..iterations {
        let _ = black_box(world.find_nearby_boids(black_box(from), black_box(1.0)));
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!(
        "  neighbor query ({boid_count} boids, {iterations} iters): {per_iter:?}/iter, total {elapsed:?}"
    );
}

fn main() {
    println!("=== Flock Update Benchmarks ===\n");

    println!("Neighbor query:");
    bench_neighbor_query(100, 10000);
    bench_neighbor_query(1000, 1000);

    println!("\nWorld update:");
    for mode in [UpdateMode::Sequential, UpdateMode::TwoPhase] {
        bench_update(100, mode, 1000);
        bench_update(500, mode, 100);
        bench_update(2000, mode, 10);
    }

    println!("\n=== Done ===");
}
