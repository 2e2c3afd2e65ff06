use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use flock_common::{BoidTag, SimConfig};
use flock_kernel::{Boid, World};
use flock_tools::{FlockInspector, ScatterConfig, scatter};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "flock-cli", about = "Headless driver for the flocking kernel")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// YAML simulation config; omitted fields keep their defaults
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct FlockArgs {
    /// Number of boids to scatter
    #[arg(short, long, default_value = "100")]
    boids: usize,
    /// Number of ticks to simulate
    #[arg(short, long, default_value = "600")]
    ticks: u64,
    /// Ticks per simulated second; each tick advances 1/fps seconds
    #[arg(long, default_value = "60")]
    fps: f32,
    /// RNG seed for the initial flock
    #[arg(short, long, default_value = "42")]
    seed: u64,
}

#[derive(Subcommand)]
enum Commands {
    /// Print crate versions and the effective config
    Info,
    /// Scatter a flock and run it
    Run {
        #[command(flatten)]
        flock: FlockArgs,
        /// Print every boid as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },
    /// Run the same flock twice and replay its event log; compare state hashes
    Verify {
        #[command(flatten)]
        flock: FlockArgs,
    },
    /// Run a flock, then print one boid, its friends and its current steering
    Inspect {
        #[command(flatten)]
        flock: FlockArgs,
        /// Tag of the boid to inspect
        #[arg(long, default_value = "0")]
        tag: u64,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => SimConfig::default(),
    };

    match cli.command {
        Commands::Info => {
            println!("flock-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("tools: {}", flock_tools::crate_info());
            print!("{}", serde_yaml::to_string(&config)?);
        }
        Commands::Run { flock, json } => {
            let world = run_flock(config, &flock)?;
            if json {
                let boids: Vec<&Boid> = world.boids().values().collect();
                println!("{}", serde_json::to_string_pretty(&boids)?);
            } else {
                println!("{}", FlockInspector::summary(&world));
            }
        }
        Commands::Verify { flock } => {
            let w1 = run_flock(config, &flock)?;
            let w2 = run_flock(config, &flock)?;
            let replayed = World::replay(config, w1.events()).context("replaying event log")?;

            println!("Run 1:  tick={} hash={:#x}", w1.tick(), w1.state_hash());
            println!("Run 2:  tick={} hash={:#x}", w2.tick(), w2.state_hash());
            println!(
                "Replay: tick={} hash={:#x}",
                replayed.tick(),
                replayed.state_hash()
            );
            let matched = w1.state_hash() == w2.state_hash()
                && w1.state_hash() == replayed.state_hash();
            println!("Match: {}", if matched { "OK" } else { "MISMATCH" });
            if !matched {
                anyhow::bail!("determinism check failed");
            }
        }
        Commands::Inspect { flock, tag } => {
            let world = run_flock(config, &flock)?;
            let tag = BoidTag(tag);
            let info = FlockInspector::inspect_boid(&world, tag)
                .ok_or(flock_kernel::SimError::BoidNotFound(tag))?;
            println!("{info}");
            for friend in &info.friends {
                if let Some(friend) = FlockInspector::inspect_boid(&world, *friend) {
                    println!("  friend {friend}");
                }
            }
            if let Some(forces) = FlockInspector::steering_at(&world, tag) {
                println!(
                    "  steering cohesion={:?} separation={:?} alignment={:?}",
                    forces.cohesion, forces.separation, forces.alignment
                );
            }
        }
    }

    Ok(())
}

fn load_config(path: &Path) -> Result<SimConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let config: SimConfig = serde_yaml::from_str(&text)
        .with_context(|| format!("parsing config {}", path.display()))?;
    config.validate()?;
    Ok(config)
}

fn run_flock(config: SimConfig, args: &FlockArgs) -> Result<World> {
    if !(args.fps.is_finite() && args.fps > 0.0) {
        anyhow::bail!("fps must be positive, got {}", args.fps);
    }
    let mut world = World::with_config(config)?;
    scatter(
        &mut world,
        &ScatterConfig {
            count: args.boids,
            seed: args.seed,
            ..ScatterConfig::default()
        },
    )?;

    let delta = 1.0 / args.fps;
    tracing::info!(ticks = args.ticks, delta, mode = ?config.update_mode, "running flock");
    for _ in 0..args.ticks {
        world.update(delta)?;
    }
    Ok(world)
}
