//! Headless strategy-comparison runner.
//!
//! Runs a NAIVE and an OPTIMIZED engine in lockstep on a shared seed and
//! prints the sliding-window metrics of both as JSON, one document per
//! strategy. The simulation core itself stays free of any I/O; this binary
//! is the whole outer surface.

use anyhow::Result;
use clap::Parser;
use log::info;
use serde::Serialize;

use aquascan_core::constants::DEFAULT_METRICS_WINDOW_SEC;
use aquascan_core::enums::Strategy;
use aquascan_core::state::EvalMetrics;
use aquascan_core::tuning::TuningPatch;
use aquascan_sim::Engine;

/// Compare the baseline and the track-driven sweep strategy on one seed.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// RNG seed shared by both engines.
    #[arg(long, default_value_t = 1337)]
    seed: u32,

    /// Simulated duration in seconds.
    #[arg(long, default_value_t = 60.0)]
    duration: f64,

    /// Tick size in seconds (clamped by the engine to 0.1).
    #[arg(long, default_value_t = 0.05)]
    dt: f64,

    /// Number of randomly spawned swimmers.
    #[arg(long, default_value_t = 3)]
    swimmers: u32,

    /// Seconds of empty-pool warmup before the swimmers enter.
    #[arg(long, default_value_t = 70.0)]
    warmup: f64,

    /// Metrics window in seconds.
    #[arg(long, default_value_t = DEFAULT_METRICS_WINDOW_SEC)]
    window: f64,

    /// Detection threshold override.
    #[arg(long)]
    threshold: Option<f64>,

    /// Noise scale override.
    #[arg(long)]
    noise_scale: Option<f64>,
}

#[derive(Serialize)]
struct Report {
    strategy: Strategy,
    seed: u32,
    simulated_secs: f64,
    metrics: EvalMetrics,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let patch = TuningPatch {
        threshold: args.threshold,
        noise_scale: args.noise_scale,
        ..Default::default()
    };

    let mut engines = [
        Engine::new(Strategy::Naive, args.seed),
        Engine::new(Strategy::Optimized, args.seed),
    ];
    for engine in &mut engines {
        engine.set_tuning(&patch);
    }

    let warmup_steps = (args.warmup / args.dt).ceil() as u64;
    let steps = (args.duration / args.dt).ceil() as u64;
    info!(
        "seed {}: {} warmup + {} simulated steps of {} s",
        args.seed, warmup_steps, steps, args.dt
    );

    // Lockstep: both engines see identical swimmer populations and ticks.
    for _ in 0..warmup_steps {
        for engine in &mut engines {
            engine.tick(args.dt);
        }
    }
    for engine in &mut engines {
        for _ in 0..args.swimmers {
            engine.add_swimmer(None);
        }
    }
    for _ in 0..steps {
        for engine in &mut engines {
            engine.tick(args.dt);
        }
    }

    for engine in &engines {
        let report = Report {
            strategy: engine.strategy(),
            seed: args.seed,
            simulated_secs: engine.time(),
            metrics: engine.metrics(args.window),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    Ok(())
}
