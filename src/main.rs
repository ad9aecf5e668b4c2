//! Contagion Cubes entry point
//!
//! Headless driver standing in for the rendering/UI layer: validates the
//! population size the same way the on-screen controls would, seeds the
//! simulation, then steps it at a fixed 60 Hz delta and polls the snapshot
//! until the outbreak completes. Wall-clock timing lives here, not in the
//! core - the simulation only ever sees relative deltas.
//!
//! Usage: contagion-cubes [count] [seed] [speed]
//! Config overrides are read from the JSON file named by CONTAGION_CONFIG.

use std::time::Instant;

use contagion_cubes::consts::{MAX_CUBES, MIN_CUBES};
use contagion_cubes::{SimConfig, Simulation};

/// Fixed display-refresh delta fed to the core
const DT: f32 = 1.0 / 60.0;

/// Safety cap: one simulated hour
const MAX_STEPS: u64 = 60 * 60 * 60;

fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let count: usize = args.next().and_then(|a| a.parse().ok()).unwrap_or(50);
    let seed: u64 = args
        .next()
        .and_then(|a| a.parse().ok())
        .unwrap_or_else(rand::random);
    let speed: f32 = args.next().and_then(|a| a.parse().ok()).unwrap_or(1.0);

    // Driver-side validation; the core itself only rejects counts below 2
    let count = count.clamp(MIN_CUBES, MAX_CUBES);
    let speed = speed.max(0.0);

    let config = match std::env::var("CONTAGION_CONFIG") {
        Ok(path) => SimConfig::load(&path),
        Err(_) => SimConfig::default(),
    };

    let mut sim = Simulation::new(seed, config);
    if let Err(err) = sim.reset(count) {
        log::error!("reset failed: {err}");
        std::process::exit(1);
    }
    sim.start();
    log::info!("Running outbreak: {count} cubes, seed {seed}, speed x{speed}");

    let started = Instant::now();
    let mut last_count = sim.infected_count();
    while !sim.is_finished() && sim.steps() < MAX_STEPS {
        let report = match sim.step(DT, speed) {
            Ok(report) => report,
            Err(err) => {
                log::error!("step rejected: {err}");
                break;
            }
        };
        if report.infected_count != last_count {
            last_count = report.infected_count;
            log::info!(
                "{}/{} infected after {:.1}s simulated",
                report.infected_count,
                count,
                sim.steps() as f32 * DT
            );
        }
    }

    let snapshot = sim.snapshot();
    if snapshot.finished {
        println!(
            "All {} cubes infected after {:.1}s simulated ({:.2?} wall clock, seed {})",
            count,
            sim.steps() as f32 * DT,
            started.elapsed(),
            seed
        );
    } else {
        println!(
            "Stopped after {} steps with {}/{} infected (seed {})",
            sim.steps(),
            snapshot.infected_count,
            count,
            seed
        );
    }
}
