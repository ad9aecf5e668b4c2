//! Simulation state and core types
//!
//! Everything the driver can observe lives here; `tick` mutates it in place.
//! Cube order is the stable correlation index for the presentation layer, so
//! cubes are never added, removed, or reordered between resets.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::config::SimConfig;
use crate::error::SimError;

/// Lifecycle phase as observed by the driver
///
/// `Finished` is sticky: the only exit is `reset`, which returns to `Idle`.
/// There is no direct `Finished -> Running` edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Population placed, waiting for the driver to start
    Idle,
    /// Stepping every display refresh
    Running,
    /// Every cube is infected; `step` is a no-op
    Finished,
}

/// A single simulated cube
///
/// Motion is planar: `pos` and `vel` hold the (x, z) components, and the
/// render height is fixed at half the cube edge. `vel` stays a unit vector;
/// speed is applied at integration time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cube {
    pub pos: Vec2,
    pub vel: Vec2,
    pub infected: bool,
}

/// RNG state wrapper so a run can be reproduced from its seed
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    pub fn to_rng(&self) -> Pcg32 {
        Pcg32::seed_from_u64(self.seed)
    }
}

/// Read-only per-step view for the presentation layer
///
/// Positions are planar (x, z) pairs in cube-index order; the matching
/// infection flags share that order.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub positions: Vec<Vec2>,
    pub infected: Vec<bool>,
    pub infected_count: usize,
    pub finished: bool,
}

/// Complete simulation state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Simulation {
    config: SimConfig,
    rng_state: RngState,
    pub(crate) cubes: Vec<Cube>,
    pub(crate) phase: Phase,
    pub(crate) infected_count: usize,
    /// Steps taken since the last reset (advances even at zero speed)
    pub(crate) steps: u64,
}

impl Simulation {
    /// Create an empty, idle simulation. Call `reset` to place a population.
    pub fn new(seed: u64, config: SimConfig) -> Self {
        Self {
            config,
            rng_state: RngState::new(seed),
            cubes: Vec::new(),
            phase: Phase::Idle,
            infected_count: 0,
            steps: 0,
        }
    }

    /// Discard the population and place `count` cubes afresh.
    ///
    /// Placement is rejection sampling: candidates are drawn uniformly over
    /// the interior shrunk by one cube edge per side and accepted when at
    /// least `spawn_separation_factor * cube_size` away from every placed
    /// cube. When the attempt budget runs out the last candidate is kept -
    /// a tolerated overlap at spawn, resolved by the first collision pass,
    /// rather than a failed reset.
    ///
    /// Exactly the cube at index 0 starts infected.
    pub fn reset(&mut self, count: usize) -> Result<(), SimError> {
        if count < crate::consts::MIN_CUBES {
            return Err(SimError::PopulationTooSmall(count));
        }

        let mut rng = self.rng_state.to_rng();
        let spawn_x = self.config.arena_width - self.config.cube_size * 2.0;
        let spawn_z = self.config.arena_depth - self.config.cube_size * 2.0;
        let min_dist = self.config.cube_size * self.config.spawn_separation_factor;

        let mut cubes: Vec<Cube> = Vec::with_capacity(count);
        for i in 0..count {
            let mut pos = Vec2::ZERO;
            let mut placed = false;
            for _ in 0..self.config.spawn_max_attempts {
                pos = Vec2::new(
                    (rng.random::<f32>() - 0.5) * spawn_x,
                    (rng.random::<f32>() - 0.5) * spawn_z,
                );
                if cubes.iter().all(|c| c.pos.distance(pos) >= min_dist) {
                    placed = true;
                    break;
                }
            }
            if !placed {
                log::debug!("Spawn attempts exhausted for cube {i}, accepting overlap");
            }

            let angle = rng.random_range(0.0..std::f32::consts::TAU);
            cubes.push(Cube {
                pos,
                vel: Vec2::new(angle.cos(), angle.sin()),
                infected: i == 0,
            });
        }

        self.cubes = cubes;
        self.phase = Phase::Idle;
        self.infected_count = 1;
        self.steps = 0;
        log::info!("Placed {} cubes (seed {})", count, self.rng_state.seed);
        Ok(())
    }

    /// Begin stepping. Only valid from `Idle`; a finished run must be
    /// `reset` before it can start again.
    pub fn start(&mut self) {
        if self.phase == Phase::Idle && !self.cubes.is_empty() {
            self.phase = Phase::Running;
        }
    }

    /// Read-only view of the population in stable index order
    pub fn cubes(&self) -> &[Cube] {
        &self.cubes
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn seed(&self) -> u64 {
        self.rng_state.seed
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Finished
    }

    pub fn infected_count(&self) -> usize {
        self.infected_count
    }

    /// Steps taken since the last reset
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Snapshot for the presentation layer, polled after each step
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            positions: self.cubes.iter().map(|c| c.pos).collect(),
            infected: self.cubes.iter().map(|c| c.infected).collect(),
            infected_count: self.infected_count,
            finished: self.phase == Phase::Finished,
        }
    }
}
