//! Simulation tuning
//!
//! Defaults mirror `crate::consts` exactly; the driver may override them
//! from a JSON file. The snapshot consumer and the core must agree on these
//! values, so a loaded config is applied before `reset`, never mid-run.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Arena and physics tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Arena extent along X
    pub arena_width: f32,
    /// Arena extent along Z
    pub arena_depth: f32,
    /// Cube edge length
    pub cube_size: f32,
    /// Speed scale applied to unit velocities at integration time
    pub base_speed: f32,
    /// Upper clamp on the per-step delta (seconds)
    pub max_step_dt: f32,
    /// Minimum spawn separation as a multiple of `cube_size`
    pub spawn_separation_factor: f32,
    /// Placement attempts per cube before overlap is tolerated
    pub spawn_max_attempts: u32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            arena_width: ARENA_WIDTH,
            arena_depth: ARENA_DEPTH,
            cube_size: CUBE_SIZE,
            base_speed: BASE_SPEED,
            max_step_dt: MAX_STEP_DT,
            spawn_separation_factor: SPAWN_SEPARATION_FACTOR,
            spawn_max_attempts: SPAWN_MAX_ATTEMPTS,
        }
    }
}

impl SimConfig {
    /// Inward-shrunk containment bound on X: cube centers stay in `±bound_x`
    pub fn bound_x(&self) -> f32 {
        self.arena_width / 2.0 - self.cube_size / 2.0
    }

    /// Inward-shrunk containment bound on Z
    pub fn bound_z(&self) -> f32 {
        self.arena_depth / 2.0 - self.cube_size / 2.0
    }

    /// Render height of every cube center (motion is planar)
    pub fn cube_y(&self) -> f32 {
        self.cube_size / 2.0
    }

    /// Load from a JSON file, falling back to defaults on any error
    pub fn load(path: &str) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(config) => {
                    log::info!("Loaded config from {path}");
                    config
                }
                Err(err) => {
                    log::warn!("Ignoring malformed config {path}: {err}");
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("No config at {path}, using defaults");
                Self::default()
            }
        }
    }
}
