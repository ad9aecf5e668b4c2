//! Deterministic simulation module
//!
//! All contagion logic lives here. This module must be pure and deterministic:
//! - Seeded RNG only (placement and launch angles)
//! - Stable iteration order (by cube index, pairs resolved with i < j)
//! - No rendering or platform dependencies
//!
//! The driver calls `reset` while idle, `start` once, then `step` per display
//! refresh, and reads `snapshot` afterward.

pub mod collision;
pub mod state;
pub mod tick;

pub use collision::{Contact, contain, cube_contact, exchange_momentum, separate};
pub use state::{Cube, Phase, RngState, Simulation, Snapshot};
pub use tick::StepReport;
