//! Driver-facing error types
//!
//! The core has no I/O and no internal failure modes; everything here is a
//! rejected misuse of the API by the driver. Placement-retry exhaustion
//! during `reset` is deliberately NOT an error (see `sim::state`).

use thiserror::Error;

/// Rejected driver input.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum SimError {
    /// `reset` was called with fewer than two cubes. A lone cube can never
    /// spread infection, so the run would have no defined termination.
    #[error("population of {0} cannot sustain an outbreak (minimum is 2)")]
    PopulationTooSmall(usize),

    /// `step` was called with a negative or non-finite frame delta. This is
    /// a programming error in the driver, not a recoverable condition.
    #[error("invalid frame delta: {0}")]
    InvalidDelta(f32),
}
