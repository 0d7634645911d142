//! Error taxonomy for the sim core
//!
//! Only boundary problems are modeled here: bad configuration and shape
//! mismatches. Geometry degeneracies (parallel segments, zero-length
//! segments) are `Option`-typed at the call site, and invariant violations
//! inside the loop no-op rather than fault.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RaceError {
    #[error("lane count must be at least 2, got {0}")]
    LaneCount(u32),
    #[error("lane width must be positive, got {0}")]
    LaneWidth(f32),
    #[error("viewport must have positive dimensions, got {0}x{1}")]
    Viewport(f32, f32),
    #[error("maze grid must be at least 1x1, got {0}x{1}")]
    GridSize(usize, usize),
    #[error("controller expected {expected} inputs, got {got}")]
    InputWidth { expected: usize, got: usize },
    #[error("network needs at least two layer sizes, got {0}")]
    LayerCount(usize),
}
