//! Incremental maze generation
//!
//! Two independent algorithms behind one interface so the host can drive
//! either with the same per-frame loop:
//! - `scatter`: per-cell randomization plus Bresenham connector carving.
//!   Fast, imperfect, makes no connectivity promise.
//! - `backtracker`: randomized depth-first search producing a perfect maze
//!   (spanning tree over the grid), one graph step per call.
//!
//! Generation runs cooperatively: each `step()` does a bounded amount of
//! work so the host can interleave it with rendering, one step per frame.

pub mod backtracker;
pub mod scatter;

pub use backtracker::{BacktrackerMaze, GridCell};
pub use scatter::{ScatterCell, ScatterMaze};

/// Uniform driving surface for the maze variants.
///
/// `step()` returns true while more work remains. `stop()` cancels an
/// in-progress generation without marking it complete; a cancelled maze
/// never reports `is_complete`. The cell snapshot is only worth
/// serializing once `is_complete()` is true - storage is the host's job.
pub trait MazeGenerator {
    type Cell;

    fn start(&mut self);
    fn stop(&mut self);
    fn step(&mut self) -> bool;
    fn is_complete(&self) -> bool;
    fn cells(&self) -> &[Self::Cell];
}
