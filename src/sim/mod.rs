//! Real-time driving simulation
//!
//! Single-threaded and cooperatively scheduled: the host calls `frame` once
//! per display refresh, and the loop is cancelled through an explicit token
//! rather than best-effort handle clearing.

pub mod reporter;
pub mod state;
pub mod tick;

pub use reporter::{NullReporter, RaceOutcome, Reporter};
pub use state::{
    Camera, Car, Direction, HudSnapshot, InputState, SimPhase, ViewMode, format_clock,
    format_speed,
};
pub use tick::{CancelToken, RaceSim};
