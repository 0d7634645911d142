//! Raceline - procedural track/maze generation and a real-time driving sim
//!
//! Core modules:
//! - `track`: procedural spine generation, smoothing, border offsets
//! - `maze`: two incremental maze generators behind one interface
//! - `sensor`: ray-fan perception against the road borders
//! - `brain`: step-activation feed-forward controller
//! - `sim`: variable-timestep physics loop, camera, HUD snapshots
//! - `render`: stateless drawing onto a 2D surface contract

pub mod brain;
pub mod config;
pub mod error;
pub mod geom;
pub mod maze;
pub mod render;
pub mod sensor;
pub mod sim;
pub mod track;

pub use brain::NeuralNetwork;
pub use config::RaceConfig;
pub use error::RaceError;
pub use render::{Palette, Rgba, Surface2D};
pub use sim::{CancelToken, HudSnapshot, RaceSim, Reporter, SimPhase, ViewMode};
pub use track::Track;

/// Tuning constants shared across the sim
pub mod consts {
    use std::f32::consts::FRAC_PI_2;

    /// Distance between consecutive spine points before smoothing
    pub const TRACK_SEGMENT_LENGTH: f32 = 40.0;
    /// Points in the fixed straight launch section
    pub const TRACK_START_STRAIGHT: usize = 5;
    /// Points in the fixed straight finish section
    pub const TRACK_END_STRAIGHT: usize = 10;
    /// Heading perturbation per step is uniform in ± half of this
    pub const TRACK_CURVATURE: f32 = 0.8;
    /// Moving-average passes applied to the raw spine
    pub const TRACK_SMOOTH_PASSES: usize = 4;
    /// Extra margin around the spine when fitting the whole track on screen
    pub const TRACK_BOUNDS_MARGIN: f32 = 150.0;

    /// Car body size (height is the long axis, along the heading)
    pub const CAR_WIDTH: f32 = 24.0;
    pub const CAR_HEIGHT: f32 = 44.0;
    pub const CAR_MAX_SPEED: f32 = 800.0;
    pub const CAR_ACCELERATION: f32 = 400.0;
    pub const CAR_FRICTION: f32 = 200.0;
    /// Turn rate in radians per second at speed
    pub const CAR_TURN_SPEED: f32 = 2.5;
    /// Below this speed friction snaps the car to a stop and steering disengages
    pub const CAR_STOP_SPEED: f32 = 10.0;
    /// Speed cap while off the carriageway
    pub const OFF_ROAD_MAX_SPEED: f32 = 150.0;

    pub const SENSOR_RAY_COUNT: usize = 5;
    pub const SENSOR_RAY_LENGTH: f32 = 150.0;
    /// Total angular fan of the sensor rays (90 degrees)
    pub const SENSOR_RAY_SPREAD: f32 = FRAC_PI_2;

    /// Hidden layer width of the driving controller
    pub const BRAIN_HIDDEN: usize = 6;
    /// Controller outputs: forward, reverse, left, right
    pub const BRAIN_OUTPUTS: usize = 4;

    /// Largest dt a single tick will integrate (tab-switch stall guard)
    pub const MAX_TICK_DT: f32 = 0.1;
    /// Exponential camera easing rate, per second
    pub const CAMERA_EASE: f32 = 5.0;
    /// Fraction of the viewport the fitted track occupies in map view
    pub const MAP_ZOOM_FILL: f32 = 0.9;

    /// Probability that a boundary cell becomes an entrance (scatter maze)
    pub const MAZE_ENTRANCE_PROBABILITY: f64 = 0.1;
}
