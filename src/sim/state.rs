//! Core simulation state types

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Run state. `Finished` and `Crashed` are terminal; only regenerating the
/// track returns the sim to `Playing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimPhase {
    Playing,
    Finished,
    Crashed,
}

/// Camera framing mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViewMode {
    /// Track the car at 1:1 zoom
    Follow,
    /// Fit the whole track into the viewport
    Map,
}

/// Discrete control directions delivered by the host input layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Held-key state for the four discrete controls
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputState {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl InputState {
    pub fn set(&mut self, direction: Direction, pressed: bool) {
        match direction {
            Direction::Up => self.up = pressed,
            Direction::Down => self.down = pressed,
            Direction::Left => self.left = pressed,
            Direction::Right => self.right = pressed,
        }
    }
}

/// The simulated car: pose, scalar speed and fixed physical constants.
/// Owned and mutated exclusively by the simulation loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Car {
    pub pos: Vec2,
    /// Heading in radians; 0 faces +x
    pub angle: f32,
    pub speed: f32,
    pub width: f32,
    pub height: f32,
    pub max_speed: f32,
    pub acceleration: f32,
    pub friction: f32,
    pub turn_speed: f32,
    pub off_road: bool,
}

impl Default for Car {
    fn default() -> Self {
        Self {
            pos: Vec2::ZERO,
            angle: -std::f32::consts::FRAC_PI_2,
            speed: 0.0,
            width: CAR_WIDTH,
            height: CAR_HEIGHT,
            max_speed: CAR_MAX_SPEED,
            acceleration: CAR_ACCELERATION,
            friction: CAR_FRICTION,
            turn_speed: CAR_TURN_SPEED,
            off_road: false,
        }
    }
}

/// View artifact: position and zoom eased exponentially toward a per-mode
/// target every tick. Never persisted.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Camera {
    pub pos: Vec2,
    pub zoom: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            pos: Vec2::ZERO,
            zoom: 1.0,
        }
    }
}

impl Camera {
    pub fn ease(&mut self, target_pos: Vec2, target_zoom: f32, dt: f32) {
        self.pos += (target_pos - self.pos) * CAMERA_EASE * dt;
        self.zoom += (target_zoom - self.zoom) * CAMERA_EASE * dt;
    }
}

/// Immutable per-tick output snapshot. The host renders this however it
/// likes; the core never writes into UI sinks directly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HudSnapshot {
    pub elapsed_secs: f32,
    pub speed: f32,
    pub progress_pct: u32,
    pub phase: SimPhase,
}

impl HudSnapshot {
    pub fn clock_text(&self) -> String {
        format_clock(self.elapsed_secs)
    }

    pub fn speed_text(&self) -> String {
        format_speed(self.speed)
    }
}

/// Elapsed time as `MM:SS.cc`
pub fn format_clock(secs: f32) -> String {
    let total_centis = (secs.max(0.0) as f64 * 100.0).round() as u64;
    let minutes = total_centis / 6000;
    let seconds = (total_centis / 100) % 60;
    let centis = total_centis % 100;
    format!("{minutes:02}:{seconds:02}.{centis:02}")
}

/// Speed readout as an integer with unit suffix
pub fn format_speed(speed: f32) -> String {
    format!("{} km/h", (speed.abs() * 0.1).floor() as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_format() {
        assert_eq!(format_clock(0.0), "00:00.00");
        assert_eq!(format_clock(61.23), "01:01.23");
        assert_eq!(format_clock(600.0), "10:00.00");
        assert_eq!(format_clock(-1.0), "00:00.00");
    }

    #[test]
    fn test_speed_format_rounds_down_and_drops_sign() {
        assert_eq!(format_speed(800.0), "80 km/h");
        assert_eq!(format_speed(-159.0), "15 km/h");
        assert_eq!(format_speed(0.0), "0 km/h");
    }

    #[test]
    fn test_camera_eases_halfway_at_dt_point_one() {
        let mut camera = Camera::default();
        camera.ease(Vec2::new(100.0, 50.0), 2.0, 0.1);
        assert!((camera.pos.x - 50.0).abs() < 1e-4);
        assert!((camera.pos.y - 25.0).abs() < 1e-4);
        assert!((camera.zoom - 1.5).abs() < 1e-4);
    }

    #[test]
    fn test_input_set() {
        let mut input = InputState::default();
        input.set(Direction::Up, true);
        input.set(Direction::Left, true);
        assert!(input.up && input.left && !input.down && !input.right);
        input.set(Direction::Up, false);
        assert!(!input.up);
    }
}
