//! The simulation loop
//!
//! `RaceSim` owns the track, the car, its sensor and controller, and the
//! camera. The host drives it through commands (`generate_track`,
//! `set_input`, `toggle_view_mode`, ...) and one `frame` call per display
//! refresh. All integration uses measured elapsed time clamped to
//! `MAX_TICK_DT`, so a stalled tab cannot blow up the physics.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::reporter::{RaceOutcome, Reporter};
use super::state::{Camera, Car, Direction, HudSnapshot, InputState, SimPhase, ViewMode};
use crate::brain::NeuralNetwork;
use crate::config::RaceConfig;
use crate::consts::*;
use crate::error::RaceError;
use crate::geom::point_segment_distance_sq;
use crate::render::{Palette, Surface2D, draw_race};
use crate::sensor::Sensor;
use crate::track::Track;

/// Cooperative cancellation for the frame loop.
///
/// `stop_loop` cancels the token and `frame` checks it before doing any
/// work, so a tick already queued by the host scheduler becomes a no-op
/// instead of racing the stop.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[derive(Debug)]
pub struct RaceSim {
    pub config: RaceConfig,
    pub track: Track,
    pub car: Car,
    pub sensor: Sensor,
    pub brain: NeuralNetwork,
    pub input: InputState,
    pub camera: Camera,
    pub view_mode: ViewMode,
    pub phase: SimPhase,
    pub progress_pct: u32,
    /// Simulated seconds since the last regeneration; frozen in terminal states
    pub elapsed: f32,
    viewport: Vec2,
    rng: Pcg32,
    token: Option<CancelToken>,
    last_frame: Option<Instant>,
    overlay_shown: bool,
}

impl RaceSim {
    /// Build a sim for a drawing surface of the given pixel dimensions.
    /// Fails on degenerate viewports or invalid configuration - the core
    /// never generates geometry from bad inputs.
    pub fn new(config: RaceConfig, viewport: Vec2, seed: u64) -> Result<Self, RaceError> {
        config.validate()?;
        if !(viewport.x > 0.0 && viewport.y > 0.0) {
            return Err(RaceError::Viewport(viewport.x, viewport.y));
        }
        let mut rng = Pcg32::seed_from_u64(seed);
        let sensor = Sensor::default();
        let brain = NeuralNetwork::new(&[sensor.ray_count, BRAIN_HIDDEN, BRAIN_OUTPUTS], &mut rng)?;
        Ok(Self {
            config,
            track: Track::empty(),
            car: Car::default(),
            sensor,
            brain,
            input: InputState::default(),
            camera: Camera::default(),
            view_mode: ViewMode::Follow,
            phase: SimPhase::Playing,
            progress_pct: 0,
            elapsed: 0.0,
            viewport,
            rng,
            token: None,
            last_frame: None,
            overlay_shown: false,
        })
    }

    /// Generate the first track and arm the loop
    pub fn initialize(&mut self) -> CancelToken {
        self.generate_track(self.config.track_complexity);
        self.start_loop()
    }

    /// Re-measure the drawing surface. Mobile-control visibility follows
    /// the host's pointer-capability detection.
    pub fn resize(&mut self, surface: &dyn Surface2D, has_touch: bool, reporter: &mut dyn Reporter) {
        self.viewport = surface.size();
        reporter.mobile_controls_visible(has_touch);
    }

    /// Apply a new configuration at a tick boundary. Derived geometry is
    /// recomputed before the config becomes visible to the next tick, so
    /// borders and track never disagree mid-simulation.
    pub fn update_config(&mut self, config: RaceConfig) -> Result<(), RaceError> {
        config.validate()?;
        self.config = config;
        if self.track.spine.len() >= 2 {
            self.track.recompute(self.config.half_width());
        }
        Ok(())
    }

    pub fn set_input(&mut self, direction: Direction, pressed: bool) {
        self.input.set(direction, pressed);
    }

    pub fn toggle_view_mode(&mut self) -> ViewMode {
        self.view_mode = match self.view_mode {
            ViewMode::Follow => ViewMode::Map,
            ViewMode::Map => ViewMode::Follow,
        };
        self.view_mode
    }

    /// Arm (or re-arm) the frame loop, cancelling any previous token
    pub fn start_loop(&mut self) -> CancelToken {
        if let Some(old) = self.token.take() {
            old.cancel();
        }
        let token = CancelToken::new();
        self.token = Some(token.clone());
        self.last_frame = None;
        token
    }

    pub fn stop_loop(&mut self) {
        if let Some(token) = self.token.take() {
            token.cancel();
        }
    }

    /// Discard the current track and build a fresh one. Always returns the
    /// sim to `Playing` with the car on the new start line.
    pub fn generate_track(&mut self, complexity: u32) {
        self.track = Track::generate(complexity, self.config.half_width(), &mut self.rng);
        self.reset_car();
        self.phase = SimPhase::Playing;
        self.elapsed = 0.0;
        self.progress_pct = 0;
        log::info!(
            "generated track: {} spine points, complexity {complexity}",
            self.track.spine.len()
        );
    }

    fn reset_car(&mut self) {
        if self.track.spine.len() > 1 {
            let p1 = self.track.spine[0];
            let p2 = self.track.spine[1];
            self.car.pos = p1;
            self.car.angle = (p2.y - p1.y).atan2(p2.x - p1.x);
            self.car.speed = 0.0;
            self.car.off_road = false;
        }
    }

    /// One scheduled frame: check liveness, measure dt, tick, draw, report.
    /// Returns false (doing nothing) once the loop has been stopped.
    pub fn frame(
        &mut self,
        surface: &mut dyn Surface2D,
        palette: &Palette,
        reporter: &mut dyn Reporter,
    ) -> bool {
        let Some(token) = self.token.clone() else {
            return false;
        };
        if token.is_cancelled() {
            self.token = None;
            return false;
        }

        let now = Instant::now();
        let dt = match self.last_frame {
            Some(prev) => (now - prev).as_secs_f32().min(MAX_TICK_DT),
            None => 0.0,
        };
        self.last_frame = Some(now);

        let prev_phase = self.phase;
        self.tick(dt);
        draw_race(surface, self, palette);
        reporter.hud(&self.hud());

        if prev_phase == SimPhase::Playing && self.phase != SimPhase::Playing {
            reporter.race_over(&RaceOutcome {
                finished: self.phase == SimPhase::Finished,
                elapsed_secs: self.elapsed,
            });
            reporter.overlay_visible(true);
            self.overlay_shown = true;
        } else if self.overlay_shown && self.phase == SimPhase::Playing {
            reporter.overlay_visible(false);
            self.overlay_shown = false;
        }
        true
    }

    /// Advance the physics by dt seconds. No-ops in terminal states and on
    /// a degenerate track.
    pub fn tick(&mut self, dt: f32) {
        if self.phase != SimPhase::Playing || self.track.spine.len() < 2 {
            return;
        }
        let dt = dt.min(MAX_TICK_DT);
        self.elapsed += dt;

        if self.config.ai_mode {
            self.apply_brain();
        }

        // Throttle, brake or coast. Friction decays symmetrically toward
        // zero and snaps to a dead stop below the jitter threshold.
        if self.input.up {
            self.car.speed += self.car.acceleration * dt;
        } else if self.input.down {
            self.car.speed -= self.car.acceleration * dt;
        } else {
            if self.car.speed > 0.0 {
                self.car.speed -= self.car.friction * dt;
            }
            if self.car.speed < 0.0 {
                self.car.speed += self.car.friction * dt;
            }
            if self.car.speed.abs() < CAR_STOP_SPEED {
                self.car.speed = 0.0;
            }
        }

        // Steering only engages while rolling; reversing flips the turn
        if self.car.speed.abs() > CAR_STOP_SPEED {
            let dir = if self.car.speed > 0.0 { 1.0 } else { -1.0 };
            if self.input.left {
                self.car.angle -= self.car.turn_speed * dt * dir;
            }
            if self.input.right {
                self.car.angle += self.car.turn_speed * dt * dir;
            }
        }

        self.car.pos +=
            Vec2::new(self.car.angle.cos(), self.car.angle.sin()) * self.car.speed * dt;

        self.sensor.update(
            self.car.pos,
            self.car.angle,
            [&self.track.left_border, &self.track.right_border],
        );

        self.check_off_road();
        self.check_progress();

        // Speed caps: throttled off-road, reverse limited to half
        let current_max = if self.car.off_road {
            OFF_ROAD_MAX_SPEED
        } else {
            self.car.max_speed
        };
        self.car.speed = self.car.speed.clamp(-current_max / 2.0, current_max);

        self.ease_camera(dt);
    }

    /// Current output snapshot
    pub fn hud(&self) -> HudSnapshot {
        HudSnapshot {
            elapsed_secs: self.elapsed,
            speed: self.car.speed,
            progress_pct: self.progress_pct,
            phase: self.phase,
        }
    }

    /// Feed sensor closeness (1 - offset, 0 when the ray sees nothing)
    /// through the controller and overwrite the input flags with its four
    /// binary outputs.
    fn apply_brain(&mut self) {
        let inputs: Vec<f32> = self
            .sensor
            .readings
            .iter()
            .map(|r| r.as_ref().map_or(0.0, |hit| 1.0 - hit.offset))
            .collect();
        // Readings are empty until the first sensor pass; skip that tick
        if let Ok(outputs) = self.brain.feed_forward(&inputs) {
            self.input.up = outputs[0] > 0.5;
            self.input.down = outputs[1] > 0.5;
            self.input.left = outputs[2] > 0.5;
            self.input.right = outputs[3] > 0.5;
        }
    }

    /// Minimum squared distance from the car to the spine, against the safe
    /// distance derived from carriageway width minus the car's half-width.
    /// Exactly on the boundary counts as on-road.
    fn check_off_road(&mut self) {
        let mut min_dist_sq = f32::INFINITY;
        for seg in self.track.spine.windows(2) {
            let d = point_segment_distance_sq(self.car.pos, seg[0], seg[1]);
            if d < min_dist_sq {
                min_dist_sq = d;
            }
        }

        let safe_dist = self.config.half_width() - self.car.width / 2.0;
        if min_dist_sq > safe_dist * safe_dist {
            self.car.off_road = true;
            if self.config.crash_on_edge {
                self.end_race(false);
            }
        } else {
            self.car.off_road = false;
        }
    }

    /// Nearest spine index drives the progress readout; reaching the last
    /// two spine points finishes the run.
    fn check_progress(&mut self) {
        let mut min_dist_sq = f32::INFINITY;
        let mut nearest = 0;
        for (i, p) in self.track.spine.iter().enumerate() {
            let d = self.car.pos.distance_squared(*p);
            if d < min_dist_sq {
                min_dist_sq = d;
                nearest = i;
            }
        }

        let len = self.track.spine.len();
        self.progress_pct = (((nearest as f32 / len as f32) * 100.0) as u32).min(100);
        if nearest + 2 >= len {
            self.end_race(true);
        }
    }

    fn end_race(&mut self, finished: bool) {
        if self.phase != SimPhase::Playing {
            return;
        }
        self.phase = if finished {
            SimPhase::Finished
        } else {
            SimPhase::Crashed
        };
        log::info!(
            "race over: {:?} after {:.2}s at {}%",
            self.phase,
            self.elapsed,
            self.progress_pct
        );
    }

    fn ease_camera(&mut self, dt: f32) {
        let (target_pos, target_zoom) = match self.view_mode {
            ViewMode::Map => {
                let size = self.track.bounds.size();
                let zoom =
                    (self.viewport.x / size.x).min(self.viewport.y / size.y) * MAP_ZOOM_FILL;
                (self.track.bounds.center(), zoom)
            }
            ViewMode::Follow => (self.car.pos, 1.0),
        };
        self.camera.ease(target_pos, target_zoom, dt);
    }
}
