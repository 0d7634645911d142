//! Headless demo entry point
//!
//! Runs the driving sim with the neural controller for a fixed wall of
//! simulated time, logging HUD snapshots, then generates one maze of each
//! variant and dumps the backtracking maze as JSON on stdout.

use glam::Vec2;

use raceline::config::RaceConfig;
use raceline::error::RaceError;
use raceline::maze::{BacktrackerMaze, MazeGenerator, ScatterMaze};
use raceline::render::{NullSurface, Palette};
use raceline::sim::{HudSnapshot, NullReporter, RaceOutcome, RaceSim, Reporter, SimPhase};

/// Reporter that logs snapshots once per simulated second
struct LogReporter {
    last_logged: f32,
}

impl Reporter for LogReporter {
    fn hud(&mut self, snapshot: &HudSnapshot) {
        if snapshot.elapsed_secs - self.last_logged >= 1.0 {
            self.last_logged = snapshot.elapsed_secs;
            log::info!(
                "{} {} progress {}%",
                snapshot.clock_text(),
                snapshot.speed_text(),
                snapshot.progress_pct
            );
        }
    }

    fn race_over(&mut self, outcome: &RaceOutcome) {
        log::info!("{} {}", outcome.title(), outcome.subtitle());
    }
}

fn run_race(seed: u64) -> Result<(), RaceError> {
    let config = RaceConfig {
        ai_mode: true,
        ..Default::default()
    };
    let mut sim = RaceSim::new(config, Vec2::new(1280.0, 720.0), seed)?;
    sim.generate_track(sim.config.track_complexity);

    let mut surface = NullSurface::new(1280.0, 720.0);
    let palette = Palette::default();
    let mut reporter = LogReporter { last_logged: 0.0 };

    // 60 simulated seconds at a fixed 60 Hz step
    sim.start_loop();
    for _ in 0..60 * 60 {
        sim.tick(1.0 / 60.0);
        reporter.hud(&sim.hud());
        if sim.phase != SimPhase::Playing {
            reporter.race_over(&RaceOutcome {
                finished: sim.phase == SimPhase::Finished,
                elapsed_secs: sim.elapsed,
            });
            break;
        }
    }
    sim.stop_loop();

    let hud = sim.hud();
    log::info!(
        "race ended: {:?} after {} at {}%",
        hud.phase,
        hud.clock_text(),
        hud.progress_pct
    );
    // Exercise the full frame path once with null sinks
    sim.start_loop();
    sim.frame(&mut surface, &palette, &mut NullReporter);
    Ok(())
}

fn run_mazes(seed: u64) -> Result<(), Box<dyn std::error::Error>> {
    let mut backtracker = BacktrackerMaze::new(16, 12, seed)?;
    backtracker.start();
    while backtracker.step() {}
    log::info!("backtracker complete: {}", backtracker.is_complete());

    let mut scatter = ScatterMaze::new(24, 18, seed)?;
    scatter.start();
    while scatter.step() {}
    let carved = scatter.cells().iter().filter(|c| !c.wall).count();
    log::info!("scatter complete, {carved} carved cells");

    println!("{}", serde_json::to_string(backtracker.cells())?);
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(42u64);
    log::info!("seed {seed}");

    run_race(seed)?;
    run_mazes(seed)?;
    Ok(())
}
