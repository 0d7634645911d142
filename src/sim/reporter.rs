//! Output reporting capability
//!
//! The simulation never touches UI sinks directly: the host injects a
//! `Reporter` and receives per-tick HUD snapshots plus the occasional
//! lifecycle event. Every method has a no-op default so a host only
//! implements the sinks it actually has.

use super::state::{HudSnapshot, format_clock};

/// End-of-run summary, with the display strings the demo UIs use
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaceOutcome {
    pub finished: bool,
    pub elapsed_secs: f32,
}

impl RaceOutcome {
    pub fn title(&self) -> &'static str {
        if self.finished { "FINISHED!" } else { "CRASHED!" }
    }

    pub fn subtitle(&self) -> String {
        if self.finished {
            format!("Time: {}", format_clock(self.elapsed_secs))
        } else {
            "You went off track!".to_owned()
        }
    }
}

pub trait Reporter {
    /// Called once per frame with the current output snapshot
    fn hud(&mut self, _snapshot: &HudSnapshot) {}

    /// Called once when the run reaches a terminal state
    fn race_over(&mut self, _outcome: &RaceOutcome) {}

    /// End-of-run overlay shown on race end, hidden on regeneration
    fn overlay_visible(&mut self, _visible: bool) {}

    /// Touch-capable hosts show on-screen controls
    fn mobile_controls_visible(&mut self, _visible: bool) {}
}

/// Default reporter: swallows everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullReporter;

impl Reporter for NullReporter {}
