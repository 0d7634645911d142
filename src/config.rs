//! Simulation configuration
//!
//! Validated at the boundary so the generators never see degenerate values.
//! The host may apply a new config at any tick boundary; `RaceSim` recomputes
//! all derived geometry before the next read.

use serde::{Deserialize, Serialize};

use crate::error::RaceError;

/// Host-facing configuration for the racing sim
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RaceConfig {
    /// Number of lanes across the carriageway (minimum 2)
    pub lane_count: u32,
    /// Width of a single lane in pixels
    pub lane_width: f32,
    /// Random-walk steps in the generated track spine
    pub track_complexity: u32,
    /// Leaving the carriageway ends the run instead of just slowing the car
    pub crash_on_edge: bool,
    /// Overlay the sensor rays when drawing
    pub show_sensors: bool,
    /// Drive with the neural controller instead of host input
    pub ai_mode: bool,
}

impl Default for RaceConfig {
    fn default() -> Self {
        Self {
            lane_count: 3,
            lane_width: 60.0,
            track_complexity: 20,
            crash_on_edge: false,
            show_sensors: true,
            ai_mode: false,
        }
    }
}

impl RaceConfig {
    pub fn validate(&self) -> Result<(), RaceError> {
        if self.lane_count < 2 {
            return Err(RaceError::LaneCount(self.lane_count));
        }
        if !(self.lane_width > 0.0) {
            return Err(RaceError::LaneWidth(self.lane_width));
        }
        Ok(())
    }

    /// Total drivable width: lane count x lane width
    pub fn carriageway_width(&self) -> f32 {
        self.lane_count as f32 * self.lane_width
    }

    /// Half the carriageway width, the border offset from the spine
    pub fn half_width(&self) -> f32 {
        self.carriageway_width() / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(RaceConfig::default().validate().is_ok());
    }

    #[test]
    fn test_single_lane_rejected() {
        let cfg = RaceConfig {
            lane_count: 1,
            ..Default::default()
        };
        assert_eq!(cfg.validate(), Err(RaceError::LaneCount(1)));
    }

    #[test]
    fn test_non_positive_lane_width_rejected() {
        let cfg = RaceConfig {
            lane_width: 0.0,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
        let cfg = RaceConfig {
            lane_width: f32::NAN,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_carriageway_width() {
        let cfg = RaceConfig::default();
        assert_eq!(cfg.carriageway_width(), 180.0);
        assert_eq!(cfg.half_width(), 90.0);
    }
}
