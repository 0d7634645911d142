//! Ray-fan perception
//!
//! Casts a symmetric fan of rays from the car's position and records the
//! nearest border intersection per ray. Readings are recomputed every tick
//! and never persist. Cost is O(ray count x border segments), which is fine
//! for single-digit ray counts against a few hundred segments but would need
//! a spatial index for anything bigger.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::geom::{lerp, segment_intersection, Hit};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sensor {
    pub ray_count: usize,
    pub ray_length: f32,
    /// Total angular fan, centered on the car heading
    pub ray_spread: f32,
    /// World-space ray endpoints from the last update
    pub rays: Vec<(Vec2, Vec2)>,
    /// Nearest hit per ray, `None` when the ray sees open road
    pub readings: Vec<Option<Hit>>,
}

impl Default for Sensor {
    fn default() -> Self {
        Self {
            ray_count: SENSOR_RAY_COUNT,
            ray_length: SENSOR_RAY_LENGTH,
            ray_spread: SENSOR_RAY_SPREAD,
            rays: Vec::new(),
            readings: Vec::new(),
        }
    }
}

impl Sensor {
    pub fn update(&mut self, origin: Vec2, heading: f32, borders: [&[Vec2]; 2]) {
        self.cast_rays(origin, heading);
        self.readings = self
            .rays
            .iter()
            .map(|&(start, end)| nearest_hit(start, end, borders))
            .collect();
    }

    fn cast_rays(&mut self, origin: Vec2, heading: f32) {
        self.rays.clear();
        for i in 0..self.ray_count {
            let t = if self.ray_count == 1 {
                0.5
            } else {
                i as f32 / (self.ray_count - 1) as f32
            };
            let ray_angle = lerp(self.ray_spread / 2.0, -self.ray_spread / 2.0, t) + heading;
            let end = origin + Vec2::new(ray_angle.cos(), ray_angle.sin()) * self.ray_length;
            self.rays.push((origin, end));
        }
    }
}

/// Closest intersection of one ray against both border polylines, ranked by
/// the parametric offset along the ray.
fn nearest_hit(start: Vec2, end: Vec2, borders: [&[Vec2]; 2]) -> Option<Hit> {
    borders
        .iter()
        .flat_map(|border| border.windows(2))
        .filter_map(|seg| segment_intersection(start, end, seg[0], seg[1]))
        .min_by(|a, b| {
            a.offset
                .partial_cmp(&b.offset)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
}
