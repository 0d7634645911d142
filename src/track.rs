//! Procedural track generation
//!
//! The spine is a random-walk polyline: a fixed straight launch section,
//! `complexity` curvature-perturbed steps, and a fixed straight finish run,
//! smoothed by repeated 3-point moving-average passes. Borders are the spine
//! offset along per-segment normals; vertices are mitred naively, which can
//! self-intersect at very high curvature. That limitation is deliberate - the
//! sensor and off-road checks are tuned for it.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Axis-aligned bounding box around the spine plus a margin
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TrackBounds {
    pub min: Vec2,
    pub max: Vec2,
}

impl TrackBounds {
    pub fn from_spine(spine: &[Vec2], margin: f32) -> Self {
        let mut min = Vec2::splat(f32::INFINITY);
        let mut max = Vec2::splat(f32::NEG_INFINITY);
        for p in spine {
            min = min.min(*p);
            max = max.max(*p);
        }
        if spine.is_empty() {
            return Self::default();
        }
        Self {
            min: min - Vec2::splat(margin),
            max: max + Vec2::splat(margin),
        }
    }

    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) / 2.0
    }
}

/// A generated track: centerline spine plus derived border polylines and
/// bounds. Immutable between generation passes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Track {
    pub spine: Vec<Vec2>,
    pub left_border: Vec<Vec2>,
    pub right_border: Vec<Vec2>,
    pub bounds: TrackBounds,
}

impl Track {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Generate a new track. `complexity` of 0 still yields the fixed
    /// straight sections, so the spine always has at least two points.
    pub fn generate(complexity: u32, half_width: f32, rng: &mut Pcg32) -> Self {
        let mut spine = Vec::with_capacity(
            TRACK_START_STRAIGHT + complexity as usize + TRACK_END_STRAIGHT,
        );
        let mut pos = Vec2::ZERO;
        let mut angle = -std::f32::consts::FRAC_PI_2;

        // Launch straight, heading up
        for _ in 0..TRACK_START_STRAIGHT {
            spine.push(pos);
            pos.y -= TRACK_SEGMENT_LENGTH;
        }

        // Random walk: perturb heading, clamp into a bounded arc so the
        // track never doubles back on itself
        for _ in 0..complexity {
            let curvature = (rng.random::<f32>() - 0.5) * TRACK_CURVATURE;
            angle += curvature;
            if angle > 0.0 {
                angle = -0.1;
            }
            if angle < -std::f32::consts::PI {
                angle = -std::f32::consts::PI + 0.1;
            }
            pos += Vec2::new(angle.cos(), angle.sin()) * TRACK_SEGMENT_LENGTH;
            spine.push(pos);
        }

        // Finish straight along the final heading
        for _ in 0..TRACK_END_STRAIGHT {
            pos += Vec2::new(angle.cos(), angle.sin()) * TRACK_SEGMENT_LENGTH;
            spine.push(pos);
        }

        let spine = smooth_polyline(&spine, TRACK_SMOOTH_PASSES);
        Self::from_spine(spine, half_width)
    }

    /// Build a track around an existing spine (e.g. one loaded by the host)
    pub fn from_spine(spine: Vec<Vec2>, half_width: f32) -> Self {
        let mut track = Self {
            spine,
            ..Self::default()
        };
        track.recompute(half_width);
        track
    }

    /// Recompute borders and bounds for the current spine. Called after
    /// generation and after any lane-configuration change, atomically from
    /// the loop's point of view.
    pub fn recompute(&mut self, half_width: f32) {
        self.left_border = offset_polyline(&self.spine, half_width);
        self.right_border = offset_polyline(&self.spine, -half_width);
        self.bounds = TrackBounds::from_spine(&self.spine, half_width + TRACK_BOUNDS_MARGIN);
    }
}

/// Repeated 3-point moving-average smoothing with fixed endpoints.
///
/// Each pass replaces every interior point with the average of itself and
/// its two neighbours. Point count is preserved.
pub fn smooth_polyline(points: &[Vec2], passes: usize) -> Vec<Vec2> {
    let mut smoothed = points.to_vec();
    for _ in 0..passes {
        if smoothed.len() < 3 {
            break;
        }
        let mut next = Vec::with_capacity(smoothed.len());
        next.push(smoothed[0]);
        for i in 1..smoothed.len() - 1 {
            next.push((smoothed[i - 1] + smoothed[i] + smoothed[i + 1]) / 3.0);
        }
        next.push(smoothed[smoothed.len() - 1]);
        smoothed = next;
    }
    smoothed
}

/// Offset every spine segment along its local normal.
///
/// Produces one point per spine point (the final segment contributes two).
/// A zero-length segment reuses the previous segment's normal rather than
/// producing NaN.
pub fn offset_polyline(spine: &[Vec2], offset: f32) -> Vec<Vec2> {
    if spine.len() < 2 {
        return Vec::new();
    }
    let mut out = Vec::with_capacity(spine.len());
    let mut normal = Vec2::ZERO;
    for i in 0..spine.len() - 1 {
        let p1 = spine[i];
        let p2 = spine[i + 1];
        let delta = p2 - p1;
        let len = delta.length();
        if len > f32::EPSILON {
            normal = Vec2::new(-delta.y, delta.x) / len;
        }
        out.push(p1 + normal * offset);
        if i == spine.len() - 2 {
            out.push(p2 + normal * offset);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;

    #[test]
    fn test_generation_is_deterministic_for_a_seed() {
        let mut a = Pcg32::seed_from_u64(42);
        let mut b = Pcg32::seed_from_u64(42);
        let t1 = Track::generate(25, 90.0, &mut a);
        let t2 = Track::generate(25, 90.0, &mut b);
        assert_eq!(t1.spine, t2.spine);
        assert_eq!(t1.left_border, t2.left_border);
    }

    #[test]
    fn test_border_lengths_match_spine() {
        let mut rng = Pcg32::seed_from_u64(7);
        let track = Track::generate(30, 90.0, &mut rng);
        assert_eq!(track.left_border.len(), track.spine.len());
        assert_eq!(track.right_border.len(), track.spine.len());
    }

    #[test]
    fn test_zero_complexity_yields_fixed_straights() {
        let mut rng = Pcg32::seed_from_u64(1);
        let track = Track::generate(0, 90.0, &mut rng);
        assert_eq!(
            track.spine.len(),
            TRACK_START_STRAIGHT + TRACK_END_STRAIGHT
        );
        // Straight line: every point sits on x ~ 0, descending y
        for w in track.spine.windows(2) {
            assert!(w[0].x.abs() < 1e-3);
            assert!(w[1].y < w[0].y);
        }
    }

    #[test]
    fn test_smoothing_preserves_count_and_endpoints() {
        let mut rng = Pcg32::seed_from_u64(3);
        let points: Vec<Vec2> = (0..20)
            .map(|i| Vec2::new(i as f32 * 40.0, rng.random::<f32>() * 200.0))
            .collect();
        let smoothed = smooth_polyline(&points, 4);
        assert_eq!(smoothed.len(), points.len());
        assert_eq!(smoothed[0], points[0]);
        assert_eq!(smoothed[19], points[19]);
    }

    #[test]
    fn test_borders_sit_half_width_from_straight_spine() {
        let spine: Vec<Vec2> = (0..5).map(|i| Vec2::new(0.0, -40.0 * i as f32)).collect();
        let track = Track::from_spine(spine, 90.0);
        // Spine heads -y, so the left border lands at x = +90
        for p in &track.left_border {
            assert!((p.x - 90.0).abs() < 1e-4);
        }
        for p in &track.right_border {
            assert!((p.x + 90.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_bounds_include_margin() {
        let spine = vec![Vec2::ZERO, Vec2::new(0.0, -400.0)];
        let track = Track::from_spine(spine, 90.0);
        let margin = 90.0 + TRACK_BOUNDS_MARGIN;
        assert_eq!(track.bounds.min, Vec2::new(-margin, -400.0 - margin));
        assert_eq!(track.bounds.max, Vec2::new(margin, margin));
    }

    #[test]
    fn test_empty_and_single_point_spines_have_no_borders() {
        assert!(offset_polyline(&[], 90.0).is_empty());
        assert!(offset_polyline(&[Vec2::ZERO], 90.0).is_empty());
    }

    #[test]
    fn test_duplicate_points_do_not_produce_nan() {
        let spine = vec![
            Vec2::ZERO,
            Vec2::new(0.0, -40.0),
            Vec2::new(0.0, -40.0),
            Vec2::new(0.0, -80.0),
        ];
        let border = offset_polyline(&spine, 90.0);
        assert!(border.iter().all(|p| p.x.is_finite() && p.y.is_finite()));
    }

    /// Energy of the second differences of a polyline, per coordinate
    fn roughness(points: &[Vec2]) -> f64 {
        points
            .windows(3)
            .map(|w| {
                let d = w[0] - 2.0 * w[1] + w[2];
                (d.x as f64).powi(2) + (d.y as f64).powi(2)
            })
            .sum()
    }

    proptest! {
        #[test]
        fn prop_smoothing_never_increases_roughness(
            ys in proptest::collection::vec(-500.0f32..500.0, 3..40)
        ) {
            let mut points: Vec<Vec2> = ys
                .iter()
                .enumerate()
                .map(|(i, &y)| Vec2::new(i as f32 * 40.0, y))
                .collect();
            let mut prev = roughness(&points);
            for _ in 0..6 {
                points = smooth_polyline(&points, 1);
                let next = roughness(&points);
                prop_assert!(next <= prev + 1e-2);
                prev = next;
            }
        }
    }
}
