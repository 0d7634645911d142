//! Geometry kernel: segment intersection, point-to-segment distance, lerp
//!
//! Pure math, no state. Degenerate inputs (parallel lines, zero-length
//! segments) produce `None` or fall back to point distance - never a fault.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Intersection of a parametric segment with another segment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hit {
    pub point: Vec2,
    /// Parametric position along the first segment, in [0, 1]
    pub offset: f32,
}

/// Standard linear interpolation
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Intersect segment AB with segment CD.
///
/// Solves the 2x2 system for the two parametric lines. Returns `None` when
/// the lines are parallel (zero determinant) or either parameter falls
/// outside [0, 1]. The returned offset is the parameter along AB, used for
/// nearest-hit ranking by the sensor.
pub fn segment_intersection(a: Vec2, b: Vec2, c: Vec2, d: Vec2) -> Option<Hit> {
    let t_top = (d.x - c.x) * (a.y - c.y) - (d.y - c.y) * (a.x - c.x);
    let u_top = (c.y - a.y) * (a.x - b.x) - (c.x - a.x) * (a.y - b.y);
    let bottom = (d.y - c.y) * (b.x - a.x) - (d.x - c.x) * (b.y - a.y);

    if bottom == 0.0 {
        return None;
    }
    let t = t_top / bottom;
    let u = u_top / bottom;
    if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
        Some(Hit {
            point: Vec2::new(lerp(a.x, b.x, t), lerp(a.y, b.y, t)),
            offset: t,
        })
    } else {
        None
    }
}

/// Squared distance from point P to segment AB.
///
/// Projects P onto AB and clamps the parameter to [0, 1]. Squared on purpose:
/// the off-road check runs this over every spine segment each tick.
pub fn point_segment_distance_sq(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let len_sq = a.distance_squared(b);
    if len_sq == 0.0 {
        return p.distance_squared(a);
    }
    let t = ((p - a).dot(b - a) / len_sq).clamp(0.0, 1.0);
    p.distance_squared(a + (b - a) * t)
}
