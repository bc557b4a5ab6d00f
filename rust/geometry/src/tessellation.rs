// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Point and curve sampling helpers.

use crate::plane::Tolerance;
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Controls how finely non-linear curves are approximated by line segments.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TessellationParams {
    /// Largest angle (radians) a single segment may subtend on an arc.
    pub max_angle: f64,
    /// Segment count floor for any non-linear curve.
    pub min_segments: usize,
    /// Segment count ceiling for any non-linear curve.
    pub max_segments: usize,
}

impl Default for TessellationParams {
    fn default() -> Self {
        Self {
            max_angle: std::f64::consts::PI / 12.0,
            min_segments: 2,
            max_segments: 128,
        }
    }
}

impl TessellationParams {
    /// Segment count for an angular sweep.
    #[inline]
    pub fn segments_for_sweep(&self, sweep: f64) -> usize {
        let raw = (sweep.abs() / self.max_angle.max(1e-3)).ceil() as usize;
        raw.clamp(self.min_segments.max(1), self.max_segments.max(1))
    }

    /// Segment count for a spline with `control_points` control points.
    #[inline]
    pub fn segments_for_spline(&self, control_points: usize, degree: usize) -> usize {
        let raw = control_points.saturating_sub(1).max(1) * (degree.max(1) * 4);
        raw.clamp(self.min_segments.max(1), self.max_segments.max(1))
    }
}

/// Samples `f` at `segments + 1` evenly spaced parameters in `[t0, t1]`.
pub fn sample_parametric<F>(f: F, t0: f64, t1: f64, segments: usize) -> Vec<Point3<f64>>
where
    F: Fn(f64) -> Point3<f64>,
{
    let segments = segments.max(1);
    (0..=segments)
        .map(|i| {
            let s = i as f64 / segments as f64;
            f(t0 + (t1 - t0) * s)
        })
        .collect()
}

/// Total length of an open polyline.
pub fn polyline_length(points: &[Point3<f64>]) -> f64 {
    points.windows(2).map(|w| (w[1] - w[0]).norm()).sum()
}

/// Unnormalized polygon normal via Newell's method.
///
/// The magnitude is twice the enclosed area; the direction follows the
/// right-hand rule on the winding. `points` must not repeat the first point.
pub fn newell_normal(points: &[Point3<f64>]) -> Vector3<f64> {
    let mut normal = Vector3::<f64>::zeros();
    let n = points.len();
    if n < 3 {
        return normal;
    }

    for i in 0..n {
        let current = &points[i];
        let next = &points[(i + 1) % n];

        normal.x += (current.y - next.y) * (current.z + next.z);
        normal.y += (current.z - next.z) * (current.x + next.x);
        normal.z += (current.x - next.x) * (current.y + next.y);
    }

    normal
}

/// Drops consecutive points closer than the distance tolerance.
pub fn dedup_consecutive(points: &mut Vec<Point3<f64>>, tol: &Tolerance) {
    points.dedup_by(|b, a| tol.points_coincide(a, b));
}
