// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Closed chains of curve segments.

use crate::curve::Curve;
use crate::error::{Error, Result};
use crate::plane::{Plane, Tolerance};
use crate::tessellation::{newell_normal, TessellationParams};
use nalgebra::{Point2, Point3, Vector3};
use serde::{Deserialize, Serialize};

/// An ordered, closed sequence of curves.
///
/// Each curve ends where the next one starts and the last one ends at the
/// first start. Planar loops cache their plane, whose normal follows the
/// loop's winding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveLoop {
    curves: Vec<Curve>,
    plane: Option<Plane>,
}

impl CurveLoop {
    /// The empty loop, used for faces with no usable boundary.
    pub fn empty() -> Self {
        Self {
            curves: Vec::new(),
            plane: None,
        }
    }

    /// Builds a loop, checking closure and detecting planarity.
    pub fn new(curves: Vec<Curve>, tol: &Tolerance) -> Result<Self> {
        let n = curves.len();
        for i in 0..n {
            let end = curves[i].end_point();
            let next = curves[(i + 1) % n].start_point();
            let gap = (next - end).norm();
            if gap > tol.distance {
                return Err(Error::OpenLoop { index: i, gap });
            }
        }

        let mut result = Self {
            curves,
            plane: None,
        };
        result.plane = result.fit_plane(tol);
        Ok(result)
    }

    /// Closed polygon through `points`; the closing segment is implicit.
    pub fn from_polygon(points: &[Point3<f64>], tol: &Tolerance) -> Result<Self> {
        let n = points.len();
        let curves = (0..n)
            .map(|i| Curve::line(points[i], points[(i + 1) % n]))
            .collect();
        Self::new(curves, tol)
    }

    fn fit_plane(&self, tol: &Tolerance) -> Option<Plane> {
        let samples = self.sample_points(&TessellationParams::default());
        let normal = newell_normal(&samples);
        if normal.norm() < f64::EPSILON {
            return None;
        }

        let origin = self.curves.first()?.start_point();
        let x_hint = samples
            .iter()
            .map(|p| p - origin)
            .find(|v| v.norm() > tol.distance)?;
        let plane = Plane::from_normal_and_x(origin, normal, x_hint).ok()?;

        samples
            .iter()
            .all(|p| plane.contains_point(p, tol))
            .then_some(plane)
    }

    #[inline]
    pub fn curves(&self) -> &[Curve] {
        &self.curves
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.curves.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.curves.is_empty()
    }

    /// Cached plane, `None` for empty or non-planar loops.
    #[inline]
    pub fn plane(&self) -> Option<&Plane> {
        self.plane.as_ref()
    }

    /// Replaces the cached plane (for example to share a normal with a sibling loop).
    pub fn with_plane(mut self, plane: Plane) -> Self {
        self.plane = Some(plane);
        self
    }

    /// Start point of every curve, in order.
    pub fn vertices(&self) -> Vec<Point3<f64>> {
        self.curves.iter().map(Curve::start_point).collect()
    }

    /// Tessellated boundary without the repeated closing point.
    pub fn sample_points(&self, params: &TessellationParams) -> Vec<Point3<f64>> {
        let mut points = Vec::new();
        for curve in &self.curves {
            let mut samples = curve.tessellate(params);
            samples.pop();
            points.extend(samples);
        }
        points
    }

    /// Unnormalized Newell normal of the sampled boundary.
    pub fn newell_normal(&self) -> Vector3<f64> {
        newell_normal(&self.sample_points(&TessellationParams::default()))
    }

    /// Enclosed area of a planar loop.
    pub fn area(&self) -> f64 {
        self.newell_normal().norm() * 0.5
    }

    pub fn is_counterclockwise(&self, normal: &Vector3<f64>) -> bool {
        self.newell_normal().dot(normal) > 0.0
    }

    /// Reverses traversal; the cached plane flips with it.
    pub fn flip(&mut self) {
        self.curves.reverse();
        for curve in &mut self.curves {
            *curve = curve.reversed();
        }
        self.plane = self.plane.map(|p| p.flipped());
    }

    /// Flips the loop if needed so it winds counterclockwise about `normal`.
    ///
    /// Returns `true` when the loop was flipped.
    pub fn orient_counterclockwise(&mut self, normal: &Vector3<f64>) -> bool {
        if self.is_empty() || self.is_counterclockwise(normal) {
            return false;
        }
        self.flip();
        true
    }

    pub fn translated(&self, offset: &Vector3<f64>) -> Self {
        Self {
            curves: self.curves.iter().map(|c| c.translated(offset)).collect(),
            plane: self.plane.map(|p| p.translated(offset)),
        }
    }

    /// Scalar extent of the loop along `direction`.
    pub fn range_along(&self, direction: &Vector3<f64>) -> Option<(f64, f64)> {
        self.curves
            .iter()
            .map(|c| c.range_along(direction))
            .reduce(|(lo, hi), (a, b)| (lo.min(a), hi.max(b)))
    }

    /// Sampled boundary in the 2D frame of `plane`.
    pub fn project_to_plane(&self, plane: &Plane, params: &TessellationParams) -> Vec<Point2<f64>> {
        self.sample_points(params)
            .iter()
            .map(|p| plane.to_local(p))
            .collect()
    }

    #[inline]
    pub fn is_polygonal(&self) -> bool {
        self.curves.iter().all(Curve::is_line)
    }
}

/// Even-odd point-in-polygon test in 2D.
pub fn point_in_polygon(point: &Point2<f64>, polygon: &[Point2<f64>]) -> bool {
    let n = polygon.len();
    if n < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (pi, pj) = (&polygon[i], &polygon[j]);
        if (pi.y > point.y) != (pj.y > point.y) {
            let x = pj.x + (point.y - pj.y) * (pi.x - pj.x) / (pi.y - pj.y);
            if point.x < x {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::CircularArc;
    use approx::assert_relative_eq;

    fn square(z: f64) -> Vec<Point3<f64>> {
        vec![
            Point3::new(0.0, 0.0, z),
            Point3::new(2.0, 0.0, z),
            Point3::new(2.0, 2.0, z),
            Point3::new(0.0, 2.0, z),
        ]
    }

    #[test]
    fn polygon_loop_is_planar_and_counterclockwise() {
        let tol = Tolerance::default();
        let lp = CurveLoop::from_polygon(&square(3.0), &tol).unwrap();

        let plane = lp.plane().unwrap();
        assert_relative_eq!(plane.normal(), Vector3::z(), epsilon = 1e-12);
        assert!(lp.is_counterclockwise(&Vector3::z()));
        assert_relative_eq!(lp.area(), 4.0, epsilon = 1e-12);
        assert!(lp.is_polygonal());
    }

    #[test]
    fn open_chain_is_rejected() {
        let tol = Tolerance::default();
        let pts = square(0.0);
        let curves = vec![Curve::line(pts[0], pts[1]), Curve::line(pts[1], pts[2])];
        let result = CurveLoop::new(curves, &tol);
        assert!(matches!(result, Err(Error::OpenLoop { index: 1, .. })));
    }

    #[test]
    fn orientation_flip_reverses_normal() {
        let tol = Tolerance::default();
        let mut lp = CurveLoop::from_polygon(&square(0.0), &tol).unwrap();

        assert!(lp.orient_counterclockwise(&-Vector3::z()));
        assert!(lp.is_counterclockwise(&-Vector3::z()));
        assert_relative_eq!(lp.plane().unwrap().normal(), -Vector3::z(), epsilon = 1e-12);
        assert!(!lp.orient_counterclockwise(&-Vector3::z()));

        let first = lp.curves()[0].start_point();
        let last = lp.curves()[lp.len() - 1].end_point();
        assert_relative_eq!(first, last, epsilon = 1e-12);
    }

    #[test]
    fn range_and_translation() {
        let tol = Tolerance::default();
        let lp = CurveLoop::from_polygon(&square(1.0), &tol)
            .unwrap()
            .translated(&Vector3::new(0.0, 0.0, 2.0));
        let (lo, hi) = lp.range_along(&Vector3::z()).unwrap();
        assert_relative_eq!(lo, 3.0);
        assert_relative_eq!(hi, 3.0);
        assert_relative_eq!(lp.plane().unwrap().origin().z, 3.0);
        assert!(CurveLoop::empty().range_along(&Vector3::z()).is_none());
    }

    #[test]
    fn loop_with_arc_keeps_plane() {
        let tol = Tolerance::default();
        let arc = CircularArc::new(
            Point3::new(1.0, 0.0, 0.0),
            Vector3::x(),
            Vector3::z(),
            1.0,
            0.0,
            std::f64::consts::PI,
        )
        .unwrap();
        let lp = CurveLoop::new(
            vec![
                Curve::Arc(arc),
                Curve::line(Point3::new(0.0, 0.0, 0.0), Point3::new(2.0, 0.0, 0.0)),
            ],
            &tol,
        )
        .unwrap();

        assert!(!lp.is_polygonal());
        assert_relative_eq!(lp.plane().unwrap().normal(), Vector3::z(), epsilon = 1e-12);
        assert!(lp.area() > 1.5 && lp.area() < std::f64::consts::FRAC_PI_2);
    }

    #[test]
    fn point_in_square() {
        let poly = [
            Point2::new(0.0, 0.0),
            Point2::new(2.0, 0.0),
            Point2::new(2.0, 2.0),
            Point2::new(0.0, 2.0),
        ];
        assert!(point_in_polygon(&Point2::new(1.0, 1.0), &poly));
        assert!(!point_in_polygon(&Point2::new(3.0, 1.0), &poly));
    }
}
