// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Bounded curve segments: lines, circular arcs, elliptical arcs and NURBS.

use crate::error::{Error, Result};
use crate::nurbs::NurbsCurve;
use crate::tessellation::{polyline_length, sample_parametric, TessellationParams};
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

/// Discriminant of a [`Curve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CurveKind {
    Line,
    Arc,
    Ellipse,
    Spline,
}

impl CurveKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CurveKind::Line => "line",
            CurveKind::Arc => "arc",
            CurveKind::Ellipse => "ellipse",
            CurveKind::Spline => "spline",
        }
    }
}

impl std::fmt::Display for CurveKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A straight segment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineSegment {
    pub start: Point3<f64>,
    pub end: Point3<f64>,
}

/// A circular arc `center + r (cos θ · x + sin θ · y)` for θ in `[start_angle, end_angle]`.
///
/// `x_axis` and `y_axis` are orthonormal; the arc runs counterclockwise about
/// `x_axis × y_axis`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CircularArc {
    pub center: Point3<f64>,
    pub x_axis: Vector3<f64>,
    pub y_axis: Vector3<f64>,
    pub radius: f64,
    pub start_angle: f64,
    pub end_angle: f64,
}

/// An elliptical arc `center + a cos θ · x + b sin θ · y`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EllipticalArc {
    pub center: Point3<f64>,
    pub x_axis: Vector3<f64>,
    pub y_axis: Vector3<f64>,
    pub x_radius: f64,
    pub y_radius: f64,
    pub start_angle: f64,
    pub end_angle: f64,
}

/// A bounded curve segment as a tagged variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Curve {
    Line(LineSegment),
    Arc(CircularArc),
    Ellipse(EllipticalArc),
    Spline(NurbsCurve),
}

fn unit_frame(x_axis: Vector3<f64>, normal: Vector3<f64>) -> Result<(Vector3<f64>, Vector3<f64>)> {
    let normal = normal
        .try_normalize(1e-12)
        .ok_or_else(|| Error::InvalidCurve("zero-length arc normal".to_string()))?;
    let x = (x_axis - normal * x_axis.dot(&normal))
        .try_normalize(1e-12)
        .ok_or_else(|| Error::InvalidCurve("arc x axis parallel to normal".to_string()))?;
    Ok((x, normal.cross(&x)))
}

fn check_sweep(start_angle: f64, end_angle: f64) -> Result<()> {
    if !(end_angle > start_angle) || end_angle - start_angle > TAU + 1e-12 {
        return Err(Error::InvalidCurve(format!(
            "arc sweep [{start_angle}, {end_angle}] must be increasing and at most one turn"
        )));
    }
    Ok(())
}

/// Extremes of `base + a cos θ + b sin θ` over `[t0, t1]`.
fn trig_range(base: f64, a: f64, b: f64, t0: f64, t1: f64) -> (f64, f64) {
    let f = |t: f64| base + a * t.cos() + b * t.sin();
    let mut lo = f(t0).min(f(t1));
    let mut hi = f(t0).max(f(t1));

    let critical = b.atan2(a);
    for k in [critical, critical + std::f64::consts::PI] {
        let shift = ((t0 - k) / TAU).ceil();
        let mut t = k + shift * TAU;
        while t <= t1 {
            let v = f(t);
            lo = lo.min(v);
            hi = hi.max(v);
            t += TAU;
        }
    }
    (lo, hi)
}

impl CircularArc {
    /// Arc about `normal`, measuring angles from `x_axis`.
    pub fn new(
        center: Point3<f64>,
        x_axis: Vector3<f64>,
        normal: Vector3<f64>,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
    ) -> Result<Self> {
        if !(radius > 0.0) {
            return Err(Error::InvalidCurve(format!("non-positive radius {radius}")));
        }
        check_sweep(start_angle, end_angle)?;
        let (x_axis, y_axis) = unit_frame(x_axis, normal)?;
        Ok(Self {
            center,
            x_axis,
            y_axis,
            radius,
            start_angle,
            end_angle,
        })
    }

    #[inline]
    pub fn normal(&self) -> Vector3<f64> {
        self.x_axis.cross(&self.y_axis)
    }

    #[inline]
    pub fn point_at_angle(&self, theta: f64) -> Point3<f64> {
        self.center + (self.x_axis * theta.cos() + self.y_axis * theta.sin()) * self.radius
    }

    pub fn sweep(&self) -> f64 {
        self.end_angle - self.start_angle
    }

    fn reversed(&self) -> Self {
        Self {
            y_axis: -self.y_axis,
            start_angle: -self.end_angle,
            end_angle: -self.start_angle,
            ..*self
        }
    }
}

impl EllipticalArc {
    pub fn new(
        center: Point3<f64>,
        x_axis: Vector3<f64>,
        normal: Vector3<f64>,
        x_radius: f64,
        y_radius: f64,
        start_angle: f64,
        end_angle: f64,
    ) -> Result<Self> {
        if !(x_radius > 0.0 && y_radius > 0.0) {
            return Err(Error::InvalidCurve(format!(
                "non-positive radii ({x_radius}, {y_radius})"
            )));
        }
        check_sweep(start_angle, end_angle)?;
        let (x_axis, y_axis) = unit_frame(x_axis, normal)?;
        Ok(Self {
            center,
            x_axis,
            y_axis,
            x_radius,
            y_radius,
            start_angle,
            end_angle,
        })
    }

    #[inline]
    pub fn normal(&self) -> Vector3<f64> {
        self.x_axis.cross(&self.y_axis)
    }

    #[inline]
    pub fn point_at_angle(&self, theta: f64) -> Point3<f64> {
        self.center
            + self.x_axis * (self.x_radius * theta.cos())
            + self.y_axis * (self.y_radius * theta.sin())
    }

    pub fn sweep(&self) -> f64 {
        self.end_angle - self.start_angle
    }

    fn reversed(&self) -> Self {
        Self {
            y_axis: -self.y_axis,
            start_angle: -self.end_angle,
            end_angle: -self.start_angle,
            ..*self
        }
    }
}

impl Curve {
    /// Straight segment between two points.
    pub fn line(start: Point3<f64>, end: Point3<f64>) -> Self {
        Curve::Line(LineSegment { start, end })
    }

    pub fn kind(&self) -> CurveKind {
        match self {
            Curve::Line(_) => CurveKind::Line,
            Curve::Arc(_) => CurveKind::Arc,
            Curve::Ellipse(_) => CurveKind::Ellipse,
            Curve::Spline(_) => CurveKind::Spline,
        }
    }

    #[inline]
    pub fn is_line(&self) -> bool {
        matches!(self, Curve::Line(_))
    }

    pub fn start_point(&self) -> Point3<f64> {
        match self {
            Curve::Line(l) => l.start,
            Curve::Arc(a) => a.point_at_angle(a.start_angle),
            Curve::Ellipse(e) => e.point_at_angle(e.start_angle),
            Curve::Spline(s) => s.eval(s.domain().0),
        }
    }

    pub fn end_point(&self) -> Point3<f64> {
        match self {
            Curve::Line(l) => l.end,
            Curve::Arc(a) => a.point_at_angle(a.end_angle),
            Curve::Ellipse(e) => e.point_at_angle(e.end_angle),
            Curve::Spline(s) => s.eval(s.domain().1),
        }
    }

    /// Point at normalized parameter `s` in `[0, 1]`.
    pub fn point_at(&self, s: f64) -> Point3<f64> {
        let s = s.clamp(0.0, 1.0);
        match self {
            Curve::Line(l) => l.start + (l.end - l.start) * s,
            Curve::Arc(a) => a.point_at_angle(a.start_angle + a.sweep() * s),
            Curve::Ellipse(e) => e.point_at_angle(e.start_angle + e.sweep() * s),
            Curve::Spline(n) => {
                let (t0, t1) = n.domain();
                n.eval(t0 + (t1 - t0) * s)
            }
        }
    }

    /// Same geometry traversed from end to start.
    pub fn reversed(&self) -> Self {
        match self {
            Curve::Line(l) => Curve::line(l.end, l.start),
            Curve::Arc(a) => Curve::Arc(a.reversed()),
            Curve::Ellipse(e) => Curve::Ellipse(e.reversed()),
            Curve::Spline(n) => Curve::Spline(n.reversed()),
        }
    }

    pub fn translated(&self, offset: &Vector3<f64>) -> Self {
        match self {
            Curve::Line(l) => Curve::line(l.start + offset, l.end + offset),
            Curve::Arc(a) => Curve::Arc(CircularArc {
                center: a.center + offset,
                ..*a
            }),
            Curve::Ellipse(e) => Curve::Ellipse(EllipticalArc {
                center: e.center + offset,
                ..*e
            }),
            Curve::Spline(n) => Curve::Spline(n.translated(offset)),
        }
    }

    /// Polyline approximation including both end points.
    pub fn tessellate(&self, params: &TessellationParams) -> Vec<Point3<f64>> {
        match self {
            Curve::Line(l) => vec![l.start, l.end],
            Curve::Arc(a) => sample_parametric(
                |t| a.point_at_angle(t),
                a.start_angle,
                a.end_angle,
                params.segments_for_sweep(a.sweep()),
            ),
            Curve::Ellipse(e) => sample_parametric(
                |t| e.point_at_angle(t),
                e.start_angle,
                e.end_angle,
                params.segments_for_sweep(e.sweep()),
            ),
            Curve::Spline(n) => {
                let (t0, t1) = n.domain();
                sample_parametric(
                    |t| n.eval(t),
                    t0,
                    t1,
                    params.segments_for_spline(n.control_points.len(), n.degree),
                )
            }
        }
    }

    /// Approximates the curve by straight segments.
    pub fn to_lines(&self, params: &TessellationParams) -> Vec<Curve> {
        if self.is_line() {
            return vec![self.clone()];
        }
        self.tessellate(params)
            .windows(2)
            .filter(|w| (w[1] - w[0]).norm() > 0.0)
            .map(|w| Curve::line(w[0], w[1]))
            .collect()
    }

    /// Arc length (exact for lines and circular arcs, sampled otherwise).
    pub fn length(&self) -> f64 {
        match self {
            Curve::Line(l) => (l.end - l.start).norm(),
            Curve::Arc(a) => a.radius * a.sweep(),
            _ => {
                let fine = TessellationParams {
                    max_angle: std::f64::consts::PI / 180.0,
                    min_segments: 16,
                    max_segments: 1024,
                };
                polyline_length(&self.tessellate(&fine))
            }
        }
    }

    /// Scalar extent of the curve projected onto `direction`.
    ///
    /// Exact for lines, arcs and ellipses; sampled for splines.
    pub fn range_along(&self, direction: &Vector3<f64>) -> (f64, f64) {
        match self {
            Curve::Line(l) => {
                let a = l.start.coords.dot(direction);
                let b = l.end.coords.dot(direction);
                (a.min(b), a.max(b))
            }
            Curve::Arc(a) => trig_range(
                a.center.coords.dot(direction),
                a.radius * a.x_axis.dot(direction),
                a.radius * a.y_axis.dot(direction),
                a.start_angle,
                a.end_angle,
            ),
            Curve::Ellipse(e) => trig_range(
                e.center.coords.dot(direction),
                e.x_radius * e.x_axis.dot(direction),
                e.y_radius * e.y_axis.dot(direction),
                e.start_angle,
                e.end_angle,
            ),
            Curve::Spline(_) => {
                let fine = TessellationParams {
                    max_angle: std::f64::consts::PI / 90.0,
                    min_segments: 32,
                    max_segments: 512,
                };
                self.tessellate(&fine)
                    .iter()
                    .map(|p| p.coords.dot(direction))
                    .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                        (lo.min(v), hi.max(v))
                    })
            }
        }
    }
}
