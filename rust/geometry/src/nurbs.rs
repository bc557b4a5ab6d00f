// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Rational B-spline curves.
//!
//! Evaluated in homogeneous coordinates with the Cox-de Boor basis and
//! divided by the weight, so polynomial splines are the all-ones-weight case.

use crate::error::{Error, Result};
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// A NURBS curve with explicit control points, weights and knots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NurbsCurve {
    pub degree: usize,
    pub control_points: Vec<Point3<f64>>,
    pub weights: Vec<f64>,
    pub knots: Vec<f64>,
}

impl NurbsCurve {
    /// Creates a spline, validating knot count, monotonicity and weights.
    pub fn new(
        degree: usize,
        control_points: Vec<Point3<f64>>,
        weights: Vec<f64>,
        knots: Vec<f64>,
    ) -> Result<Self> {
        if degree == 0 {
            return Err(Error::InvalidSpline("degree must be at least 1".to_string()));
        }
        if control_points.len() <= degree {
            return Err(Error::InvalidSpline(format!(
                "{} control points cannot carry degree {}",
                control_points.len(),
                degree
            )));
        }
        if weights.len() != control_points.len() {
            return Err(Error::InvalidSpline(format!(
                "{} weights for {} control points",
                weights.len(),
                control_points.len()
            )));
        }
        if weights.iter().any(|w| !w.is_finite() || *w <= 0.0) {
            return Err(Error::InvalidSpline("weights must be positive".to_string()));
        }
        if knots.len() != control_points.len() + degree + 1 {
            return Err(Error::InvalidSpline(format!(
                "expected {} knots, got {}",
                control_points.len() + degree + 1,
                knots.len()
            )));
        }
        if knots.windows(2).any(|w| w[1] < w[0]) {
            return Err(Error::InvalidSpline("knots must be non-decreasing".to_string()));
        }

        let curve = Self {
            degree,
            control_points,
            weights,
            knots,
        };
        let (t0, t1) = curve.domain();
        if t1 - t0 <= 0.0 {
            return Err(Error::InvalidSpline("empty parameter domain".to_string()));
        }
        Ok(curve)
    }

    /// Clamped spline with uniform interior knots and unit weights.
    pub fn clamped_uniform(degree: usize, control_points: Vec<Point3<f64>>) -> Result<Self> {
        let n = control_points.len();
        let interior = n.saturating_sub(degree + 1);
        let mut knots = Vec::with_capacity(n + degree + 1);
        knots.extend(std::iter::repeat(0.0).take(degree + 1));
        for i in 1..=interior {
            knots.push(i as f64 / (interior + 1) as f64);
        }
        knots.extend(std::iter::repeat(1.0).take(degree + 1));
        let weights = vec![1.0; n];
        Self::new(degree, control_points, weights, knots)
    }

    /// Valid parameter interval.
    pub fn domain(&self) -> (f64, f64) {
        (
            self.knots[self.degree],
            self.knots[self.control_points.len()],
        )
    }

    /// Evaluates the curve at parameter `t` (clamped to the domain).
    pub fn eval(&self, t: f64) -> Point3<f64> {
        let n = self.control_points.len() - 1;
        let (t0, t1) = self.domain();
        let t = t.clamp(t0, t1);
        let span = find_span(&self.knots, n, self.degree, t);
        let basis = basis_functions(&self.knots, span, self.degree, t);

        let mut numerator = Vector3::zeros();
        let mut denominator = 0.0;
        for (i, b) in basis.iter().enumerate() {
            let idx = span - self.degree + i;
            let w = self.weights[idx] * b;
            numerator += self.control_points[idx].coords * w;
            denominator += w;
        }

        if denominator.abs() < 1e-30 {
            self.control_points[span]
        } else {
            Point3::from(numerator / denominator)
        }
    }

    /// Same curve traversed in the opposite direction.
    pub fn reversed(&self) -> Self {
        let (first, last) = (self.knots[0], self.knots[self.knots.len() - 1]);
        Self {
            degree: self.degree,
            control_points: self.control_points.iter().rev().copied().collect(),
            weights: self.weights.iter().rev().copied().collect(),
            knots: self.knots.iter().rev().map(|k| first + last - k).collect(),
        }
    }

    pub fn translated(&self, offset: &Vector3<f64>) -> Self {
        Self {
            control_points: self.control_points.iter().map(|p| p + offset).collect(),
            ..self.clone()
        }
    }

    /// Knot vector rescaled onto `[0, 1]`.
    pub fn normalized_knots(&self) -> Vec<f64> {
        let first = self.knots[0];
        let span = self.knots[self.knots.len() - 1] - first;
        if span <= 0.0 {
            return self.knots.clone();
        }
        self.knots.iter().map(|k| (k - first) / span).collect()
    }
}

/// Finds `i` such that `knots[i] <= t < knots[i + 1]`, clamped to the valid spans.
fn find_span(knots: &[f64], n: usize, degree: usize, t: f64) -> usize {
    if t >= knots[n + 1] {
        return n;
    }
    if t <= knots[degree] {
        return degree;
    }
    let mut low = degree;
    let mut high = n + 1;
    let mut mid = (low + high) / 2;
    while t < knots[mid] || t >= knots[mid + 1] {
        if t < knots[mid] {
            high = mid;
        } else {
            low = mid;
        }
        mid = (low + high) / 2;
    }
    mid
}

/// Non-zero basis functions `N[span-degree..=span]` at `t`.
fn basis_functions(knots: &[f64], span: usize, degree: usize, t: f64) -> Vec<f64> {
    let mut n = vec![0.0; degree + 1];
    let mut left = vec![0.0; degree + 1];
    let mut right = vec![0.0; degree + 1];
    n[0] = 1.0;

    for j in 1..=degree {
        left[j] = t - knots[span + 1 - j];
        right[j] = knots[span + j] - t;
        let mut saved = 0.0;
        for r in 0..j {
            let denom = right[r + 1] + left[j - r];
            let temp = if denom.abs() < 1e-30 { 0.0 } else { n[r] / denom };
            n[r] = saved + right[r + 1] * temp;
            saved = left[j - r] * temp;
        }
        n[j] = saved;
    }

    n
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn quadratic() -> NurbsCurve {
        NurbsCurve::clamped_uniform(
            2,
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 2.0, 0.0),
                Point3::new(3.0, 2.0, 0.0),
                Point3::new(4.0, 0.0, 0.0),
            ],
        )
        .unwrap()
    }

    #[test]
    fn clamped_spline_interpolates_ends() {
        let curve = quadratic();
        let (t0, t1) = curve.domain();
        assert_relative_eq!(curve.eval(t0), Point3::new(0.0, 0.0, 0.0), epsilon = 1e-12);
        assert_relative_eq!(curve.eval(t1), Point3::new(4.0, 0.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn reversal_traverses_backwards() {
        let curve = quadratic();
        let reversed = curve.reversed();
        let (t0, t1) = curve.domain();
        let (r0, r1) = reversed.domain();

        for i in 0..=8 {
            let s = i as f64 / 8.0;
            let forward = curve.eval(t0 + (t1 - t0) * s);
            let backward = reversed.eval(r1 - (r1 - r0) * s);
            assert_relative_eq!(forward, backward, epsilon = 1e-9);
        }
    }

    #[test]
    fn rational_quarter_circle() {
        let w = std::f64::consts::FRAC_1_SQRT_2;
        let curve = NurbsCurve::new(
            2,
            vec![
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            vec![1.0, w, 1.0],
            vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0],
        )
        .unwrap();

        for i in 0..=10 {
            let p = curve.eval(i as f64 / 10.0);
            assert_relative_eq!(p.coords.norm(), 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn invalid_knot_count_is_rejected() {
        let result = NurbsCurve::new(
            2,
            vec![Point3::origin(), Point3::new(1.0, 0.0, 0.0), Point3::new(2.0, 0.0, 0.0)],
            vec![1.0; 3],
            vec![0.0, 0.0, 1.0, 1.0],
        );
        assert!(matches!(result, Err(Error::InvalidSpline(_))));
    }
}
