// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Curve-by-curve congruence of opening profiles.
//!
//! A side face of an opening runs along one profile curve `a` and back along
//! the matching curve `b` of the opposite profile, so `b` must equal `a`
//! shifted by the profile offset and traversed backwards.

use ifc_cut_geometry::{Curve, NurbsCurve, Point3, Tolerance, Vector3};

use crate::error::UnsupportedReason;

/// Checks `b ≈ reverse(a + offset)`.
///
/// Symmetric: `curves_congruent(a, b, o)` holds iff `curves_congruent(b, a, -o)` does.
pub fn curves_congruent(
    a: &Curve,
    b: &Curve,
    offset: &Vector3<f64>,
    tol: &Tolerance,
) -> Result<(), UnsupportedReason> {
    if a.kind() != b.kind() {
        return Err(UnsupportedReason::CurveKindMismatch {
            first: a.kind(),
            second: b.kind(),
        });
    }
    let mismatch = UnsupportedReason::CurveMismatch { kind: a.kind() };

    let shifted = |p: Point3<f64>| p + offset;
    if !tol.points_coincide(&b.end_point(), &shifted(a.start_point()))
        || !tol.points_coincide(&b.start_point(), &shifted(a.end_point()))
    {
        return Err(mismatch);
    }

    let matches = match (a, b) {
        (Curve::Line(_), Curve::Line(_)) => true,
        (Curve::Arc(x), Curve::Arc(y)) => {
            tol.lengths_equal(x.radius, y.radius)
                && tol.points_coincide(&y.center, &shifted(x.center))
        }
        (Curve::Ellipse(x), Curve::Ellipse(y)) => {
            tol.lengths_equal(x.x_radius, y.x_radius)
                && tol.lengths_equal(x.y_radius, y.y_radius)
                && tol.points_coincide(&y.center, &shifted(x.center))
        }
        (Curve::Spline(x), Curve::Spline(y)) => splines_congruent(x, y, offset, tol),
        _ => false,
    };

    if matches {
        Ok(())
    } else {
        Err(mismatch)
    }
}

fn splines_congruent(a: &NurbsCurve, b: &NurbsCurve, offset: &Vector3<f64>, tol: &Tolerance) -> bool {
    let n = a.control_points.len();
    if a.degree != b.degree || n != b.control_points.len() || a.knots.len() != b.knots.len() {
        return false;
    }

    let points = a
        .control_points
        .iter()
        .rev()
        .zip(&b.control_points)
        .all(|(pa, pb)| tol.points_coincide(pb, &(pa + offset)));

    let weights = a
        .weights
        .iter()
        .rev()
        .zip(&b.weights)
        .all(|(wa, wb)| (wa - wb).abs() <= tol.distance.max(1e-9) * wa.abs().max(1.0));

    let ka = a.normalized_knots();
    let kb = b.normalized_knots();
    let knots = ka
        .iter()
        .rev()
        .zip(&kb)
        .all(|(x, y)| ((1.0 - x) - y).abs() <= 1e-9);

    points && weights && knots
}
