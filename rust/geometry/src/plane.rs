// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Planes, local 2D frames and tolerance-aware direction tests.

use crate::error::{Error, Result};
use nalgebra::{Point2, Point3, Vector2, Vector3};
use serde::{Deserialize, Serialize};

/// Numeric tolerances shared by every geometric predicate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tolerance {
    /// Distance below which two points coincide.
    pub distance: f64,
    /// Sine of the largest angle at which two directions still count as parallel.
    pub angular: f64,
    /// Merge distance for near-duplicate vertices of imported boundaries.
    pub vertex: f64,
}

impl Tolerance {
    pub const fn new(distance: f64, angular: f64, vertex: f64) -> Self {
        Self {
            distance,
            angular,
            vertex,
        }
    }

    /// Returns `true` if `a` and `b` are closer than the distance tolerance.
    #[inline]
    pub fn points_coincide(&self, a: &Point3<f64>, b: &Point3<f64>) -> bool {
        (a - b).norm() <= self.distance
    }

    /// Returns `true` if two scalar values agree within the distance tolerance.
    #[inline]
    pub fn lengths_equal(&self, a: f64, b: f64) -> bool {
        (a - b).abs() <= self.distance
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::new(1e-6, 1e-6, 1e-4)
    }
}

/// Returns `true` if `a` and `b` are parallel or anti-parallel.
///
/// Zero-length vectors are never parallel to anything.
pub fn is_parallel(a: &Vector3<f64>, b: &Vector3<f64>, tol: &Tolerance) -> bool {
    let scale = a.norm() * b.norm();
    if scale < f64::EPSILON {
        return false;
    }
    a.cross(b).norm() <= tol.angular * scale
}

/// Returns `true` if `a` and `b` are parallel and point the same way.
pub fn is_codirectional(a: &Vector3<f64>, b: &Vector3<f64>, tol: &Tolerance) -> bool {
    is_parallel(a, b, tol) && a.dot(b) > 0.0
}

/// Returns `true` if `a` and `b` are perpendicular.
pub fn is_orthogonal(a: &Vector3<f64>, b: &Vector3<f64>, tol: &Tolerance) -> bool {
    let scale = a.norm() * b.norm();
    if scale < f64::EPSILON {
        return false;
    }
    a.dot(b).abs() <= tol.angular * scale
}

/// Picks the world axis least aligned with `normal`, for stable cross products.
pub(crate) fn least_parallel_axis(normal: &Vector3<f64>) -> Vector3<f64> {
    let abs_x = normal.x.abs();
    let abs_y = normal.y.abs();
    let abs_z = normal.z.abs();

    if abs_x <= abs_y && abs_x <= abs_z {
        Vector3::x()
    } else if abs_y <= abs_z {
        Vector3::y()
    } else {
        Vector3::z()
    }
}

/// An oriented plane with an orthonormal in-plane frame.
///
/// The normal is implicit: `x_axis × y_axis`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    origin: Point3<f64>,
    x_axis: Vector3<f64>,
    y_axis: Vector3<f64>,
}

impl Plane {
    /// Builds a plane from an origin and two in-plane directions.
    ///
    /// `x` is normalized; `y` is made orthogonal to `x` before normalizing.
    pub fn from_three_vectors(
        origin: Point3<f64>,
        x: Vector3<f64>,
        y: Vector3<f64>,
    ) -> Result<Self> {
        let x_axis = x
            .try_normalize(1e-12)
            .ok_or_else(|| Error::DegeneratePlane("zero-length x direction".to_string()))?;
        let y_perp = y - x_axis * y.dot(&x_axis);
        let y_axis = y_perp
            .try_normalize(1e-12)
            .ok_or_else(|| Error::DegeneratePlane("x and y directions are parallel".to_string()))?;

        Ok(Self {
            origin,
            x_axis,
            y_axis,
        })
    }

    /// Builds a plane from an origin and a normal, choosing a stable x axis.
    pub fn from_normal(origin: Point3<f64>, normal: Vector3<f64>) -> Result<Self> {
        let normal = normal
            .try_normalize(1e-12)
            .ok_or_else(|| Error::DegeneratePlane("zero-length normal".to_string()))?;
        let reference = least_parallel_axis(&normal);
        let x_axis = reference.cross(&normal).normalize();
        let y_axis = normal.cross(&x_axis);

        Ok(Self {
            origin,
            x_axis,
            y_axis,
        })
    }

    /// Builds a plane with the given normal whose x axis follows `x_hint`.
    ///
    /// Falls back to [`Plane::from_normal`] when the hint is parallel to the normal.
    pub fn from_normal_and_x(
        origin: Point3<f64>,
        normal: Vector3<f64>,
        x_hint: Vector3<f64>,
    ) -> Result<Self> {
        let unit_normal = normal
            .try_normalize(1e-12)
            .ok_or_else(|| Error::DegeneratePlane("zero-length normal".to_string()))?;
        let in_plane = x_hint - unit_normal * x_hint.dot(&unit_normal);
        match in_plane.try_normalize(1e-12) {
            Some(x_axis) => Ok(Self {
                origin,
                x_axis,
                y_axis: unit_normal.cross(&x_axis),
            }),
            None => Self::from_normal(origin, normal),
        }
    }

    #[inline]
    pub fn origin(&self) -> Point3<f64> {
        self.origin
    }

    #[inline]
    pub fn x_axis(&self) -> Vector3<f64> {
        self.x_axis
    }

    #[inline]
    pub fn y_axis(&self) -> Vector3<f64> {
        self.y_axis
    }

    #[inline]
    pub fn normal(&self) -> Vector3<f64> {
        self.x_axis.cross(&self.y_axis)
    }

    /// Signed distance from the plane, positive on the normal side.
    #[inline]
    pub fn signed_distance(&self, point: &Point3<f64>) -> f64 {
        (point - self.origin).dot(&self.normal())
    }

    /// Returns `true` if `point` lies on the plane within tolerance.
    pub fn contains_point(&self, point: &Point3<f64>, tol: &Tolerance) -> bool {
        self.signed_distance(point).abs() <= tol.distance
    }

    /// Orthogonal projection of `point` onto the plane.
    pub fn project_point(&self, point: &Point3<f64>) -> Point3<f64> {
        point - self.normal() * self.signed_distance(point)
    }

    /// Coordinates of `point` in the plane's 2D frame (orthogonal projection).
    #[inline]
    pub fn to_local(&self, point: &Point3<f64>) -> Point2<f64> {
        let v = point - self.origin;
        Point2::new(v.dot(&self.x_axis), v.dot(&self.y_axis))
    }

    /// Components of `vector` in the plane's 2D frame.
    #[inline]
    pub fn to_local_vector(&self, vector: &Vector3<f64>) -> Vector2<f64> {
        Vector2::new(vector.dot(&self.x_axis), vector.dot(&self.y_axis))
    }

    /// Maps plane coordinates back into 3D.
    #[inline]
    pub fn to_world(&self, point: &Point2<f64>) -> Point3<f64> {
        self.origin + self.x_axis * point.x + self.y_axis * point.y
    }

    /// Same plane with the opposite normal (y axis negated).
    pub fn flipped(&self) -> Self {
        Self {
            origin: self.origin,
            x_axis: self.x_axis,
            y_axis: -self.y_axis,
        }
    }

    pub fn translated(&self, offset: &Vector3<f64>) -> Self {
        Self {
            origin: self.origin + offset,
            ..*self
        }
    }

    /// Same frame moved so its origin is `origin`.
    pub fn with_origin(&self, origin: Point3<f64>) -> Self {
        Self { origin, ..*self }
    }

    pub fn is_parallel_to(&self, other: &Plane, tol: &Tolerance) -> bool {
        is_parallel(&self.normal(), &other.normal(), tol)
    }
}
