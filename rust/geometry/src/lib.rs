// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! IFC Cut Geometry
//!
//! Geometric primitives shared by the cut engine: planes with local 2D
//! frames, tolerance-aware direction tests, bounded curves (line, arc,
//! ellipse, NURBS) and closed curve loops.

pub mod curve;
pub mod curve_loop;
pub mod error;
pub mod nurbs;
pub mod plane;
pub mod tessellation;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point2, Point3, Vector2, Vector3};

pub use curve::{CircularArc, Curve, CurveKind, EllipticalArc, LineSegment};
pub use curve_loop::{point_in_polygon, CurveLoop};
pub use error::{Error, Result};
pub use nurbs::NurbsCurve;
pub use plane::{is_codirectional, is_orthogonal, is_parallel, Plane, Tolerance};
pub use tessellation::{newell_normal, TessellationParams};
