// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Geometric queries on topology entities.
//!
//! Face planes come from the outer loop's curves (Newell normal over the
//! sampled boundary). Non-planar faces are further classified as ruled
//! extrusion sides when their boundary is two matching curves joined by two
//! parallel rails.

use ifc_cut_geometry::{Curve, CurveLoop, Plane, Vector3};
use serde::{Deserialize, Serialize};

use crate::arena::BrepArena;
use crate::error::{Error, Result};
use crate::keys::*;

/// Underlying surface of a face, as far as the cut engine cares.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FaceSurface {
    Planar(Plane),
    /// Swept side face; `axis` is the unit rail direction.
    Ruled { axis: Vector3<f64> },
    Freeform,
}

impl FaceSurface {
    pub fn plane(&self) -> Option<&Plane> {
        match self {
            FaceSurface::Planar(plane) => Some(plane),
            _ => None,
        }
    }
}

impl BrepArena {
    /// Builds the curve loop traversed by a loop entity.
    pub fn loop_curve_loop(&self, key: LoopKey) -> Result<CurveLoop> {
        let curves = self.loop_curves(key).ok_or(Error::LoopNotFound(key))?;
        Ok(CurveLoop::new(curves, &self.tolerance)?)
    }

    /// Outer boundary of a face as a curve loop; empty when the face has none.
    pub fn face_curve_loop(&self, key: FaceKey) -> Result<CurveLoop> {
        let face = self.faces.get(key).ok_or(Error::FaceNotFound(key))?;
        match face.outer {
            Some(lp) => self.loop_curve_loop(lp),
            None => Ok(CurveLoop::empty()),
        }
    }

    /// Plane of a planar face, oriented by its outer loop.
    pub fn face_plane(&self, key: FaceKey) -> Option<Plane> {
        self.face_curve_loop(key).ok()?.plane().copied()
    }

    /// Area of a planar face minus its holes.
    pub fn face_area(&self, key: FaceKey) -> Option<f64> {
        let face = self.faces.get(key)?;
        let outer = self.loop_curve_loop(face.outer?).ok()?;
        let holes: f64 = face
            .inner
            .iter()
            .filter_map(|&lp| self.loop_curve_loop(lp).ok())
            .map(|l| l.area())
            .sum();
        Some(outer.area() - holes)
    }

    /// Classifies the surface a face lies on.
    pub fn face_surface(&self, key: FaceKey) -> FaceSurface {
        let Ok(boundary) = self.face_curve_loop(key) else {
            return FaceSurface::Freeform;
        };
        if let Some(plane) = boundary.plane() {
            return FaceSurface::Planar(*plane);
        }
        match ruled_axis(boundary.curves(), &self.tolerance) {
            Some(axis) => FaceSurface::Ruled { axis },
            None => FaceSurface::Freeform,
        }
    }
}

/// Detects `rail, profile, rail, profile` boundaries where the two rails are
/// opposite straight lines and the second profile is the first one reversed
/// and shifted by the rail vector.
fn ruled_axis(curves: &[Curve], tol: &ifc_cut_geometry::Tolerance) -> Option<Vector3<f64>> {
    if curves.len() != 4 {
        return None;
    }

    for shift in 0..2 {
        let rail_a = &curves[shift];
        let profile_a = &curves[shift + 1];
        let rail_b = &curves[shift + 2];
        let profile_b = &curves[(shift + 3) % 4];

        if !(rail_a.is_line() && rail_b.is_line()) {
            continue;
        }
        let h = rail_a.end_point() - rail_a.start_point();
        let h_back = rail_b.end_point() - rail_b.start_point();
        if h.norm() <= tol.distance || (h + h_back).norm() > tol.distance {
            continue;
        }

        let shifted = profile_b.translated(&h);
        let matches = (0..=4).all(|i| {
            let s = i as f64 / 4.0;
            tol.points_coincide(&shifted.point_at(s), &profile_a.point_at(1.0 - s))
        });
        if matches {
            return h.try_normalize(1e-12);
        }
    }
    None
}
