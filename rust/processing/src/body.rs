// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Solid representations threaded through cut processing.
//!
//! A body is an extruded solid followed by a chain of boolean differences,
//! the shape an exchange writer emits as nested boolean-result entities.
//! Point membership is provided for verification; no meshing happens here.

use ifc_cut_geometry::{point_in_polygon, CurveLoop, Plane, Point2, Point3, TessellationParams, Vector3};
use serde::{Deserialize, Serialize};

/// A planar profile swept along `direction` for `depth`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtrudedSolid {
    /// Profile plane; the sweep starts here.
    pub position: Plane,
    /// Closed profile lying in `position`.
    pub profile: CurveLoop,
    /// Unit sweep direction.
    pub direction: Vector3<f64>,
    pub depth: f64,
}

impl ExtrudedSolid {
    pub fn volume(&self) -> f64 {
        self.profile.area() * self.depth * self.direction.dot(&self.position.normal()).abs()
    }

    /// Point membership (boundary counts as inside).
    pub fn contains(&self, point: &Point3<f64>) -> bool {
        let normal = self.position.normal();
        let rate = self.direction.dot(&normal);
        if rate.abs() < f64::EPSILON {
            return false;
        }
        let t = self.position.signed_distance(point) / rate;
        if t < -1e-9 || t > self.depth + 1e-9 {
            return false;
        }
        let foot = point - self.direction * t;
        let polygon = self
            .profile
            .project_to_plane(&self.position, &TessellationParams::default());
        point_in_polygon(&self.position.to_local(&foot), &polygon)
    }
}

/// Unbounded half-space.
///
/// With `agreement_flag` set the removed material lies on the side opposite
/// the plane normal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HalfSpace {
    pub plane: Plane,
    pub agreement_flag: bool,
}

impl HalfSpace {
    pub fn removes(&self, point: &Point3<f64>) -> bool {
        let d = self.plane.signed_distance(point);
        if self.agreement_flag {
            d < 0.0
        } else {
            d > 0.0
        }
    }
}

/// Half-space limited to the prism through a polygon.
///
/// `boundary` is given in the 2D frame of `position`; the prism runs along
/// the normal of `position`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundedHalfSpace {
    pub half_space: HalfSpace,
    pub position: Plane,
    pub boundary: Vec<Point2<f64>>,
}

impl BoundedHalfSpace {
    pub fn removes(&self, point: &Point3<f64>) -> bool {
        self.half_space.removes(point)
            && point_in_polygon(&self.position.to_local(point), &self.boundary)
    }
}

/// Second operand of a boolean difference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CutOperand {
    HalfSpace(HalfSpace),
    BoundedHalfSpace(BoundedHalfSpace),
    Extrusion(ExtrudedSolid),
}

impl CutOperand {
    pub fn removes(&self, point: &Point3<f64>) -> bool {
        match self {
            CutOperand::HalfSpace(h) => h.removes(point),
            CutOperand::BoundedHalfSpace(b) => b.removes(point),
            CutOperand::Extrusion(e) => e.contains(point),
        }
    }
}

/// An extrusion with zero or more subtracted operands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BodyRepresentation {
    Extrusion(ExtrudedSolid),
    Difference {
        first: Box<BodyRepresentation>,
        second: CutOperand,
    },
}

impl BodyRepresentation {
    /// New body with `operand` subtracted.
    pub fn difference(self, operand: CutOperand) -> Self {
        BodyRepresentation::Difference {
            first: Box::new(self),
            second: operand,
        }
    }

    /// The innermost extrusion.
    pub fn base(&self) -> &ExtrudedSolid {
        let mut node = self;
        loop {
            match node {
                BodyRepresentation::Extrusion(solid) => return solid,
                BodyRepresentation::Difference { first, .. } => node = first,
            }
        }
    }

    /// Subtracted operands in the order they were applied.
    pub fn operands(&self) -> Vec<&CutOperand> {
        let mut operands = Vec::new();
        let mut node = self;
        while let BodyRepresentation::Difference { first, second } = node {
            operands.push(second);
            node = first;
        }
        operands.reverse();
        operands
    }

    pub fn contains(&self, point: &Point3<f64>) -> bool {
        self.base().contains(point) && !self.operands().iter().any(|op| op.removes(point))
    }
}

/// Result of cut processing: a body, or nothing left at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", content = "body", rename_all = "snake_case")]
pub enum BodyState {
    Solid(BodyRepresentation),
    FullyClipped,
}

impl BodyState {
    pub fn body(&self) -> Option<&BodyRepresentation> {
        match self {
            BodyState::Solid(body) => Some(body),
            BodyState::FullyClipped => None,
        }
    }

    #[inline]
    pub fn is_fully_clipped(&self) -> bool {
        matches!(self, BodyState::FullyClipped)
    }
}
