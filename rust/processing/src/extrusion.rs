// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The base extruded solid that cuts are applied to.

use ifc_cut_geometry::{is_orthogonal, CurveLoop, Plane, Point3, Tolerance, Vector3};
use serde::{Deserialize, Serialize};

use crate::body::{BodyRepresentation, ExtrudedSolid};
use crate::error::{Error, Result};

/// Scalar interval along the extrusion direction, `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExtrusionRange {
    start: f64,
    end: f64,
}

impl ExtrusionRange {
    pub fn new(start: f64, end: f64) -> Result<Self> {
        if !(start.is_finite() && end.is_finite()) || start > end {
            return Err(Error::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    #[inline]
    pub fn start(&self) -> f64 {
        self.start
    }

    #[inline]
    pub fn end(&self) -> f64 {
        self.end
    }

    #[inline]
    pub fn length(&self) -> f64 {
        self.end - self.start
    }

    pub fn touches_start(&self, value: f64, tol: &Tolerance) -> bool {
        value <= self.start + tol.distance
    }

    pub fn touches_end(&self, value: f64, tol: &Tolerance) -> bool {
        value >= self.end - tol.distance
    }

    /// `true` if `other` lies within this range.
    pub fn contains_range(&self, other: &ExtrusionRange) -> bool {
        other.start >= self.start && other.end <= self.end
    }

    /// Range with a later start, clamped to stay non-empty.
    pub(crate) fn raise_start(&self, start: f64) -> Self {
        Self {
            start: start.max(self.start).min(self.end),
            end: self.end,
        }
    }

    /// Range with an earlier end, clamped to stay non-empty.
    pub(crate) fn lower_end(&self, end: f64) -> Self {
        Self {
            start: self.start,
            end: end.min(self.end).max(self.start),
        }
    }
}

/// An extruded solid analysed for cuts.
///
/// Occupies `{ v + t·direction : v in profile, t in range }`; `profile` lies
/// in the `position` plane, which is the `t = 0` reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseExtrusion {
    position: Plane,
    profile: CurveLoop,
    direction: Vector3<f64>,
    range: ExtrusionRange,
    local_offset: Option<Vector3<f64>>,
}

impl BaseExtrusion {
    pub fn new(
        position: Plane,
        profile: CurveLoop,
        direction: Vector3<f64>,
        range: ExtrusionRange,
    ) -> Result<Self> {
        let direction = direction
            .try_normalize(1e-12)
            .ok_or_else(|| Error::InvalidExtrusion("zero-length direction".to_string()))?;
        if is_orthogonal(&direction, &position.normal(), &Tolerance::default()) {
            return Err(Error::InvalidExtrusion(
                "direction lies in the profile plane".to_string(),
            ));
        }
        if profile.is_empty() {
            return Err(Error::InvalidExtrusion("empty profile".to_string()));
        }
        Ok(Self {
            position,
            profile,
            direction,
            range,
            local_offset: None,
        })
    }

    /// Offset applied to cut faces to bring them into this extrusion's frame.
    pub fn with_local_offset(mut self, offset: Vector3<f64>) -> Self {
        self.local_offset = Some(offset);
        self
    }

    #[inline]
    pub fn position(&self) -> &Plane {
        &self.position
    }

    #[inline]
    pub fn profile(&self) -> &CurveLoop {
        &self.profile
    }

    /// Unit extrusion direction.
    #[inline]
    pub fn direction(&self) -> Vector3<f64> {
        self.direction
    }

    #[inline]
    pub fn range(&self) -> ExtrusionRange {
        self.range
    }

    #[inline]
    pub fn local_offset(&self) -> Option<Vector3<f64>> {
        self.local_offset
    }

    /// Scale turning a displacement along the base normal into `t`.
    fn parameter_axis(&self) -> Vector3<f64> {
        let n = self.position.normal();
        n / n.dot(&self.direction)
    }

    /// Extrusion parameter `t` of the cross-section through `point`.
    pub fn parameter_of(&self, point: &Point3<f64>) -> f64 {
        (point - self.position.origin()).dot(&self.parameter_axis())
    }

    /// Parameter interval spanned by a loop.
    pub fn parameter_range(&self, curve_loop: &CurveLoop) -> Option<(f64, f64)> {
        let offset = self.position.origin().coords.dot(&self.parameter_axis());
        curve_loop
            .range_along(&self.parameter_axis())
            .map(|(lo, hi)| (lo - offset, hi - offset))
    }

    /// The profile moved to parameter `t`.
    pub fn profile_at(&self, t: f64) -> CurveLoop {
        self.profile.translated(&(self.direction * t))
    }

    /// The uncut body over `range`.
    pub fn body_over(&self, range: ExtrusionRange) -> BodyRepresentation {
        let shift = self.direction * range.start();
        BodyRepresentation::Extrusion(ExtrudedSolid {
            position: self.position.translated(&shift),
            profile: self.profile.translated(&shift),
            direction: self.direction,
            depth: range.length(),
        })
    }

    /// The uncut body over the full range.
    pub fn to_body(&self) -> BodyRepresentation {
        self.body_over(self.range)
    }
}
