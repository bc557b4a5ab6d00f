// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Cut classification.
//!
//! Decides what a connected face collection does to the base extrusion,
//! checking in order (first match wins):
//!
//! 1. any freeform face: unsupported
//! 2. a single face: clip plane when inclined to the extrusion, else inert
//! 3. loops touching exactly one end of the range: end clip
//! 4. loops touching both ends: unsupported
//! 5. loops touching neither end: recess or through opening

use ifc_cut_geometry::{is_orthogonal, CurveLoop, Plane};
use ifc_cut_topology::{BoundaryOptions, BrepArena, FaceBoundaryExtractor, FaceKey, FaceSurface};
use serde::{Deserialize, Serialize};

use crate::analyzer::FaceCollection;
use crate::config::CutConfig;
use crate::error::{Outcome, UnsupportedReason, UnsupportedTopology};
use crate::extrusion::BaseExtrusion;
use crate::opening::{OpeningPlan, OpeningSynthesizer};

/// A planar face acting as a clip plane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipFace {
    pub face: FaceKey,
    /// Outer boundary in the extrusion's frame.
    pub boundary: CurveLoop,
    /// Plane of `boundary`; removed material lies opposite its normal.
    pub plane: Plane,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtrusionEnd {
    Start,
    End,
}

/// Disposition of one face collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Classification {
    /// The collection does not change the body.
    Inert,
    ClipPlane(ClipFace),
    EndClip {
        end: ExtrusionEnd,
        faces: Vec<ClipFace>,
    },
    Opening(OpeningPlan),
}

/// A collection face with its extracted boundary and surface type.
#[derive(Debug, Clone, PartialEq)]
pub struct CutFace {
    pub face: FaceKey,
    pub boundary: CurveLoop,
    pub surface: FaceSurface,
}

impl CutFace {
    pub fn plane(&self) -> Option<&Plane> {
        self.surface.plane()
    }

    fn to_clip_face(&self) -> Option<ClipFace> {
        Some(ClipFace {
            face: self.face,
            boundary: self.boundary.clone(),
            plane: *self.plane()?,
        })
    }
}

/// Classifies face collections against one base extrusion.
///
/// Classification is a pure function of the arena and the collection.
#[derive(Debug, Clone, Copy)]
pub struct CutClassifier<'a> {
    arena: &'a BrepArena,
    base: &'a BaseExtrusion,
    config: &'a CutConfig,
}

impl<'a> CutClassifier<'a> {
    pub fn new(arena: &'a BrepArena, base: &'a BaseExtrusion, config: &'a CutConfig) -> Self {
        Self {
            arena,
            base,
            config,
        }
    }

    pub fn classify(&self, collection: &FaceCollection) -> Outcome<Classification> {
        self.decide(collection)
            .map_err(|reason| UnsupportedTopology::new(reason).for_element(collection.element))
    }

    fn decide(&self, collection: &FaceCollection) -> Result<Classification, UnsupportedReason> {
        let faces = self.prepare(&collection.faces)?;
        if faces.is_empty() {
            return Ok(Classification::Inert);
        }

        if faces.iter().any(|f| matches!(f.surface, FaceSurface::Freeform)) {
            return Err(UnsupportedReason::NonPlanarCollection);
        }

        let direction = self.base.direction();
        let tol = &self.config.tolerance;

        if let [single] = faces.as_slice() {
            return match single.plane() {
                Some(plane) if is_orthogonal(&plane.normal(), &direction, tol) => {
                    Ok(Classification::Inert)
                }
                Some(_) => single
                    .to_clip_face()
                    .map(Classification::ClipPlane)
                    .ok_or(UnsupportedReason::NonPlanarCollection),
                None => Err(UnsupportedReason::NonPlanarCollection),
            };
        }

        let range = self.base.range();
        let (mut at_start, mut at_end) = (false, false);
        for face in &faces {
            if let Some((lo, hi)) = self.base.parameter_range(&face.boundary) {
                at_start |= range.touches_start(lo, tol);
                at_end |= range.touches_end(hi, tol);
            }
        }

        match (at_start, at_end) {
            (true, true) => Err(UnsupportedReason::BothEndsClipped),
            (true, false) => self.end_clip(ExtrusionEnd::Start, &faces),
            (false, true) => self.end_clip(ExtrusionEnd::End, &faces),
            (false, false) => {
                let synthesizer = OpeningSynthesizer::new(self.config);
                synthesizer
                    .plan(self.arena, self.base, &faces)
                    .map(Classification::Opening)
            }
        }
    }

    /// Extracts each face's boundary in the extrusion frame, dropping faces
    /// without one.
    fn prepare(&self, keys: &[FaceKey]) -> Result<Vec<CutFace>, UnsupportedReason> {
        let extractor = FaceBoundaryExtractor::new(
            self.arena,
            BoundaryOptions {
                offset: self.base.local_offset(),
                polygonal_only: self.config.polygonal_boundaries,
                tessellation: self.config.tessellation,
            },
        );

        let mut faces = Vec::with_capacity(keys.len());
        for &face in keys {
            let boundary = extractor
                .extract(face)
                .map_err(|_| UnsupportedReason::MissingFaceGeometry)?;
            if boundary.is_empty() {
                continue;
            }
            let surface = match self.arena.face_surface(face) {
                FaceSurface::Planar(_) => boundary
                    .curve_loop
                    .plane()
                    .map_or(FaceSurface::Freeform, |p| FaceSurface::Planar(*p)),
                other => other,
            };
            faces.push(CutFace {
                face,
                boundary: boundary.curve_loop,
                surface,
            });
        }
        Ok(faces)
    }

    fn end_clip(&self, end: ExtrusionEnd, faces: &[CutFace]) -> Result<Classification, UnsupportedReason> {
        let direction = self.base.direction();
        let tol = &self.config.tolerance;

        let mut clips = Vec::new();
        let mut sign = 0.0_f64;
        for face in faces {
            let plane = face.plane().ok_or(UnsupportedReason::NonPlanarCollection)?;
            let normal = plane.normal();
            if is_orthogonal(&normal, &direction, tol) {
                continue;
            }
            let slant = normal.dot(&direction).signum();
            if sign != 0.0 && slant != sign {
                return Err(UnsupportedReason::ClipOrientationConflict);
            }
            sign = slant;
            clips.extend(face.to_clip_face());
        }

        if clips.is_empty() {
            return Err(UnsupportedReason::NoClippingFace);
        }
        Ok(Classification::EndClip { end, faces: clips })
    }
}
