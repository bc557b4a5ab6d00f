// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Face boundary extraction.
//!
//! Walks a face's outer loop and produces the closed curve sequence seen from
//! that face, classifying it by the most complex curve it contains.

use ifc_cut_geometry::{Curve, CurveKind, CurveLoop, TessellationParams, Vector3};
use serde::{Deserialize, Serialize};

use crate::arena::BrepArena;
use crate::error::{Error, Result};
use crate::keys::{FaceKey, LoopKey};

/// Boundary classification, ordered from simplest to most general.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BoundaryKind {
    /// Straight segments only.
    Polygonal,
    /// Straight segments and circular arcs.
    LinesAndArcs,
    /// Anything else (ellipses, splines).
    Complex,
}

impl BoundaryKind {
    fn of(kind: CurveKind) -> Self {
        match kind {
            CurveKind::Line => BoundaryKind::Polygonal,
            CurveKind::Arc => BoundaryKind::LinesAndArcs,
            CurveKind::Ellipse | CurveKind::Spline => BoundaryKind::Complex,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundaryOptions {
    /// Translation applied to every extracted curve.
    pub offset: Option<Vector3<f64>>,
    /// Replace curved edges with line segments.
    pub polygonal_only: bool,
    pub tessellation: TessellationParams,
}

/// A face boundary and its classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceBoundary {
    pub curve_loop: CurveLoop,
    pub kind: BoundaryKind,
}

impl FaceBoundary {
    /// `true` when the face had no usable boundary; callers skip such faces.
    pub fn is_empty(&self) -> bool {
        self.curve_loop.is_empty()
    }
}

/// Extracts oriented boundaries from arena faces.
#[derive(Debug, Clone, Copy)]
pub struct FaceBoundaryExtractor<'a> {
    arena: &'a BrepArena,
    options: BoundaryOptions,
}

impl<'a> FaceBoundaryExtractor<'a> {
    pub fn new(arena: &'a BrepArena, options: BoundaryOptions) -> Self {
        Self { arena, options }
    }

    /// Outer boundary of `face`.
    ///
    /// A face without loops yields an empty, polygonal boundary.
    pub fn extract(&self, face: FaceKey) -> Result<FaceBoundary> {
        let data = self.arena.face(face).ok_or(Error::FaceNotFound(face))?;
        match data.outer {
            Some(lp) => self.extract_loop(lp),
            None => Ok(FaceBoundary {
                curve_loop: CurveLoop::empty(),
                kind: BoundaryKind::Polygonal,
            }),
        }
    }

    /// Boundary traced by a single loop.
    pub fn extract_loop(&self, lp: LoopKey) -> Result<FaceBoundary> {
        let oriented = self.arena.loop_curves(lp).ok_or(Error::LoopNotFound(lp))?;

        let mut kind = BoundaryKind::Polygonal;
        let mut curves = Vec::with_capacity(oriented.len());
        for curve in oriented {
            let curve = match &self.options.offset {
                Some(offset) => curve.translated(offset),
                None => curve,
            };

            if curve.is_line() {
                curves.push(curve);
            } else if self.options.polygonal_only {
                curves.extend(curve.to_lines(&self.options.tessellation));
            } else {
                kind = kind.max(BoundaryKind::of(curve.kind()));
                curves.push(curve);
            }
        }

        let curve_loop = CurveLoop::new(curves, self.arena.tolerance())?;
        Ok(FaceBoundary { curve_loop, kind })
    }
}
