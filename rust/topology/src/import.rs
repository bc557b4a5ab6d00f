// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Import-side shape building.
//!
//! Imported faces arrive as rings of points, one per bound. Each ring goes
//! through [`LoopBuilder`]; a degraded hole is dropped, a degraded outer bound
//! aborts the face, and (by default) an aborted face aborts the whole shape.
//! Nothing is written to the arena until [`ShellBuilder::finish`] succeeds.

use ifc_cut_geometry::Point3;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::arena::BrepArena;
use crate::error::{Error, Result};
use crate::keys::{FaceKey, LoopKey, SolidKey, VertexKey};
use crate::loop_builder::{LoopBuilder, LoopStatus};

/// Import settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImportConfig {
    /// Merge distance for near-duplicate vertices.
    pub vertex_tolerance: f64,
    /// Reverse every imported loop.
    pub reverse: bool,
    /// Abort the whole shape when any face loses its outer boundary.
    pub abort_shape_on_missing_outer: bool,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            vertex_tolerance: 1e-4,
            reverse: false,
            abort_shape_on_missing_outer: true,
        }
    }
}

impl ImportConfig {
    /// Load configuration from `IFC_CUT_*` environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            vertex_tolerance: env_or("IFC_CUT_VERTEX_TOLERANCE", defaults.vertex_tolerance),
            reverse: env_or("IFC_CUT_REVERSE_LOOPS", defaults.reverse),
            abort_shape_on_missing_outer: env_or(
                "IFC_CUT_ABORT_ON_MISSING_OUTER",
                defaults.abort_shape_on_missing_outer,
            ),
        }
    }
}

/// Parses environment variable `name`, keeping `default` when it is unset or
/// does not parse.
pub fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// One bound of an imported face.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundLoop {
    pub points: Vec<Point3<f64>>,
    /// Marked as the outer bound by the source file.
    pub outer: bool,
    /// `false` when the bound is stored against the face orientation.
    pub orientation: bool,
}

impl BoundLoop {
    pub fn outer(points: Vec<Point3<f64>>) -> Self {
        Self {
            points,
            outer: true,
            orientation: true,
        }
    }

    pub fn hole(points: Vec<Point3<f64>>) -> Self {
        Self {
            points,
            outer: false,
            orientation: true,
        }
    }
}

/// What happened to one imported face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FaceStatus {
    Accepted,
    /// Accepted without `dropped` degraded holes.
    HolesDropped { dropped: usize },
    /// Outer boundary unusable; the face is not emitted.
    Aborted,
}

#[derive(Debug, Clone)]
struct PendingFace {
    outer: Vec<Point3<f64>>,
    holes: Vec<Vec<Point3<f64>>>,
}

/// Turns the bounds of one face into cleaned rings.
#[derive(Debug, Clone, Copy)]
struct FaceBuilder {
    config: ImportConfig,
}

impl FaceBuilder {
    fn new(config: ImportConfig) -> Self {
        Self { config }
    }

    fn loop_builder(&self, bound: &BoundLoop) -> LoopBuilder {
        let reverse = self.config.reverse != !bound.orientation;
        LoopBuilder::new(self.config.vertex_tolerance).reversed(reverse)
    }

    fn build(&self, bounds: &[BoundLoop]) -> (Option<PendingFace>, FaceStatus) {
        // Without an explicit outer bound the first one is taken
        let outer_index = bounds.iter().position(|b| b.outer).unwrap_or(0);
        let Some(outer_bound) = bounds.get(outer_index) else {
            return (None, FaceStatus::Aborted);
        };

        let outer = self.loop_builder(outer_bound).build(&outer_bound.points);
        if outer.status != LoopStatus::Ok {
            return (None, FaceStatus::Aborted);
        }

        let mut holes = Vec::new();
        let mut dropped = 0;
        for (i, bound) in bounds.iter().enumerate() {
            if i == outer_index {
                continue;
            }
            let hole = self.loop_builder(bound).build(&bound.points);
            if hole.is_ok() {
                holes.push(hole.vertices);
            } else {
                dropped += 1;
            }
        }

        let status = if dropped > 0 {
            FaceStatus::HolesDropped { dropped }
        } else {
            FaceStatus::Accepted
        };
        let face = PendingFace {
            outer: outer.vertices,
            holes,
        };
        (Some(face), status)
    }
}

/// Faces and solid written by a successful [`ShellBuilder::finish`].
#[derive(Debug, Clone)]
pub struct ShellBuild {
    pub solid: SolidKey,
    pub faces: Vec<FaceKey>,
    pub aborted_faces: usize,
    pub dropped_holes: usize,
}

/// Collects imported faces for one shape and writes them to an arena.
#[derive(Debug)]
pub struct ShellBuilder {
    label: String,
    config: ImportConfig,
    faces: Vec<PendingFace>,
    aborted_faces: usize,
    dropped_holes: usize,
}

impl ShellBuilder {
    /// `label` identifies the shape in diagnostics.
    pub fn new(label: impl Into<String>, config: ImportConfig) -> Self {
        Self {
            label: label.into(),
            config,
            faces: Vec::new(),
            aborted_faces: 0,
            dropped_holes: 0,
        }
    }

    pub fn add_face(&mut self, bounds: &[BoundLoop]) -> FaceStatus {
        let (face, status) = FaceBuilder::new(self.config).build(bounds);
        match status {
            FaceStatus::Aborted => {
                self.aborted_faces += 1;
                warn!(
                    shape = %self.label,
                    face = self.faces.len() + self.aborted_faces - 1,
                    "outer boundary degenerate, face dropped"
                );
            }
            FaceStatus::HolesDropped { dropped } => {
                self.dropped_holes += dropped;
                debug!(shape = %self.label, dropped, "degenerate holes dropped");
            }
            FaceStatus::Accepted => {}
        }
        self.faces.extend(face);
        status
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Writes the collected faces into `arena` as one solid.
    ///
    /// Fails without touching the arena when a face was aborted and
    /// `abort_shape_on_missing_outer` is set, or when no face survived.
    pub fn finish(self, arena: &mut BrepArena) -> Result<ShellBuild> {
        if self.aborted_faces > 0 && self.config.abort_shape_on_missing_outer {
            warn!(
                shape = %self.label,
                aborted = self.aborted_faces,
                "shape aborted: face without outer boundary"
            );
            return Err(Error::DegenerateBoundary(format!(
                "{}: {} face(s) lost their outer boundary",
                self.label, self.aborted_faces
            )));
        }
        if self.faces.is_empty() {
            return Err(Error::DegenerateBoundary(format!("{}: no faces", self.label)));
        }

        let mut welder = VertexWelder::new(self.config.vertex_tolerance);
        let mut faces = Vec::with_capacity(self.faces.len());
        for pending in &self.faces {
            let outer = welder.ring_loop(arena, &pending.outer)?;
            let mut holes = Vec::with_capacity(pending.holes.len());
            for hole in &pending.holes {
                holes.push(welder.ring_loop(arena, hole)?);
            }
            faces.push(arena.add_face_with_holes(outer, &holes)?);
        }
        let solid = arena.add_solid(&faces)?;

        debug!(shape = %self.label, faces = faces.len(), "shell built");
        Ok(ShellBuild {
            solid,
            faces,
            aborted_faces: self.aborted_faces,
            dropped_holes: self.dropped_holes,
        })
    }
}

/// Shares vertices and straight edges between faces by quantized position.
struct VertexWelder {
    tolerance: f64,
    cells: FxHashMap<(i64, i64, i64), VertexKey>,
}

impl VertexWelder {
    fn new(tolerance: f64) -> Self {
        Self {
            tolerance: tolerance.max(f64::EPSILON),
            cells: FxHashMap::default(),
        }
    }

    fn vertex(&mut self, arena: &mut BrepArena, point: &Point3<f64>) -> VertexKey {
        let q = |c: f64| (c / self.tolerance).round() as i64;
        let cell = (q(point.x), q(point.y), q(point.z));
        *self.cells.entry(cell).or_insert_with(|| arena.add_point(*point))
    }

    fn ring_loop(&mut self, arena: &mut BrepArena, ring: &[Point3<f64>]) -> Result<LoopKey> {
        let keys: Vec<VertexKey> = ring.iter().map(|p| self.vertex(arena, p)).collect();

        let mut edges = Vec::with_capacity(keys.len());
        for i in 0..keys.len() {
            let (a, b) = (keys[i], keys[(i + 1) % keys.len()]);
            if a == b {
                continue;
            }
            let existing = arena
                .vertex_edges(a)
                .into_iter()
                .find(|&ek| match arena.edge(ek) {
                    Some(e) => {
                        let joins = (e.start == a && e.end == b) || (e.start == b && e.end == a);
                        joins && e.curve.is_line()
                    }
                    None => false,
                });
            let edge = match existing {
                Some(ek) => ek,
                None => arena.add_line_edge(a, b)?,
            };
            edges.push(edge);
        }

        if edges.len() < 3 {
            return Err(Error::DegenerateBoundary(
                "ring collapsed while welding vertices".to_string(),
            ));
        }
        arena.add_loop(&edges)
    }
}
