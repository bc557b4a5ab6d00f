// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Arena-based storage for boundary-representation entities.
//!
//! The [`BrepArena`] owns every vertex, edge, loop, face and solid in slot
//! maps with stable, generational keys. Faces hold loop keys and loops hold
//! edge keys, so an edge bounding two faces is stored once and referenced by
//! both. Upward adjacency indices (vertex → edges → loops → faces → solids)
//! answer "which faces share this edge" without scanning.

use ifc_cut_geometry::{Curve, Point3, Tolerance};
use rustc_hash::{FxHashMap, FxHashSet};
use slotmap::SlotMap;

use crate::keys::*;

/// Data stored for an edge: a curve between two vertices.
///
/// `curve` runs from `start` to `end`.
#[derive(Debug, Clone)]
pub struct EdgeData {
    pub start: VertexKey,
    pub end: VertexKey,
    pub curve: Curve,
}

/// Data stored for a loop: a closed chain of edges.
#[derive(Debug, Clone)]
pub struct LoopData {
    /// Edges in traversal order.
    pub edges: Vec<EdgeKey>,
    /// `true` if edge[i] is traversed forward (start→end), `false` if reversed.
    pub orientations: Vec<bool>,
}

/// Data stored for a face: an optional outer loop and zero or more holes.
///
/// `outer` is `None` only for faces that carry no boundary at all.
#[derive(Debug, Clone, Default)]
pub struct FaceData {
    pub outer: Option<LoopKey>,
    pub inner: Vec<LoopKey>,
}

impl FaceData {
    /// Number of boundary loops (outer plus holes).
    pub fn loop_count(&self) -> usize {
        usize::from(self.outer.is_some()) + self.inner.len()
    }
}

/// Data stored for a solid: the faces bounding it.
#[derive(Debug, Clone)]
pub struct SolidData {
    pub faces: Vec<FaceKey>,
}

/// The central arena that owns all topology entities and their adjacency indices.
///
/// # Example
///
/// ```
/// use ifc_cut_topology::BrepArena;
///
/// let mut arena = BrepArena::new();
/// let v0 = arena.add_vertex(0.0, 0.0, 0.0);
/// let v1 = arena.add_vertex(1.0, 0.0, 0.0);
/// let edge = arena.add_line_edge(v0, v1).unwrap();
///
/// assert_eq!(arena.vertex_count(), 2);
/// assert_eq!(arena.edge_vertices(edge), Some((v0, v1)));
/// ```
#[derive(Debug)]
pub struct BrepArena {
    // Entity storage
    pub(crate) vertices: SlotMap<VertexKey, Point3<f64>>,
    pub(crate) edges: SlotMap<EdgeKey, EdgeData>,
    pub(crate) loops: SlotMap<LoopKey, LoopData>,
    pub(crate) faces: SlotMap<FaceKey, FaceData>,
    pub(crate) solids: SlotMap<SolidKey, SolidData>,

    // Upward adjacency: child → parents
    pub(crate) vertex_to_edges: FxHashMap<VertexKey, FxHashSet<EdgeKey>>,
    pub(crate) edge_to_loops: FxHashMap<EdgeKey, FxHashSet<LoopKey>>,
    pub(crate) loop_to_faces: FxHashMap<LoopKey, FxHashSet<FaceKey>>,
    pub(crate) face_to_solids: FxHashMap<FaceKey, FxHashSet<SolidKey>>,

    pub(crate) tolerance: Tolerance,
}

impl BrepArena {
    /// Creates a new, empty arena with default tolerances.
    pub fn new() -> Self {
        Self::with_tolerance(Tolerance::default())
    }

    pub fn with_tolerance(tolerance: Tolerance) -> Self {
        Self {
            vertices: SlotMap::with_key(),
            edges: SlotMap::with_key(),
            loops: SlotMap::with_key(),
            faces: SlotMap::with_key(),
            solids: SlotMap::with_key(),

            vertex_to_edges: FxHashMap::default(),
            edge_to_loops: FxHashMap::default(),
            loop_to_faces: FxHashMap::default(),
            face_to_solids: FxHashMap::default(),

            tolerance,
        }
    }

    #[inline]
    pub fn tolerance(&self) -> &Tolerance {
        &self.tolerance
    }

    // --- Entity access ---

    pub fn vertex(&self, key: VertexKey) -> Option<&Point3<f64>> {
        self.vertices.get(key)
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge(&self, key: EdgeKey) -> Option<&EdgeData> {
        self.edges.get(key)
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn loop_data(&self, key: LoopKey) -> Option<&LoopData> {
        self.loops.get(key)
    }

    pub fn loop_count(&self) -> usize {
        self.loops.len()
    }

    pub fn face(&self, key: FaceKey) -> Option<&FaceData> {
        self.faces.get(key)
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn solid(&self, key: SolidKey) -> Option<&SolidData> {
        self.solids.get(key)
    }

    pub fn solid_count(&self) -> usize {
        self.solids.len()
    }

    // --- Adjacency index helpers ---

    pub(crate) fn link_vertex_edge(&mut self, vertex: VertexKey, edge: EdgeKey) {
        self.vertex_to_edges.entry(vertex).or_default().insert(edge);
    }

    pub(crate) fn link_edge_loop(&mut self, edge: EdgeKey, lp: LoopKey) {
        self.edge_to_loops.entry(edge).or_default().insert(lp);
    }

    pub(crate) fn link_loop_face(&mut self, lp: LoopKey, face: FaceKey) {
        self.loop_to_faces.entry(lp).or_default().insert(face);
    }

    pub(crate) fn link_face_solid(&mut self, face: FaceKey, solid: SolidKey) {
        self.face_to_solids.entry(face).or_default().insert(solid);
    }
}

impl Default for BrepArena {
    fn default() -> Self {
        Self::new()
    }
}
