// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Traversal methods for navigating the topology hierarchy.
//!
//! Supports downward traversal (solid → faces → loops → edges → vertices) and
//! upward traversal (edge → loops → faces) via the adjacency index.

use ifc_cut_geometry::Curve;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::arena::BrepArena;
use crate::keys::*;

// =============================================================================
// Downward traversal
// =============================================================================

impl BrepArena {
    /// Returns the start and end vertex keys of an edge.
    pub fn edge_vertices(&self, key: EdgeKey) -> Option<(VertexKey, VertexKey)> {
        self.edges.get(key).map(|e| (e.start, e.end))
    }

    pub fn edge_curve(&self, key: EdgeKey) -> Option<&Curve> {
        self.edges.get(key).map(|e| &e.curve)
    }

    pub fn loop_edges(&self, key: LoopKey) -> Option<&[EdgeKey]> {
        self.loops.get(key).map(|l| l.edges.as_slice())
    }

    /// Returns the vertex keys of a loop in traversal order.
    pub fn loop_vertices_ordered(&self, key: LoopKey) -> Option<Vec<VertexKey>> {
        let lp = self.loops.get(key)?;
        lp.edges
            .iter()
            .zip(&lp.orientations)
            .map(|(&ek, &forward)| {
                let edge = self.edges.get(ek)?;
                Some(if forward { edge.start } else { edge.end })
            })
            .collect()
    }

    /// Returns the curves of a loop as traversed by it.
    ///
    /// Edges used in reverse yield their reversed curve.
    pub fn loop_curves(&self, key: LoopKey) -> Option<Vec<Curve>> {
        let lp = self.loops.get(key)?;
        lp.edges
            .iter()
            .zip(&lp.orientations)
            .map(|(&ek, &forward)| {
                let curve = &self.edges.get(ek)?.curve;
                Some(if forward { curve.clone() } else { curve.reversed() })
            })
            .collect()
    }

    pub fn face_outer_loop(&self, key: FaceKey) -> Option<LoopKey> {
        self.faces.get(key).and_then(|f| f.outer)
    }

    pub fn face_inner_loops(&self, key: FaceKey) -> Option<&[LoopKey]> {
        self.faces.get(key).map(|f| f.inner.as_slice())
    }

    /// Returns all unique edge keys of a face (outer and inner loops).
    pub fn face_edges(&self, key: FaceKey) -> Option<FxHashSet<EdgeKey>> {
        let face = self.faces.get(key)?;
        let mut set = FxHashSet::default();
        for lp in face.outer.iter().chain(&face.inner) {
            if let Some(data) = self.loops.get(*lp) {
                set.extend(&data.edges);
            }
        }
        Some(set)
    }
}

// =============================================================================
// Upward traversal
// =============================================================================

impl BrepArena {
    pub fn vertex_edges(&self, key: VertexKey) -> Vec<EdgeKey> {
        sorted(self.vertex_to_edges.get(&key))
    }

    pub fn edge_loops(&self, key: EdgeKey) -> Vec<LoopKey> {
        sorted(self.edge_to_loops.get(&key))
    }

    pub fn loop_faces(&self, key: LoopKey) -> Vec<FaceKey> {
        sorted(self.loop_to_faces.get(&key))
    }

    pub fn face_solids(&self, key: FaceKey) -> Vec<SolidKey> {
        sorted(self.face_to_solids.get(&key))
    }

    /// Returns the faces bounded by an edge, in key order.
    pub fn edge_faces(&self, key: EdgeKey) -> Vec<FaceKey> {
        let mut faces: Vec<FaceKey> = self
            .edge_loops(key)
            .into_iter()
            .flat_map(|lp| self.loop_faces(lp))
            .collect();
        faces.sort();
        faces.dedup();
        faces
    }

    /// Returns faces sharing at least one edge with `face`, in key order.
    pub fn adjacent_faces(&self, face: FaceKey) -> Vec<FaceKey> {
        let Some(edges) = self.face_edges(face) else {
            return Vec::new();
        };

        let mut adjacent: Vec<FaceKey> = edges
            .into_iter()
            .flat_map(|ek| self.edge_faces(ek))
            .filter(|&other| other != face)
            .collect();
        adjacent.sort();
        adjacent.dedup();
        adjacent
    }

    /// Checks if a loop is closed (last edge connects back to the first edge).
    pub fn loop_is_closed(&self, key: LoopKey) -> bool {
        let Some(lp) = self.loops.get(key) else {
            return false;
        };
        let (Some(&first), Some(&last)) = (lp.edges.first(), lp.edges.last()) else {
            return false;
        };
        let (Some(first_edge), Some(last_edge)) = (self.edges.get(first), self.edges.get(last))
        else {
            return false;
        };

        let first_start = if lp.orientations[0] {
            first_edge.start
        } else {
            first_edge.end
        };
        let last_end = if lp.orientations[lp.orientations.len() - 1] {
            last_edge.end
        } else {
            last_edge.start
        };

        first_start == last_end
    }

    /// Checks if a solid is closed (every edge is shared by exactly 2 of its faces).
    pub fn solid_is_closed(&self, key: SolidKey) -> bool {
        let Some(solid) = self.solids.get(key) else {
            return false;
        };

        let mut edge_count: FxHashMap<EdgeKey, usize> = FxHashMap::default();
        for &fk in &solid.faces {
            if let Some(edges) = self.face_edges(fk) {
                for ek in edges {
                    *edge_count.entry(ek).or_insert(0) += 1;
                }
            }
        }

        !edge_count.is_empty() && edge_count.values().all(|&c| c == 2)
    }
}

fn sorted<K: Copy + Ord>(set: Option<&FxHashSet<K>>) -> Vec<K> {
    let mut keys: Vec<K> = set.map(|s| s.iter().copied().collect()).unwrap_or_default();
    keys.sort();
    keys
}
