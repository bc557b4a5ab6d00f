// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Construction methods for topology entities.
//!
//! Each entity is created through the arena, which checks that referenced
//! sub-entities exist and maintains the upward adjacency index.

use ifc_cut_geometry::{Curve, Point3};

use crate::arena::*;
use crate::error::{Error, Result};
use crate::keys::*;

impl BrepArena {
    /// Adds a vertex at the given 3D coordinates.
    pub fn add_vertex(&mut self, x: f64, y: f64, z: f64) -> VertexKey {
        self.vertices.insert(Point3::new(x, y, z))
    }

    pub fn add_point(&mut self, point: Point3<f64>) -> VertexKey {
        self.vertices.insert(point)
    }

    /// Returns an existing vertex within distance tolerance of `point`, or adds one.
    pub fn find_or_add_point(&mut self, point: Point3<f64>) -> VertexKey {
        let tol = self.tolerance;
        let existing = self
            .vertices
            .iter()
            .find(|(_, p)| tol.points_coincide(p, &point))
            .map(|(k, _)| k);
        match existing {
            Some(key) => key,
            None => self.vertices.insert(point),
        }
    }

    /// Creates an edge carrying `curve` between two existing vertices.
    ///
    /// The curve must start at `start` and end at `end` within the vertex
    /// tolerance.
    pub fn add_edge(&mut self, start: VertexKey, end: VertexKey, curve: Curve) -> Result<EdgeKey> {
        let p0 = *self.vertices.get(start).ok_or(Error::VertexNotFound(start))?;
        let p1 = *self.vertices.get(end).ok_or(Error::VertexNotFound(end))?;

        let gap = (curve.start_point() - p0)
            .norm()
            .max((curve.end_point() - p1).norm());
        if gap > self.tolerance.vertex {
            return Err(Error::CurveEndpointMismatch { gap });
        }

        let key = self.edges.insert(EdgeData { start, end, curve });
        self.link_vertex_edge(start, key);
        self.link_vertex_edge(end, key);
        Ok(key)
    }

    /// Creates a straight edge between two existing vertices.
    pub fn add_line_edge(&mut self, start: VertexKey, end: VertexKey) -> Result<EdgeKey> {
        let p0 = *self.vertices.get(start).ok_or(Error::VertexNotFound(start))?;
        let p1 = *self.vertices.get(end).ok_or(Error::VertexNotFound(end))?;
        self.add_edge(start, end, Curve::line(p0, p1))
    }

    /// Creates a loop from an ordered list of edges.
    ///
    /// Consecutive edges must share a vertex. Each edge's orientation is
    /// inferred from its neighbours so the loop has a consistent traversal
    /// direction.
    pub fn add_loop(&mut self, edge_keys: &[EdgeKey]) -> Result<LoopKey> {
        if edge_keys.is_empty() {
            return Err(Error::EmptyLoop);
        }

        for &ek in edge_keys {
            if !self.edges.contains_key(ek) {
                return Err(Error::EdgeNotFound(ek));
            }
        }

        let mut orientations = Vec::with_capacity(edge_keys.len());

        if edge_keys.len() == 1 {
            orientations.push(true);
        } else {
            // First edge orientation follows from the second edge
            let first = &self.edges[edge_keys[0]];
            let second = &self.edges[edge_keys[1]];

            if first.end == second.start || first.end == second.end {
                orientations.push(true);
            } else if first.start == second.start || first.start == second.end {
                orientations.push(false);
            } else {
                return Err(Error::DisconnectedLoop(0, 1));
            }

            for i in 1..edge_keys.len() {
                let prev_edge = &self.edges[edge_keys[i - 1]];
                let curr_edge = &self.edges[edge_keys[i]];

                let prev_end = if orientations[i - 1] {
                    prev_edge.end
                } else {
                    prev_edge.start
                };

                if prev_end == curr_edge.start {
                    orientations.push(true);
                } else if prev_end == curr_edge.end {
                    orientations.push(false);
                } else {
                    return Err(Error::DisconnectedLoop(i - 1, i));
                }
            }
        }

        let key = self.loops.insert(LoopData {
            edges: edge_keys.to_vec(),
            orientations,
        });

        for &ek in edge_keys {
            self.link_edge_loop(ek, key);
        }

        Ok(key)
    }

    /// Creates a face bounded by a single closed loop.
    pub fn add_face(&mut self, outer: LoopKey) -> Result<FaceKey> {
        self.add_face_with_holes(outer, &[])
    }

    /// Creates a face with an outer loop and inner loops (holes).
    pub fn add_face_with_holes(&mut self, outer: LoopKey, inner: &[LoopKey]) -> Result<FaceKey> {
        for &lp in std::iter::once(&outer).chain(inner) {
            if !self.loops.contains_key(lp) {
                return Err(Error::LoopNotFound(lp));
            }
            if !self.loop_is_closed(lp) {
                return Err(Error::OpenLoop(lp));
            }
        }

        let key = self.faces.insert(FaceData {
            outer: Some(outer),
            inner: inner.to_vec(),
        });

        self.link_loop_face(outer, key);
        for &lp in inner {
            self.link_loop_face(lp, key);
        }

        Ok(key)
    }

    /// Creates a face with no boundary loops.
    pub fn add_bare_face(&mut self) -> FaceKey {
        self.faces.insert(FaceData::default())
    }

    /// Creates a solid from its bounding faces.
    pub fn add_solid(&mut self, face_keys: &[FaceKey]) -> Result<SolidKey> {
        for &fk in face_keys {
            if !self.faces.contains_key(fk) {
                return Err(Error::FaceNotFound(fk));
            }
        }

        let key = self.solids.insert(SolidData {
            faces: face_keys.to_vec(),
        });

        for &fk in face_keys {
            self.link_face_solid(fk, key);
        }

        Ok(key)
    }

    /// Returns an existing edge joining `a` and `b` whose curve matches `curve`
    /// in either direction.
    pub fn find_edge(&self, a: VertexKey, b: VertexKey, curve: &Curve) -> Option<EdgeKey> {
        let candidates = self.vertex_to_edges.get(&a)?;
        let tol = &self.tolerance;
        let mid = curve.point_at(0.5);

        let mut found: Vec<EdgeKey> = candidates
            .iter()
            .copied()
            .filter(|&ek| {
                let edge = &self.edges[ek];
                let joins = (edge.start == a && edge.end == b) || (edge.start == b && edge.end == a);
                joins
                    && edge.curve.kind() == curve.kind()
                    && tol.points_coincide(&edge.curve.point_at(0.5), &mid)
            })
            .collect();
        found.sort();
        found.first().copied()
    }

    /// Builds a face from a closed chain of curves, welding vertices and
    /// reusing edges already in the arena so neighbouring faces share them.
    pub fn make_face_from_curves(&mut self, curves: &[Curve]) -> Result<FaceKey> {
        if curves.is_empty() {
            return Err(Error::EmptyLoop);
        }

        let mut edges = Vec::with_capacity(curves.len());
        for curve in curves {
            let a = self.find_or_add_point(curve.start_point());
            let b = self.find_or_add_point(curve.end_point());
            let edge = match self.find_edge(a, b, curve) {
                Some(existing) => existing,
                None => self.add_edge(a, b, curve.clone())?,
            };
            edges.push(edge);
        }

        let lp = self.add_loop(&edges)?;
        self.add_face(lp)
    }

    /// Builds a planar polygon face through `points` (closing edge implicit).
    pub fn make_polygon_face(&mut self, points: &[Point3<f64>]) -> Result<FaceKey> {
        let n = points.len();
        let curves: Vec<Curve> = (0..n)
            .map(|i| Curve::line(points[i], points[(i + 1) % n]))
            .collect();
        self.make_face_from_curves(&curves)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ifc_cut_geometry::Vector3;

    fn square(arena: &mut BrepArena) -> FaceKey {
        arena
            .make_polygon_face(&[
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ])
            .unwrap()
    }

    #[test]
    fn polygon_face_creates_shared_structure() {
        let mut arena = BrepArena::new();
        let face = square(&mut arena);

        assert_eq!(arena.vertex_count(), 4);
        assert_eq!(arena.edge_count(), 4);
        assert_eq!(arena.loop_count(), 1);
        assert!(arena.face(face).unwrap().outer.is_some());
    }

    #[test]
    fn neighbouring_faces_share_an_edge() {
        let mut arena = BrepArena::new();
        square(&mut arena);
        arena
            .make_polygon_face(&[
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 1.0),
                Point3::new(1.0, 1.0, 1.0),
                Point3::new(1.0, 1.0, 0.0),
            ])
            .unwrap();

        assert_eq!(arena.vertex_count(), 6);
        assert_eq!(arena.edge_count(), 7);
    }

    #[test]
    fn loop_orientation_inferred_from_neighbours() {
        let mut arena = BrepArena::new();
        let v0 = arena.add_vertex(0.0, 0.0, 0.0);
        let v1 = arena.add_vertex(1.0, 0.0, 0.0);
        let v2 = arena.add_vertex(0.0, 1.0, 0.0);
        let e0 = arena.add_line_edge(v0, v1).unwrap();
        let e1 = arena.add_line_edge(v2, v1).unwrap();
        let e2 = arena.add_line_edge(v2, v0).unwrap();

        let lp = arena.add_loop(&[e0, e1, e2]).unwrap();
        assert_eq!(arena.loop_data(lp).unwrap().orientations, vec![true, false, true]);
    }

    #[test]
    fn disconnected_loop_is_rejected() {
        let mut arena = BrepArena::new();
        let v: Vec<_> = (0..4).map(|i| arena.add_vertex(i as f64, 0.0, 0.0)).collect();
        let e0 = arena.add_line_edge(v[0], v[1]).unwrap();
        let e1 = arena.add_line_edge(v[2], v[3]).unwrap();

        assert!(matches!(arena.add_loop(&[e0, e1]), Err(Error::DisconnectedLoop(0, 1))));
    }

    #[test]
    fn open_loop_cannot_bound_a_face() {
        let mut arena = BrepArena::new();
        let v0 = arena.add_vertex(0.0, 0.0, 0.0);
        let v1 = arena.add_vertex(1.0, 0.0, 0.0);
        let v2 = arena.add_vertex(1.0, 1.0, 0.0);
        let e0 = arena.add_line_edge(v0, v1).unwrap();
        let e1 = arena.add_line_edge(v1, v2).unwrap();
        let lp = arena.add_loop(&[e0, e1]).unwrap();

        assert!(matches!(arena.add_face(lp), Err(Error::OpenLoop(_))));
    }

    #[test]
    fn mismatched_curve_is_rejected() {
        let mut arena = BrepArena::new();
        let v0 = arena.add_vertex(0.0, 0.0, 0.0);
        let v1 = arena.add_vertex(1.0, 0.0, 0.0);
        let curve = Curve::line(Point3::origin(), Point3::from(Vector3::new(2.0, 0.0, 0.0)));

        assert!(matches!(
            arena.add_edge(v0, v1, curve),
            Err(Error::CurveEndpointMismatch { .. })
        ));
    }
}
