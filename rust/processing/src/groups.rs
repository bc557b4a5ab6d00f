// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Boundary groups of a face collection.
//!
//! Free edges (used by exactly one face of the collection) outline where the
//! cut meets the host solid. Chained together they form the profile groups
//! the opening synthesizer works with.

use std::collections::VecDeque;

use ifc_cut_geometry::{Curve, Point3, Tolerance, Vector3};
use ifc_cut_topology::{BrepArena, EdgeKey, FaceKey, VertexKey};
use rustc_hash::FxHashMap;

/// A chain of free edges with their curves oriented along the chain.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryGroup {
    pub edges: Vec<EdgeKey>,
    pub curves: Vec<Curve>,
    pub closed: bool,
}

impl BoundaryGroup {
    pub fn start_point(&self) -> Option<Point3<f64>> {
        self.curves.first().map(Curve::start_point)
    }

    pub fn end_point(&self) -> Option<Point3<f64>> {
        self.curves.last().map(Curve::end_point)
    }

    /// Curves traversed backwards.
    pub fn reversed(&self) -> Self {
        Self {
            edges: self.edges.iter().rev().copied().collect(),
            curves: self.curves.iter().rev().map(Curve::reversed).collect(),
            closed: self.closed,
        }
    }
}

/// Edges bounding exactly one face of `faces`, in key order.
pub fn free_edges(arena: &BrepArena, faces: &[FaceKey]) -> Vec<EdgeKey> {
    let mut uses: FxHashMap<EdgeKey, usize> = FxHashMap::default();
    for &face in faces {
        if let Some(edges) = arena.face_edges(face) {
            for edge in edges {
                *uses.entry(edge).or_insert(0) += 1;
            }
        }
    }

    let mut free: Vec<EdgeKey> = uses
        .into_iter()
        .filter(|&(_, count)| count == 1)
        .map(|(edge, _)| edge)
        .collect();
    free.sort();
    free
}

/// Chains the free edges of `faces` into groups, translating curves by `offset`.
///
/// Edges are joined through shared vertices regardless of direction; each
/// curve is reversed as needed to follow its chain.
pub fn chain_free_edges(
    arena: &BrepArena,
    faces: &[FaceKey],
    offset: Option<&Vector3<f64>>,
) -> Vec<BoundaryGroup> {
    let free = free_edges(arena, faces);

    let mut incident: FxHashMap<VertexKey, Vec<EdgeKey>> = FxHashMap::default();
    for &edge in &free {
        if let Some((start, end)) = arena.edge_vertices(edge) {
            incident.entry(start).or_default().push(edge);
            incident.entry(end).or_default().push(edge);
        }
    }

    let mut used: FxHashMap<EdgeKey, bool> = free.iter().map(|&e| (e, false)).collect();
    let mut groups = Vec::new();

    for &seed in &free {
        if used.get(&seed).copied().unwrap_or(true) {
            continue;
        }
        let Some((first, mut head)) = arena.edge_vertices(seed) else {
            continue;
        };
        used.insert(seed, true);

        // (edge, forward) in chain order
        let mut chain: VecDeque<(EdgeKey, bool)> = VecDeque::from([(seed, true)]);
        let mut tail = first;

        // extend forward from the seed's end
        while head != tail {
            let Some((edge, forward, next)) = next_edge(arena, &incident, &used, head) else {
                break;
            };
            used.insert(edge, true);
            chain.push_back((edge, forward));
            head = next;
        }

        // then backwards from the seed's start when the chain stayed open
        if head != tail {
            while let Some((edge, forward, next)) = next_edge(arena, &incident, &used, tail) {
                used.insert(edge, true);
                // walking away from the chain start means the chain uses it reversed
                chain.push_front((edge, !forward));
                tail = next;
                if tail == head {
                    break;
                }
            }
        }

        let closed = head == tail;
        let mut group = BoundaryGroup {
            edges: Vec::with_capacity(chain.len()),
            curves: Vec::with_capacity(chain.len()),
            closed,
        };
        for (edge, forward) in chain {
            let Some(curve) = arena.edge_curve(edge) else {
                continue;
            };
            let curve = if forward { curve.clone() } else { curve.reversed() };
            let curve = match offset {
                Some(v) => curve.translated(v),
                None => curve,
            };
            group.edges.push(edge);
            group.curves.push(curve);
        }
        groups.push(group);
    }
    groups
}

/// Next unused free edge leaving `vertex`: `(edge, forward, far vertex)`.
fn next_edge(
    arena: &BrepArena,
    incident: &FxHashMap<VertexKey, Vec<EdgeKey>>,
    used: &FxHashMap<EdgeKey, bool>,
    vertex: VertexKey,
) -> Option<(EdgeKey, bool, VertexKey)> {
    incident
        .get(&vertex)?
        .iter()
        .copied()
        .filter(|e| !used.get(e).copied().unwrap_or(true))
        .find_map(|edge| {
            let (start, end) = arena.edge_vertices(edge)?;
            if start == vertex {
                Some((edge, true, end))
            } else {
                Some((edge, false, start))
            }
        })
}

/// Threads fragments into one closed chain by nearest-endpoint matching.
///
/// Gaps wider than the distance tolerance are bridged with straight segments,
/// including the closing gap.
pub fn sew_fragments(fragments: Vec<BoundaryGroup>, tol: &Tolerance) -> BoundaryGroup {
    let mut remaining: Vec<BoundaryGroup> = fragments.into_iter().filter(|f| !f.curves.is_empty()).collect();
    let mut sewn = BoundaryGroup {
        edges: Vec::new(),
        curves: Vec::new(),
        closed: true,
    };
    if remaining.is_empty() {
        return sewn;
    }

    let first = remaining.remove(0);
    sewn.edges.extend(first.edges);
    sewn.curves.extend(first.curves);

    while !remaining.is_empty() {
        let Some(cursor) = sewn.end_point() else {
            break;
        };

        let mut best: Option<(usize, bool, f64)> = None;
        for (i, fragment) in remaining.iter().enumerate() {
            let (Some(s), Some(e)) = (fragment.start_point(), fragment.end_point()) else {
                continue;
            };
            for (reverse, d) in [(false, (s - cursor).norm()), (true, (e - cursor).norm())] {
                if best.map_or(true, |(_, _, b)| d < b) {
                    best = Some((i, reverse, d));
                }
            }
        }
        let Some((index, reverse, gap)) = best else {
            break;
        };

        let fragment = remaining.remove(index);
        let fragment = if reverse { fragment.reversed() } else { fragment };
        if gap > tol.distance {
            if let Some(start) = fragment.start_point() {
                sewn.curves.push(Curve::line(cursor, start));
            }
        }
        sewn.edges.extend(fragment.edges);
        sewn.curves.extend(fragment.curves);
    }

    if let (Some(start), Some(end)) = (sewn.start_point(), sewn.end_point()) {
        if (start - end).norm() > tol.distance {
            sewn.curves.push(Curve::line(end, start));
        }
    }
    sewn
}
