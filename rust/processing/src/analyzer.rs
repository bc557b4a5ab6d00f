// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Grouping of cut faces by element and by connectivity.

use std::collections::{BTreeMap, VecDeque};

use ifc_cut_topology::{BrepArena, FaceKey};
use rustc_hash::FxHashSet;
use tracing::debug;

use crate::attribution::{CutAttribution, ElementId};
use crate::error::{Outcome, UnsupportedReason, UnsupportedTopology};

/// Connected faces of one cutting element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaceCollection {
    pub element: ElementId,
    /// Faces in key order.
    pub faces: Vec<FaceKey>,
}

/// All cut faces of one element, split into connected collections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CuttingElementFaceGroup {
    pub element: ElementId,
    pub collections: Vec<FaceCollection>,
}

/// Partitions attributed cut faces into per-element connected components.
#[derive(Debug, Clone, Copy)]
pub struct CutTopologyAnalyzer<'a> {
    arena: &'a BrepArena,
}

impl<'a> CutTopologyAnalyzer<'a> {
    pub fn new(arena: &'a BrepArena) -> Self {
        Self { arena }
    }

    /// One result per element, in element order.
    ///
    /// An element fails as a whole when any of its faces has holes.
    pub fn analyze(&self, attribution: &CutAttribution) -> Vec<Outcome<CuttingElementFaceGroup>> {
        let mut by_element: BTreeMap<ElementId, Vec<FaceKey>> = BTreeMap::new();
        for (face, elements) in attribution.cut_faces() {
            for &element in elements {
                by_element.entry(element).or_default().push(face);
            }
        }

        by_element
            .into_iter()
            .map(|(element, faces)| self.group(element, faces))
            .collect()
    }

    fn group(&self, element: ElementId, faces: Vec<FaceKey>) -> Outcome<CuttingElementFaceGroup> {
        let mut members = Vec::with_capacity(faces.len());
        for face in faces {
            let Some(data) = self.arena.face(face) else {
                return Err(UnsupportedTopology::new(UnsupportedReason::MissingFaceGeometry)
                    .for_element(element));
            };
            match data.loop_count() {
                0 => debug!(element = %element, ?face, "face without boundary skipped"),
                1 => members.push(face),
                _ => {
                    return Err(UnsupportedTopology::new(UnsupportedReason::MultipleBoundaryLoops)
                        .for_element(element))
                }
            }
        }

        let collections = connected_components(self.arena, &members)
            .into_iter()
            .map(|faces| FaceCollection { element, faces })
            .collect::<Vec<_>>();
        debug!(element = %element, collections = collections.len(), "cut faces grouped");

        Ok(CuttingElementFaceGroup {
            element,
            collections,
        })
    }
}

/// Flood fill over shared edges, restricted to `faces`.
pub(crate) fn connected_components(arena: &BrepArena, faces: &[FaceKey]) -> Vec<Vec<FaceKey>> {
    let members: FxHashSet<FaceKey> = faces.iter().copied().collect();
    let mut seeds: Vec<FaceKey> = members.iter().copied().collect();
    seeds.sort();

    let mut visited = FxHashSet::default();
    let mut components = Vec::new();
    for seed in seeds {
        if !visited.insert(seed) {
            continue;
        }

        let mut component = vec![seed];
        let mut queue = VecDeque::from([seed]);
        while let Some(face) = queue.pop_front() {
            for neighbour in arena.adjacent_faces(face) {
                if members.contains(&neighbour) && visited.insert(neighbour) {
                    component.push(neighbour);
                    queue.push_back(neighbour);
                }
            }
        }
        component.sort();
        components.push(component);
    }
    components
}
