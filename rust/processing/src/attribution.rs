// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Which element generated which face of a base extrusion.

use ifc_cut_topology::FaceKey;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Identifier of a building element (typically its STEP instance id).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(pub u64);

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Relation of a face to the base extrusion's lateral surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FaceAlignment {
    /// Lies on the extrusion's own lateral surface.
    Lateral,
    /// Generated by one or more cutting elements.
    Cut,
}

#[derive(Debug, Clone)]
struct FaceEntry {
    alignment: FaceAlignment,
    elements: SmallVec<[ElementId; 2]>,
}

/// Precomputed face to cutting-element map for one base extrusion.
#[derive(Debug, Clone, Default)]
pub struct CutAttribution {
    entries: FxHashMap<FaceKey, FaceEntry>,
}

impl CutAttribution {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `face` as part of the extrusion's lateral surface.
    pub fn mark_lateral(&mut self, face: FaceKey) -> &mut Self {
        self.entries.insert(
            face,
            FaceEntry {
                alignment: FaceAlignment::Lateral,
                elements: SmallVec::new(),
            },
        );
        self
    }

    /// Records that `element` generated `face`. A face may have several.
    pub fn attribute(&mut self, face: FaceKey, element: ElementId) -> &mut Self {
        let entry = self.entries.entry(face).or_insert_with(|| FaceEntry {
            alignment: FaceAlignment::Cut,
            elements: SmallVec::new(),
        });
        entry.alignment = FaceAlignment::Cut;
        if !entry.elements.contains(&element) {
            entry.elements.push(element);
        }
        self
    }

    pub fn alignment(&self, face: FaceKey) -> Option<FaceAlignment> {
        self.entries.get(&face).map(|e| e.alignment)
    }

    pub fn elements(&self, face: FaceKey) -> &[ElementId] {
        self.entries
            .get(&face)
            .map(|e| e.elements.as_slice())
            .unwrap_or(&[])
    }

    /// Non-lateral faces with their elements, in face key order.
    pub fn cut_faces(&self) -> Vec<(FaceKey, &[ElementId])> {
        let mut faces: Vec<_> = self
            .entries
            .iter()
            .filter(|(_, e)| e.alignment == FaceAlignment::Cut)
            .map(|(&face, e)| (face, e.elements.as_slice()))
            .collect();
        faces.sort_by_key(|(face, _)| *face);
        faces
    }
}
