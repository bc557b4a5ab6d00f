// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-extrusion cut pipeline.
//!
//! Runs the analyzer over the attributed faces, classifies every collection
//! and threads the body through the clip and opening synthesizers in element
//! order. Unsupported cuts are reported and skipped; an unsupported cut on
//! the extrusion's own ends drops every clip and keeps the unclipped body.

use ifc_cut_topology::BrepArena;
use serde::{Deserialize, Serialize};

use crate::analyzer::CutTopologyAnalyzer;
use crate::attribution::{CutAttribution, ElementId};
use crate::body::{BodyRepresentation, BodyState, ExtrudedSolid};
use crate::classifier::{Classification, ClipFace, CutClassifier};
use crate::clipping::{ClipStep, ClippingSynthesizer};
use crate::config::CutConfig;
use crate::error::UnsupportedTopology;
use crate::extrusion::{BaseExtrusion, ExtrusionRange};
use crate::opening::{OpeningKind, OpeningSynthesizer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppliedKind {
    ClipPlane,
    EndClip,
    Recess,
    ThroughOpening,
}

/// A cut that changed the body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedCut {
    pub element: ElementId,
    pub kind: AppliedKind,
}

/// An opening found in the cut faces, for writers that emit openings as
/// separate entities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpeningRecord {
    pub element: ElementId,
    pub kind: OpeningKind,
    pub solid: ExtrudedSolid,
}

/// Outcome of processing one base extrusion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CutReport {
    pub state: BodyState,
    pub applied: Vec<AppliedCut>,
    pub openings: Vec<OpeningRecord>,
    pub diagnostics: Vec<UnsupportedTopology>,
    /// Clips were dropped because one of them could not be handled.
    pub fell_back: bool,
    /// Extrusion range left after clipping.
    pub range: ExtrusionRange,
}

impl CutReport {
    pub fn body(&self) -> Option<&BodyRepresentation> {
        self.state.body()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Running state threaded through the cuts of one extrusion.
struct Pass {
    body: BodyRepresentation,
    range: ExtrusionRange,
    applied: Vec<AppliedCut>,
}

#[derive(Debug, Clone, Default)]
pub struct CutProcessor {
    config: CutConfig,
}

impl CutProcessor {
    pub fn new(config: CutConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CutConfig {
        &self.config
    }

    pub fn process(&self, arena: &BrepArena, base: &BaseExtrusion, attribution: &CutAttribution) -> CutReport {
        let classifier = CutClassifier::new(arena, base, &self.config);
        let mut diagnostics = Vec::new();
        let mut classified = Vec::new();

        for group in CutTopologyAnalyzer::new(arena).analyze(attribution) {
            let group = match group {
                Ok(group) => group,
                Err(err) => {
                    diagnostics.push(err);
                    continue;
                }
            };
            for collection in &group.collections {
                match classifier.classify(collection) {
                    Ok(classification) => classified.push((group.element, classification)),
                    Err(err) => diagnostics.push(err),
                }
            }
        }

        for err in &diagnostics {
            tracing::warn!(
                element = ?err.element,
                code = err.code(),
                outer = err.affects_outer_boundary(),
                "Skipping cut: {}",
                err.reason
            );
        }
        let fell_back = diagnostics.iter().any(UnsupportedTopology::affects_outer_boundary);
        if fell_back {
            tracing::warn!("Falling back to unclipped body");
        }

        let clipping = ClippingSynthesizer::new(&self.config);
        let opening = OpeningSynthesizer::new(&self.config);
        let mut pass = Pass {
            body: base.to_body(),
            range: base.range(),
            applied: Vec::new(),
        };
        let mut openings = Vec::new();
        let mut fully_clipped = false;

        for (element, classification) in classified {
            match classification {
                Classification::Inert => {
                    tracing::debug!(element = %element, "Cut faces leave the body unchanged");
                }
                Classification::ClipPlane(face) if !fell_back => {
                    let bounded = self.config.bounded_half_spaces;
                    if !self.clip(&clipping, base, &mut pass, element, AppliedKind::ClipPlane, &[face], bounded) {
                        fully_clipped = true;
                        break;
                    }
                }
                Classification::EndClip { end, faces } if !fell_back => {
                    tracing::debug!(element = %element, ?end, faces = faces.len(), "End clip");
                    let bounded = faces.len() > 1 || self.config.bounded_half_spaces;
                    if !self.clip(&clipping, base, &mut pass, element, AppliedKind::EndClip, &faces, bounded) {
                        fully_clipped = true;
                        break;
                    }
                }
                Classification::ClipPlane(_) | Classification::EndClip { .. } => {
                    tracing::debug!(element = %element, "Clip dropped by fallback");
                }
                Classification::Opening(plan) => {
                    tracing::debug!(element = %element, kind = ?plan.kind, depth = plan.depth, "Opening");
                    if self.config.subtract_openings {
                        pass.body = opening.subtract(pass.body, &plan);
                        pass.applied.push(AppliedCut {
                            element,
                            kind: match plan.kind {
                                OpeningKind::Recess => AppliedKind::Recess,
                                OpeningKind::Through => AppliedKind::ThroughOpening,
                            },
                        });
                    }
                    openings.push(OpeningRecord {
                        element,
                        kind: plan.kind,
                        solid: plan.solid,
                    });
                }
            }
        }

        let state = if fully_clipped {
            tracing::debug!("Body fully clipped");
            BodyState::FullyClipped
        } else {
            BodyState::Solid(pass.body)
        };

        CutReport {
            state,
            applied: pass.applied,
            openings,
            diagnostics,
            fell_back,
            range: pass.range,
        }
    }

    /// Applies clip faces in order. Returns `false` once nothing is left.
    #[allow(clippy::too_many_arguments)]
    fn clip(
        &self,
        clipping: &ClippingSynthesizer,
        base: &BaseExtrusion,
        pass: &mut Pass,
        element: ElementId,
        kind: AppliedKind,
        faces: &[ClipFace],
        bounded: bool,
    ) -> bool {
        let mut changed = false;
        for face in faces {
            let body = std::mem::replace(&mut pass.body, base.to_body());
            match clipping.apply(body, base, pass.range, face, bounded) {
                ClipStep::Unchanged(body) => pass.body = body,
                ClipStep::Clipped { body, range } => {
                    pass.body = body;
                    pass.range = range;
                    changed = true;
                }
                ClipStep::FullyClipped => {
                    tracing::debug!(element = %element, face = ?face.face, "Clip removes the remaining body");
                    return false;
                }
            }
        }
        if changed {
            tracing::debug!(
                element = %element,
                start = pass.range.start(),
                end = pass.range.end(),
                "Clip applied"
            );
            pass.applied.push(AppliedCut { element, kind });
        }
        true
    }
}
