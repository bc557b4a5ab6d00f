// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for cut processing.

use ifc_cut_geometry::CurveKind;
use serde::{Deserialize, Serialize};

use crate::attribution::ElementId;

/// Result type alias for processing operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Result of a per-cut step that may hit unsupported topology.
pub type Outcome<T> = std::result::Result<T, UnsupportedTopology>;

/// Why a cut could not be handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum UnsupportedReason {
    #[error("cut face has more than one boundary loop")]
    MultipleBoundaryLoops,

    #[error("cut faces are not planar")]
    NonPlanarCollection,

    #[error("clip planes disagree on which side to remove")]
    ClipOrientationConflict,

    #[error("cut touches both ends of the extrusion")]
    BothEndsClipped,

    #[error("end clip has no face inclined to the extrusion")]
    NoClippingFace,

    #[error("cut faces leave no free boundary to take a profile from")]
    NoProfileGroups,

    #[error("{count} boundary groups, expected at most 3")]
    TooManyProfileGroups { count: usize },

    #[error("more than one pair of boundary groups is parallel")]
    AmbiguousParallelGroups,

    #[error("no face parallel to the recess profile")]
    NoParallelOppositeFace,

    #[error("opening profile is not closed")]
    ProfileNotClosed,

    #[error("opening profile is not planar")]
    ProfileNotPlanar,

    #[error("opening profiles are not parallel")]
    ProfilesNotParallel,

    #[error("opening profile is not orthogonal to the extrusion direction")]
    ProfileAlongExtrusion,

    #[error("opening profiles are not at a constant distance")]
    InconsistentOffset,

    #[error("side face does not join the two profiles with one edge each")]
    UnmatchedSideFace,

    #[error("curve kinds differ: {first} vs {second}")]
    CurveKindMismatch { first: CurveKind, second: CurveKind },

    #[error("{kind} profiles are not congruent")]
    CurveMismatch { kind: CurveKind },

    #[error("opening direction is not normal to its profile")]
    DirectionNotNormal,

    #[error("cut face geometry is missing or invalid")]
    MissingFaceGeometry,
}

impl UnsupportedReason {
    /// Stable reason code for diagnostics.
    pub fn code(&self) -> &'static str {
        match self {
            UnsupportedReason::MultipleBoundaryLoops => "multiple_boundary_loops",
            UnsupportedReason::NonPlanarCollection => "non_planar_collection",
            UnsupportedReason::ClipOrientationConflict => "clip_orientation_conflict",
            UnsupportedReason::BothEndsClipped => "both_ends_clipped",
            UnsupportedReason::NoClippingFace => "no_clipping_face",
            UnsupportedReason::NoProfileGroups => "no_profile_groups",
            UnsupportedReason::TooManyProfileGroups { .. } => "too_many_profile_groups",
            UnsupportedReason::AmbiguousParallelGroups => "ambiguous_parallel_groups",
            UnsupportedReason::NoParallelOppositeFace => "no_parallel_opposite_face",
            UnsupportedReason::ProfileNotClosed => "profile_not_closed",
            UnsupportedReason::ProfileNotPlanar => "profile_not_planar",
            UnsupportedReason::ProfilesNotParallel => "profiles_not_parallel",
            UnsupportedReason::ProfileAlongExtrusion => "profile_along_extrusion",
            UnsupportedReason::InconsistentOffset => "inconsistent_offset",
            UnsupportedReason::UnmatchedSideFace => "unmatched_side_face",
            UnsupportedReason::CurveKindMismatch { .. } => "curve_kind_mismatch",
            UnsupportedReason::CurveMismatch { .. } => "curve_mismatch",
            UnsupportedReason::DirectionNotNormal => "direction_not_normal",
            UnsupportedReason::MissingFaceGeometry => "missing_face_geometry",
        }
    }

    /// Failures on the extrusion's own ends; the element falls back to an
    /// unclipped body instead of skipping just this cut.
    pub fn affects_outer_boundary(&self) -> bool {
        matches!(
            self,
            UnsupportedReason::ClipOrientationConflict
                | UnsupportedReason::BothEndsClipped
                | UnsupportedReason::NoClippingFace
        )
    }
}

fn element_label(element: &Option<ElementId>) -> String {
    match element {
        Some(id) => format!(" in {id}"),
        None => String::new(),
    }
}

/// A cut that cannot be represented, with the element that caused it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("unsupported topology{}: {reason}", element_label(.element))]
pub struct UnsupportedTopology {
    pub element: Option<ElementId>,
    pub reason: UnsupportedReason,
}

impl UnsupportedTopology {
    pub fn new(reason: UnsupportedReason) -> Self {
        Self {
            element: None,
            reason,
        }
    }

    /// Attributes the failure to `element` unless already attributed.
    pub fn for_element(mut self, element: ElementId) -> Self {
        self.element.get_or_insert(element);
        self
    }

    #[inline]
    pub fn code(&self) -> &'static str {
        self.reason.code()
    }

    #[inline]
    pub fn affects_outer_boundary(&self) -> bool {
        self.reason.affects_outer_boundary()
    }
}

impl From<UnsupportedReason> for UnsupportedTopology {
    fn from(reason: UnsupportedReason) -> Self {
        Self::new(reason)
    }
}

/// Errors that can occur while setting up cut processing.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid extrusion range [{start}, {end}]")]
    InvalidRange { start: f64, end: f64 },

    #[error("invalid extrusion: {0}")]
    InvalidExtrusion(String),

    #[error(transparent)]
    Unsupported(#[from] UnsupportedTopology),

    #[error(transparent)]
    Topology(#[from] ifc_cut_topology::Error),

    #[error(transparent)]
    Geometry(#[from] ifc_cut_geometry::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_names_element() {
        let err = UnsupportedTopology::new(UnsupportedReason::BothEndsClipped).for_element(ElementId(17));
        assert_eq!(err.to_string(), "unsupported topology in #17: cut touches both ends of the extrusion");
        assert_eq!(err.code(), "both_ends_clipped");
        assert!(err.affects_outer_boundary());
    }

    #[test]
    fn first_attribution_wins() {
        let err = UnsupportedTopology::new(UnsupportedReason::ProfileNotPlanar)
            .for_element(ElementId(1))
            .for_element(ElementId(2));
        assert_eq!(err.element, Some(ElementId(1)));
        assert!(!err.affects_outer_boundary());
    }

    #[test]
    fn reason_serializes_with_code_tag() {
        let reason = UnsupportedReason::TooManyProfileGroups { count: 5 };
        let json = serde_json::to_value(reason).unwrap();
        assert_eq!(json["code"], "too_many_profile_groups");
        assert_eq!(json["count"], 5);
    }

    #[test]
    fn empty_boundary_has_its_own_code() {
        let json = serde_json::to_value(UnsupportedReason::NoProfileGroups).unwrap();
        assert_eq!(json["code"], "no_profile_groups");
        assert_eq!(UnsupportedTopology::new(UnsupportedReason::NoProfileGroups).code(), "no_profile_groups");
    }
}
