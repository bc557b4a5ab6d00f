// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # IFC Cut Processing
//!
//! Turns the faces other elements cut into an extruded body into a
//! parametric body representation for export.
//!
//! ## Pipeline
//!
//! 1. [`CutTopologyAnalyzer`] groups the attributed faces per cutting element
//!    into connected [`FaceCollection`]s.
//! 2. [`CutClassifier`] decides for each collection: inert, clip plane, end
//!    clip, or opening.
//! 3. [`ClippingSynthesizer`] subtracts half-spaces and narrows the remaining
//!    [`ExtrusionRange`]; [`OpeningSynthesizer`] subtracts extruded openings.
//!
//! [`CutProcessor`] runs all three for one [`BaseExtrusion`] and returns a
//! [`CutReport`].
//!
//! ## Example
//!
//! ```rust,ignore
//! use ifc_cut_processing::{CutAttribution, CutConfig, CutProcessor};
//!
//! let report = CutProcessor::new(CutConfig::from_env()).process(&arena, &base, &attribution);
//! match report.body() {
//!     Some(body) => write_body(body),
//!     None => skip_element(),
//! }
//! ```

pub mod analyzer;
pub mod attribution;
pub mod body;
pub mod classifier;
pub mod clipping;
pub mod config;
pub mod congruence;
pub mod error;
pub mod extrusion;
pub mod groups;
pub mod opening;
pub mod processor;

pub use analyzer::{CutTopologyAnalyzer, CuttingElementFaceGroup, FaceCollection};
pub use attribution::{CutAttribution, ElementId, FaceAlignment};
pub use body::{BodyRepresentation, BodyState, BoundedHalfSpace, CutOperand, ExtrudedSolid, HalfSpace};
pub use classifier::{Classification, ClipFace, CutClassifier, CutFace, ExtrusionEnd};
pub use clipping::{ClipStep, ClippingSynthesizer};
pub use config::CutConfig;
pub use congruence::curves_congruent;
pub use error::{Error, Outcome, Result, UnsupportedReason, UnsupportedTopology};
pub use extrusion::{BaseExtrusion, ExtrusionRange};
pub use groups::{chain_free_edges, free_edges, sew_fragments, BoundaryGroup};
pub use opening::{OpeningKind, OpeningPlan, OpeningSynthesizer};
pub use processor::{AppliedCut, AppliedKind, CutProcessor, CutReport, OpeningRecord};
