// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Cut processing configuration.

use ifc_cut_geometry::{TessellationParams, Tolerance};
use ifc_cut_topology::env_or;
use serde::{Deserialize, Serialize};

/// Settings for one cut processing run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CutConfig {
    pub tolerance: Tolerance,
    pub tessellation: TessellationParams,
    /// Face boundaries are reduced to straight segments.
    pub polygonal_boundaries: bool,
    /// Single clip planes are bounded by their face polygon.
    pub bounded_half_spaces: bool,
    /// Openings are subtracted from the body; otherwise only reported.
    pub subtract_openings: bool,
}

impl Default for CutConfig {
    fn default() -> Self {
        Self {
            tolerance: Tolerance::default(),
            tessellation: TessellationParams::default(),
            polygonal_boundaries: false,
            bounded_half_spaces: false,
            subtract_openings: true,
        }
    }
}

impl CutConfig {
    /// Load configuration from `IFC_CUT_*` environment variables.
    ///
    /// Unset or unparsable variables keep their default.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            tolerance: Tolerance {
                distance: env_or("IFC_CUT_DISTANCE_TOLERANCE", defaults.tolerance.distance),
                angular: env_or("IFC_CUT_ANGULAR_TOLERANCE", defaults.tolerance.angular),
                vertex: env_or("IFC_CUT_VERTEX_TOLERANCE", defaults.tolerance.vertex),
            },
            tessellation: TessellationParams {
                max_angle: env_or("IFC_CUT_MAX_SEGMENT_ANGLE", defaults.tessellation.max_angle),
                min_segments: env_or("IFC_CUT_MIN_SEGMENTS", defaults.tessellation.min_segments),
                max_segments: env_or("IFC_CUT_MAX_SEGMENTS", defaults.tessellation.max_segments),
            },
            polygonal_boundaries: env_or("IFC_CUT_POLYGONAL_BOUNDARIES", defaults.polygonal_boundaries),
            bounded_half_spaces: env_or("IFC_CUT_BOUNDED_HALF_SPACES", defaults.bounded_half_spaces),
            subtract_openings: env_or("IFC_CUT_SUBTRACT_OPENINGS", defaults.subtract_openings),
        }
    }
}
