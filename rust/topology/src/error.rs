// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for topology operations.

use crate::keys::{EdgeKey, FaceKey, LoopKey, SolidKey, VertexKey};

/// Result type alias for topology operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during topology operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("vertex not found: {0:?}")]
    VertexNotFound(VertexKey),

    #[error("edge not found: {0:?}")]
    EdgeNotFound(EdgeKey),

    #[error("loop not found: {0:?}")]
    LoopNotFound(LoopKey),

    #[error("face not found: {0:?}")]
    FaceNotFound(FaceKey),

    #[error("solid not found: {0:?}")]
    SolidNotFound(SolidKey),

    /// Edges in a loop are not connected end-to-end.
    #[error("loop edges are not connected: edge {0} endpoint does not match edge {1} startpoint")]
    DisconnectedLoop(usize, usize),

    /// A loop must have at least one edge.
    #[error("loop must have at least one edge")]
    EmptyLoop,

    /// The last edge of a face boundary does not return to the first vertex.
    #[error("loop {0:?} is not closed")]
    OpenLoop(LoopKey),

    /// An edge curve does not start and end at its vertices.
    #[error("edge curve endpoints are {gap:.3e} away from its vertices")]
    CurveEndpointMismatch { gap: f64 },

    /// An imported outer boundary has fewer than 3 distinct vertices.
    #[error("degenerate boundary: {0}")]
    DegenerateBoundary(String),

    #[error(transparent)]
    Geometry(#[from] ifc_cut_geometry::Error),
}
