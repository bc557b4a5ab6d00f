// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # IFC Cut Topology
//!
//! Boundary-representation topology for the cut engine.
//!
//! Vertices, edges, loops, faces and solids live in slot maps inside a
//! [`BrepArena`]. Edges carry their curve and are shared by key between the
//! faces they bound; upward adjacency indices answer "which faces meet at
//! this edge". On top of the arena sit the face boundary extractor used on
//! export and the loop and shell builders used on import.

pub mod arena;
pub mod boundary;
pub mod construction;
pub mod error;
pub mod geometry;
pub mod import;
pub mod keys;
pub mod loop_builder;
pub mod traversal;

pub use arena::{BrepArena, EdgeData, FaceData, LoopData, SolidData};
pub use boundary::{BoundaryKind, BoundaryOptions, FaceBoundary, FaceBoundaryExtractor};
pub use error::{Error, Result};
pub use geometry::FaceSurface;
pub use import::{env_or, BoundLoop, FaceStatus, ImportConfig, ShellBuild, ShellBuilder};
pub use keys::{EdgeKey, FaceKey, LoopKey, SolidKey, VertexKey};
pub use loop_builder::{LoopBuild, LoopBuilder, LoopStatus};
