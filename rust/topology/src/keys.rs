// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Topology key types for arena-based storage.
//!
//! Keys are created by `slotmap::SlotMap` and stay valid while other entities
//! are removed (generational indices). Faces refer to loops and loops refer to
//! edges by key, so an edge shared by two faces is stored once.

use slotmap::new_key_type;

new_key_type! {
    /// Key for a vertex (point in 3D space).
    pub struct VertexKey;

    /// Key for an edge (curve segment between two vertices).
    pub struct EdgeKey;

    /// Key for a loop (closed, oriented chain of edges).
    pub struct LoopKey;

    /// Key for a face (region bounded by one outer loop and optional holes).
    pub struct FaceKey;

    /// Key for a solid (set of faces bounding a volume).
    pub struct SolidKey;
}
