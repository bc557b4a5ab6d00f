// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Boundary loop reconstruction for imported faces.

use ifc_cut_geometry::Point3;
use serde::{Deserialize, Serialize};

/// Outcome of building one boundary loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoopStatus {
    Ok,
    /// Fewer than 3 distinct vertices remain.
    Degraded,
    /// The input could not be interpreted at all (non-finite coordinates).
    Aborted,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoopBuild {
    pub vertices: Vec<Point3<f64>>,
    pub status: LoopStatus,
}

impl LoopBuild {
    #[inline]
    pub fn is_ok(&self) -> bool {
        self.status == LoopStatus::Ok
    }
}

/// Cleans an imported vertex ring into a usable closed loop.
///
/// The closing vertex is dropped, consecutive near-duplicates are collapsed
/// and the result optionally reversed. The loop is implicitly closed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoopBuilder {
    pub tolerance: f64,
    pub reverse: bool,
}

impl LoopBuilder {
    pub fn new(tolerance: f64) -> Self {
        Self {
            tolerance,
            reverse: false,
        }
    }

    pub fn reversed(self, reverse: bool) -> Self {
        Self { reverse, ..self }
    }

    #[inline]
    fn coincide(&self, a: &Point3<f64>, b: &Point3<f64>) -> bool {
        (a - b).norm() <= self.tolerance
    }

    fn drop_closing(&self, vertices: &mut Vec<Point3<f64>>) {
        while vertices.len() > 1 && self.coincide(&vertices[0], &vertices[vertices.len() - 1]) {
            vertices.pop();
        }
    }

    pub fn build(&self, points: &[Point3<f64>]) -> LoopBuild {
        if points.iter().any(|p| !p.coords.iter().all(|c| c.is_finite())) {
            return LoopBuild {
                vertices: Vec::new(),
                status: LoopStatus::Aborted,
            };
        }

        let mut vertices = points.to_vec();
        self.drop_closing(&mut vertices);
        vertices.dedup_by(|b, a| (*a - *b).norm() <= self.tolerance);
        // collapsing may expose a new closing duplicate
        self.drop_closing(&mut vertices);

        if vertices.len() < 3 {
            return LoopBuild {
                vertices,
                status: LoopStatus::Degraded,
            };
        }

        if self.reverse {
            vertices.reverse();
        }
        LoopBuild {
            vertices,
            status: LoopStatus::Ok,
        }
    }
}
