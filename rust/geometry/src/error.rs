// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for geometry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building geometric primitives
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Degenerate plane: {0}")]
    DegeneratePlane(String),

    #[error("Curve loop is not closed: gap of {gap:.3e} after curve {index}")]
    OpenLoop { index: usize, gap: f64 },

    #[error("Invalid curve: {0}")]
    InvalidCurve(String),

    #[error("Invalid spline: {0}")]
    InvalidSpline(String),
}
