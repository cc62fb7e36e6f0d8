// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Error types for the carving engine.
//!
//! Every error is terminal for the resize session that raised it: the
//! computation is deterministic, so retrying reproduces the failure.

use thiserror::Error;

/// Result type alias for carving operations.
pub type Result<T> = std::result::Result<T, CarveError>;

/// Errors that can occur while carving an image.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CarveError {
    /// A buffer with a zero dimension, or an operation that would
    /// produce one.
    #[error("invalid dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    /// The energy grid handed to the seam search held a NaN or an
    /// infinity.
    #[error("non-finite energy {value} at ({x}, {y})")]
    InvalidEnergy { x: u32, y: u32, value: f64 },

    /// A seam whose length doesn't match the buffer it's applied to,
    /// or whose steps aren't connected.
    #[error("malformed seam: {0}")]
    MalformedSeam(String),

    /// A mask that no longer lines up with the image it belongs to.
    #[error("{what} is {found:?}, expected {expected:?}")]
    DimensionMismatch {
        what: &'static str,
        expected: (u32, u32),
        found: (u32, u32),
    },

    /// The session was cancelled between two iterations.
    #[error("resize cancelled after {iterations} iterations")]
    Cancelled { iterations: usize },

    /// A target size the resize policy cannot honour.
    #[error("invalid target: {0}")]
    InvalidTarget(String),
}

impl CarveError {
    pub(crate) fn dimensions((width, height): (u32, u32)) -> Self {
        CarveError::InvalidDimensions { width, height }
    }
}

/// Fail fast on a zero-sized buffer.
pub(crate) fn ensure_nonempty(dimensions: (u32, u32)) -> Result<()> {
    if dimensions.0 == 0 || dimensions.1 == 0 {
        return Err(CarveError::dimensions(dimensions));
    }
    Ok(())
}
