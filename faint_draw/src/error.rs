// Copyright 2025 the Faint Draw Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types for the drawing engine.

use thiserror::Error;

/// Errors that can occur while drawing.
///
/// Degenerate geometry is never an error. Only resource failures are
/// reported through this type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DrawError {
    /// An intermediate bitmap could not be allocated.
    #[error("failed to allocate a {width}x{height} bitmap")]
    Allocation {
        /// Requested width in pixels.
        width: u32,
        /// Requested height in pixels.
        height: u32,
    },

    /// A bitmap or surface was requested with dimensions that cannot be represented.
    #[error("invalid dimensions {width}x{height}")]
    InvalidDimensions {
        /// Requested width in pixels.
        width: u32,
        /// Requested height in pixels.
        height: u32,
    },

    /// The rendering backend reported a failure.
    #[error("backend error: {0}")]
    Backend(String),
}
