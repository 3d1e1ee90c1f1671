// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error type shared by the positioning pipeline.

use alloc::string::String;
use core::fmt;

/// Which element a measurement was taken from.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ElementRole {
    /// The anchor element.
    Reference,
    /// The element being positioned.
    Floating,
    /// A boundary element used for overflow detection.
    Boundary,
    /// The arrow element inside the floating element.
    Arrow,
}

impl fmt::Display for ElementRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Reference => "reference",
            Self::Floating => "floating",
            Self::Boundary => "boundary",
            Self::Arrow => "arrow",
        })
    }
}

/// Errors produced while computing a position.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// An element did not produce a bounding box (detached, not rendered, or not drawable).
    #[error("{role} element is not a renderable node")]
    NotRenderable {
        /// The element that failed to measure.
        role: ElementRole,
    },
    /// A middleware aborted the pipeline.
    #[error("middleware `{name}` failed: {message}")]
    Middleware {
        /// Name of the failing middleware.
        name: String,
        /// Human-readable reason.
        message: String,
    },
    /// A placement string did not name one of the 12 placements.
    #[error("invalid placement `{0}`")]
    InvalidPlacement(String),
    /// The pipeline was reset more times than [`PositionOptions::max_resets`](crate::PositionOptions::max_resets) allows.
    #[error("positioning did not settle within {limit} resets")]
    ResetLimit {
        /// The configured limit.
        limit: u32,
    },
}

impl Error {
    /// Convenience constructor for middleware failures.
    pub fn middleware(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Middleware {
            name: name.into(),
            message: message.into(),
        }
    }
}
