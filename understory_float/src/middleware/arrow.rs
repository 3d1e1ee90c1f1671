// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::fmt;

use kurbo::Size;

use super::{Middleware, MiddlewareResult, MiddlewareState};
use crate::error::{ElementRole, Error};
use crate::geometry::{Padding, clamp};
use crate::placement::Axis;
use crate::platform::{Measure, dimensions};

/// The arrow to position: a live element or a known size.
#[derive(Copy, Clone)]
pub enum ArrowElement<'a> {
    /// Measured on every run.
    Element(&'a dyn Measure),
    /// A fixed size supplied by the caller.
    Size(Size),
}

impl fmt::Debug for ArrowElement<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Element(_) => f.write_str("Element(..)"),
            Self::Size(s) => f.debug_tuple("Size").field(s).finish(),
        }
    }
}

impl From<Size> for ArrowElement<'_> {
    fn from(size: Size) -> Self {
        Self::Size(size)
    }
}

impl<'a> From<&'a dyn Measure> for ArrowElement<'a> {
    fn from(element: &'a dyn Measure) -> Self {
        Self::Element(element)
    }
}

/// Positions an arrow inside the floating element so it points at the
/// center of the reference.
///
/// The arrow offset runs along the placement's alignment axis and is kept
/// `padding` away from the floating element's edges. The floating element
/// itself never moves.
#[derive(Copy, Clone, Debug)]
pub struct Arrow<'a> {
    /// The arrow.
    pub element: ArrowElement<'a>,
    /// Minimum distance from the floating element's edges.
    pub padding: Padding,
}

impl<'a> Arrow<'a> {
    /// An arrow middleware for `element`, without padding.
    pub fn new(element: impl Into<ArrowElement<'a>>) -> Self {
        Self {
            element: element.into(),
            padding: Padding::ZERO,
        }
    }

    /// Keep the arrow `padding` away from the edges.
    #[must_use]
    pub fn padding(mut self, padding: impl Into<Padding>) -> Self {
        self.padding = padding.into();
        self
    }
}

/// Data recorded by [`Arrow`].
///
/// Only the coordinate on the alignment axis is set.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct ArrowData {
    /// Offset from the floating element's left edge, for top/bottom placements.
    pub x: Option<f64>,
    /// Offset from the floating element's top edge, for left/right placements.
    pub y: Option<f64>,
    /// Distance between where the arrow would point at the reference center
    /// and where it was clamped to. Zero when the arrow points at the center.
    pub center_offset: f64,
}

impl Middleware for Arrow<'_> {
    fn name(&self) -> &str {
        "arrow"
    }

    fn compute(&self, state: &MiddlewareState<'_>) -> Result<MiddlewareResult, Error> {
        let arrow = match self.element {
            ArrowElement::Element(e) => dimensions(e, ElementRole::Arrow)?,
            ArrowElement::Size(s) => s,
        };
        let axis = state.placement.alignment_axis();
        let reference = state.rects.reference;
        let floating_len = axis.length(state.rects.floating);
        let arrow_len = match axis {
            Axis::X => arrow.width,
            Axis::Y => arrow.height,
        };
        let coord = axis.coord(state.coords());

        let end_diff =
            axis.length(reference) + axis.start(reference) - coord - floating_len;
        let start_diff = coord - axis.start(reference);
        let center_to_reference = end_diff / 2.0 - start_diff / 2.0;

        let min = self.padding.side(axis.min_side());
        let max = floating_len - arrow_len - self.padding.side(axis.max_side());
        let center = floating_len / 2.0 - arrow_len / 2.0 + center_to_reference;
        // Padding wider than the room left for the arrow: split the difference.
        let offset = if min <= max {
            clamp(min, center, max)
        } else {
            (min + max) / 2.0
        };

        let mut data = ArrowData {
            center_offset: center - offset,
            ..ArrowData::default()
        };
        match axis {
            Axis::X => data.x = Some(offset),
            Axis::Y => data.y = Some(offset),
        }
        Ok(MiddlewareResult::none().with_data(data))
    }
}
