// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Geometry primitives: paired element rects, padding, per-side values, clamping.

use kurbo::{Insets, Rect};

use crate::placement::Side;

/// The reference and floating rects measured together for one computation pass.
///
/// The floating rect sits at the origin; only its size matters to placement.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ElementRects {
    /// Bounding box of the reference element.
    pub reference: Rect,
    /// Size of the floating element, as a rect at the origin.
    pub floating: Rect,
}

/// Padding around a boundary, either uniform or per side.
///
/// Per-side padding leaves unspecified sides at zero.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Padding {
    /// The same padding on every side.
    Uniform(f64),
    /// Individually specified sides.
    Sides {
        /// Top padding.
        top: Option<f64>,
        /// Right padding.
        right: Option<f64>,
        /// Bottom padding.
        bottom: Option<f64>,
        /// Left padding.
        left: Option<f64>,
    },
}

impl Padding {
    /// No padding.
    pub const ZERO: Self = Self::Uniform(0.0);

    /// Resolve into insets (`x0` left, `y0` top, `x1` right, `y1` bottom).
    pub fn resolve(self) -> Insets {
        match self {
            Self::Uniform(v) => Insets::uniform(v),
            Self::Sides {
                top,
                right,
                bottom,
                left,
            } => Insets::new(
                left.unwrap_or(0.0),
                top.unwrap_or(0.0),
                right.unwrap_or(0.0),
                bottom.unwrap_or(0.0),
            ),
        }
    }

    /// Resolved padding on one side.
    pub fn side(self, side: Side) -> f64 {
        let insets = self.resolve();
        match side {
            Side::Top => insets.y0,
            Side::Right => insets.x1,
            Side::Bottom => insets.y1,
            Side::Left => insets.x0,
        }
    }
}

impl Default for Padding {
    fn default() -> Self {
        Self::ZERO
    }
}

impl From<f64> for Padding {
    fn from(value: f64) -> Self {
        Self::Uniform(value)
    }
}

/// One signed value per side.
///
/// For overflow, a positive value means the element extends past the boundary
/// on that side by that many pixels; a negative value is the remaining clearance.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct SideValues {
    /// Top edge.
    pub top: f64,
    /// Right edge.
    pub right: f64,
    /// Bottom edge.
    pub bottom: f64,
    /// Left edge.
    pub left: f64,
}

impl SideValues {
    /// Value for `side`.
    #[inline]
    pub fn get(&self, side: Side) -> f64 {
        match side {
            Side::Top => self.top,
            Side::Right => self.right,
            Side::Bottom => self.bottom,
            Side::Left => self.left,
        }
    }

    /// Whether any side is strictly positive.
    #[inline]
    pub fn any_positive(&self) -> bool {
        Side::ALL.iter().any(|&s| self.get(s) > 0.0)
    }

    /// Whether any side is zero or positive.
    #[inline]
    pub fn any_non_negative(&self) -> bool {
        Side::ALL.iter().any(|&s| self.get(s) >= 0.0)
    }
}

/// `value` limited to `[min, max]`, with `min` winning if the range is inverted.
#[inline]
pub fn clamp(min: f64, value: f64, max: f64) -> f64 {
    min.max(value.min(max))
}

/// `value` limited to the range spanned by `a` and `b`, in either order.
///
/// Unlike [`clamp`], an inverted range is treated as the range between its ends.
#[inline]
pub(crate) fn clamp_between(a: f64, value: f64, b: f64) -> f64 {
    if a <= b {
        clamp(a, value, b)
    } else {
        clamp(b, value, a)
    }
}
