// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The placement model: sides, alignments, axes, and the 12 placements.

use alloc::string::ToString;
use core::fmt;
use core::str::FromStr;

use kurbo::{Point, Rect};
use smallvec::SmallVec;

use crate::error::Error;

/// One of the four sides of the reference element.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    /// Above the reference.
    Top,
    /// To the right of the reference.
    Right,
    /// Below the reference.
    Bottom,
    /// To the left of the reference.
    Left,
}

impl Side {
    /// All sides, in canonical order.
    pub const ALL: [Self; 4] = [Self::Top, Self::Right, Self::Bottom, Self::Left];

    /// The side across the reference from this one.
    #[inline]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Top => Self::Bottom,
            Self::Right => Self::Left,
            Self::Bottom => Self::Top,
            Self::Left => Self::Right,
        }
    }

    /// The axis along which a floating element placed on this side moves away
    /// from the reference (`Y` for top/bottom, `X` for left/right).
    #[inline]
    pub const fn axis(self) -> Axis {
        match self {
            Self::Top | Self::Bottom => Axis::Y,
            Self::Left | Self::Right => Axis::X,
        }
    }

    /// Whether this side faces the coordinate origin (top or left).
    #[inline]
    pub const fn is_origin_side(self) -> bool {
        matches!(self, Self::Top | Self::Left)
    }

    /// Lowercase name used in the string form of placements.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Right => "right",
            Self::Bottom => "bottom",
            Self::Left => "left",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Alignment of the floating element along the edge of the reference.
///
/// The absence of an alignment (centered) is expressed as `Option<Alignment>::None`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Alignment {
    /// Leading edges line up.
    Start,
    /// Trailing edges line up.
    End,
}

impl Alignment {
    /// Both alignments, in canonical order.
    pub const ALL: [Self; 2] = [Self::Start, Self::End];

    /// `Start` ↔ `End`.
    #[inline]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Start => Self::End,
            Self::End => Self::Start,
        }
    }

    /// Lowercase name used in the string form of placements.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::End => "end",
        }
    }
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A 2D axis.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Horizontal.
    X,
    /// Vertical.
    Y,
}

impl Axis {
    /// The perpendicular axis.
    #[inline]
    pub const fn opposite(self) -> Self {
        match self {
            Self::X => Self::Y,
            Self::Y => Self::X,
        }
    }

    /// Extent of `rect` along this axis (width for `X`, height for `Y`).
    #[inline]
    pub fn length(self, rect: Rect) -> f64 {
        match self {
            Self::X => rect.width(),
            Self::Y => rect.height(),
        }
    }

    /// Leading coordinate of `rect` along this axis (`x0` or `y0`).
    #[inline]
    pub fn start(self, rect: Rect) -> f64 {
        match self {
            Self::X => rect.x0,
            Self::Y => rect.y0,
        }
    }

    /// Component of `point` along this axis.
    #[inline]
    pub fn coord(self, point: Point) -> f64 {
        match self {
            Self::X => point.x,
            Self::Y => point.y,
        }
    }

    /// Replace the component of `point` along this axis.
    #[inline]
    pub fn with_coord(self, point: Point, value: f64) -> Point {
        match self {
            Self::X => Point::new(value, point.y),
            Self::Y => Point::new(point.x, value),
        }
    }

    /// The side at the low end of this axis (left or top).
    #[inline]
    pub const fn min_side(self) -> Side {
        match self {
            Self::X => Side::Left,
            Self::Y => Side::Top,
        }
    }

    /// The side at the high end of this axis (right or bottom).
    #[inline]
    pub const fn max_side(self) -> Side {
        match self {
            Self::X => Side::Right,
            Self::Y => Side::Bottom,
        }
    }
}

/// Where a floating element sits relative to its reference.
///
/// A placement is a [`Side`] plus an optional [`Alignment`]; its string form is
/// `"side"` or `"side-alignment"` (for example `"bottom-start"`).
///
/// ```rust
/// use understory_float::{Alignment, Placement, Side};
///
/// let p: Placement = "bottom-start".parse().unwrap();
/// assert_eq!(p.side(), Side::Bottom);
/// assert_eq!(p.alignment(), Some(Alignment::Start));
/// assert_eq!(p.opposite(), Placement::TOP_START);
/// assert_eq!(p.to_string(), "bottom-start");
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Placement {
    side: Side,
    alignment: Option<Alignment>,
}

impl Placement {
    /// `top`
    pub const TOP: Self = Self::new(Side::Top, None);
    /// `top-start`
    pub const TOP_START: Self = Self::new(Side::Top, Some(Alignment::Start));
    /// `top-end`
    pub const TOP_END: Self = Self::new(Side::Top, Some(Alignment::End));
    /// `right`
    pub const RIGHT: Self = Self::new(Side::Right, None);
    /// `right-start`
    pub const RIGHT_START: Self = Self::new(Side::Right, Some(Alignment::Start));
    /// `right-end`
    pub const RIGHT_END: Self = Self::new(Side::Right, Some(Alignment::End));
    /// `bottom`
    pub const BOTTOM: Self = Self::new(Side::Bottom, None);
    /// `bottom-start`
    pub const BOTTOM_START: Self = Self::new(Side::Bottom, Some(Alignment::Start));
    /// `bottom-end`
    pub const BOTTOM_END: Self = Self::new(Side::Bottom, Some(Alignment::End));
    /// `left`
    pub const LEFT: Self = Self::new(Side::Left, None);
    /// `left-start`
    pub const LEFT_START: Self = Self::new(Side::Left, Some(Alignment::Start));
    /// `left-end`
    pub const LEFT_END: Self = Self::new(Side::Left, Some(Alignment::End));

    /// Every placement: each side followed by its `start` and `end` variants.
    ///
    /// This order is the tie-break order for placement ranking.
    pub const ALL: [Self; 12] = [
        Self::TOP,
        Self::TOP_START,
        Self::TOP_END,
        Self::RIGHT,
        Self::RIGHT_START,
        Self::RIGHT_END,
        Self::BOTTOM,
        Self::BOTTOM_START,
        Self::BOTTOM_END,
        Self::LEFT,
        Self::LEFT_START,
        Self::LEFT_END,
    ];

    /// Create a placement from its parts.
    #[inline]
    pub const fn new(side: Side, alignment: Option<Alignment>) -> Self {
        Self { side, alignment }
    }

    /// The side of the reference this placement is on.
    #[inline]
    pub const fn side(self) -> Side {
        self.side
    }

    /// The alignment, or `None` when centered.
    #[inline]
    pub const fn alignment(self) -> Option<Alignment> {
        self.alignment
    }

    /// Axis of the side (see [`Side::axis`]).
    #[inline]
    pub const fn axis(self) -> Axis {
        self.side.axis()
    }

    /// The axis along which the alignment applies (perpendicular to [`Self::axis`]).
    #[inline]
    pub const fn alignment_axis(self) -> Axis {
        self.side.axis().opposite()
    }

    /// Whether this placement is a bare side.
    #[inline]
    pub const fn is_centered(self) -> bool {
        self.alignment.is_none()
    }

    /// The same alignment on the opposite side.
    #[inline]
    pub const fn opposite(self) -> Self {
        Self::new(self.side.opposite(), self.alignment)
    }

    /// The same side with the opposite alignment. Centered placements are unchanged.
    #[inline]
    pub const fn opposite_alignment(self) -> Self {
        match self.alignment {
            Some(a) => Self::new(self.side, Some(a.opposite())),
            None => self,
        }
    }

    /// The same side with a different alignment.
    #[inline]
    pub const fn with_alignment(self, alignment: Option<Alignment>) -> Self {
        Self::new(self.side, alignment)
    }

    /// Fallbacks that also flip the alignment:
    /// `[opposite alignment, opposite side, opposite side with opposite alignment]`.
    pub fn expanded_placements(self) -> SmallVec<[Self; 3]> {
        let opposite = self.opposite();
        let mut out = SmallVec::new();
        out.push(self.opposite_alignment());
        out.push(opposite);
        out.push(opposite.opposite_alignment());
        out
    }

    /// The pair of sides an aligned floating element can overflow across its
    /// alignment axis, most relevant first.
    ///
    /// Centered placements yield the left/top pair, swapped like any other
    /// when the reference is the larger of the two.
    pub fn alignment_sides(self, reference: Rect, floating: Rect, rtl: bool) -> (Side, Side) {
        let axis = self.alignment_axis();
        let mut main = match axis {
            Axis::X => {
                // In RTL, `end` is the visual left edge.
                let leading = if rtl { Alignment::End } else { Alignment::Start };
                if self.alignment == Some(leading) {
                    Side::Right
                } else {
                    Side::Left
                }
            }
            Axis::Y => {
                if self.alignment == Some(Alignment::Start) {
                    Side::Bottom
                } else {
                    Side::Top
                }
            }
        };
        if axis.length(reference) > axis.length(floating) {
            main = main.opposite();
        }
        (main, main.opposite())
    }
}

impl Default for Placement {
    fn default() -> Self {
        Self::BOTTOM
    }
}

impl From<Side> for Placement {
    fn from(side: Side) -> Self {
        Self::new(side, None)
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.alignment {
            Some(a) => write!(f, "{}-{}", self.side, a),
            None => f.write_str(self.side.as_str()),
        }
    }
}

impl FromStr for Placement {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (side, alignment) = match s.split_once('-') {
            Some((side, alignment)) => (side, Some(alignment)),
            None => (s, None),
        };
        let side = match side {
            "top" => Side::Top,
            "right" => Side::Right,
            "bottom" => Side::Bottom,
            "left" => Side::Left,
            _ => return Err(Error::InvalidPlacement(s.to_string())),
        };
        let alignment = match alignment {
            None => None,
            Some("start") => Some(Alignment::Start),
            Some("end") => Some(Alignment::End),
            Some(_) => return Err(Error::InvalidPlacement(s.to_string())),
        };
        Ok(Self::new(side, alignment))
    }
}
