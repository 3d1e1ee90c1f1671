// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Base anchor coordinates for a placement.

use kurbo::Point;

use crate::geometry::ElementRects;
use crate::placement::{Alignment, Axis, Placement, Side};

/// Top-left point of the floating element for `placement`, before any middleware.
///
/// The floating element sits fully outside the reference on the placement's
/// side. Without an alignment it is centered on the cross axis; `start` lines
/// up leading edges and `end` lines up trailing edges. In RTL, the horizontal
/// alignment of top and bottom placements is mirrored.
///
/// ```rust
/// use kurbo::{Point, Rect};
/// use understory_float::{ElementRects, Placement, compute_coords};
///
/// let rects = ElementRects {
///     reference: Rect::new(100.0, 100.0, 150.0, 120.0),
///     floating: Rect::new(0.0, 0.0, 80.0, 30.0),
/// };
/// assert_eq!(
///     compute_coords(Placement::RIGHT_START, &rects, false),
///     Point::new(150.0, 100.0)
/// );
/// ```
pub fn compute_coords(placement: Placement, rects: &ElementRects, rtl: bool) -> Point {
    let reference = rects.reference;
    let floating = rects.floating;

    let common_x = reference.x0 + reference.width() / 2.0 - floating.width() / 2.0;
    let common_y = reference.y0 + reference.height() / 2.0 - floating.height() / 2.0;

    let base = match placement.side() {
        Side::Top => Point::new(common_x, reference.y0 - floating.height()),
        Side::Bottom => Point::new(common_x, reference.y1),
        Side::Right => Point::new(reference.x1, common_y),
        Side::Left => Point::new(reference.x0 - floating.width(), common_y),
    };

    let Some(alignment) = placement.alignment() else {
        return base;
    };

    let axis = placement.alignment_axis();
    let common_align = axis.length(reference) / 2.0 - axis.length(floating) / 2.0;
    // Mirror horizontal alignment for vertical sides in RTL.
    let direction = if rtl && axis == Axis::X { -1.0 } else { 1.0 };
    let shift = match alignment {
        Alignment::Start => -common_align * direction,
        Alignment::End => common_align * direction,
    };
    axis.with_coord(base, axis.coord(base) + shift)
}
