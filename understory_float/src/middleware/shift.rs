// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use kurbo::Point;

use super::{Middleware, MiddlewareResult, MiddlewareState};
use crate::error::Error;
use crate::geometry::{clamp, clamp_between};
use crate::overflow::{DetectOverflowOptions, detect_overflow};
use crate::placement::Axis;

/// Which axes [`Shift`] may move along.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ShiftAxes {
    /// The alignment axis of the running placement (x for top/bottom, y for left/right).
    #[default]
    Auto,
    /// Horizontal only.
    X,
    /// Vertical only.
    Y,
    /// Both axes independently.
    Both,
}

impl ShiftAxes {
    fn resolve(self, alignment_axis: Axis) -> (bool, bool) {
        match self {
            Self::Auto => (alignment_axis == Axis::X, alignment_axis == Axis::Y),
            Self::X => (true, false),
            Self::Y => (false, true),
            Self::Both => (true, true),
        }
    }
}

/// Keeps a shifted floating element attached to its reference.
///
/// The main axis is the placement's alignment axis; the cross axis is its side axis.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LimitShift {
    /// Overlap, in pixels, the floating element must keep with the reference on the main axis.
    pub main_axis_offset: f64,
    /// Cross-axis counterpart of `main_axis_offset`.
    pub cross_axis_offset: f64,
    /// Limit the main axis.
    pub main_axis: bool,
    /// Limit the cross axis.
    pub cross_axis: bool,
}

impl Default for LimitShift {
    fn default() -> Self {
        Self {
            main_axis_offset: 0.0,
            cross_axis_offset: 0.0,
            main_axis: true,
            cross_axis: true,
        }
    }
}

/// `value` pushed back into `[min, max]`, testing the lower bound first.
fn limit(min: f64, value: f64, max: f64) -> f64 {
    if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    }
}

impl LimitShift {
    /// Limit `coords` so the floating element does not detach from the reference.
    pub fn apply(&self, state: &MiddlewareState<'_>, coords: Point) -> Point {
        let reference = state.rects.reference;
        let floating = state.rects.floating;
        let cross_axis = state.placement.axis();
        let main_axis = cross_axis.opposite();
        let mut out = coords;

        if self.main_axis {
            let start = main_axis.start(reference);
            let min = start - main_axis.length(floating) + self.main_axis_offset;
            let max = start + main_axis.length(reference) - self.main_axis_offset;
            out = main_axis.with_coord(out, limit(min, main_axis.coord(out), max));
        }

        if self.cross_axis {
            let origin_side = state.placement.side().is_origin_side();
            let offset = state
                .middleware_data
                .offset()
                .map(|d| cross_axis.coord(Point::new(d.x, d.y)))
                .unwrap_or(0.0);
            let start = cross_axis.start(reference);
            let (min, max) = if origin_side {
                (
                    start - cross_axis.length(floating) + offset,
                    start + cross_axis.length(reference) - self.cross_axis_offset,
                )
            } else {
                (
                    start - cross_axis.length(floating) + self.cross_axis_offset,
                    start + cross_axis.length(reference) + offset,
                )
            };
            out = cross_axis.with_coord(out, limit(min, cross_axis.coord(out), max));
        }

        out
    }
}

/// Options for [`Shift`].
#[derive(Copy, Clone, Debug, Default)]
pub struct ShiftOptions<'a> {
    /// Axes to shift along.
    pub axes: ShiftAxes,
    /// Largest distance to move along each axis.
    pub max_shift: Option<f64>,
    /// Optional limiter applied after shifting.
    pub limiter: Option<LimitShift>,
    /// Boundary and padding.
    pub overflow: DetectOverflowOptions<'a>,
}

/// Slides the floating element along an axis to keep it inside the boundary.
///
/// The placement never changes. On an axis where the floating element is
/// larger than the boundary, it moves only until the edge with clearance
/// touches the boundary, so no edge ends up overflowing more than before.
#[derive(Copy, Clone, Debug, Default)]
pub struct Shift<'a> {
    /// Options.
    pub options: ShiftOptions<'a>,
}

impl<'a> Shift<'a> {
    /// A shift middleware with `options`.
    pub fn new(options: ShiftOptions<'a>) -> Self {
        Self { options }
    }
}

/// Data recorded by [`Shift`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ShiftData {
    /// Horizontal distance moved.
    pub x: f64,
    /// Vertical distance moved.
    pub y: f64,
    /// Whether the x axis was checked.
    pub enabled_x: bool,
    /// Whether the y axis was checked.
    pub enabled_y: bool,
}

impl Middleware for Shift<'_> {
    fn name(&self) -> &str {
        "shift"
    }

    fn compute(&self, state: &MiddlewareState<'_>) -> Result<MiddlewareResult, Error> {
        let overflow = detect_overflow(state, &self.options.overflow)?;
        let (check_x, check_y) = self
            .options
            .axes
            .resolve(state.placement.alignment_axis());
        let before = state.coords();
        let mut coords = before;

        for (axis, enabled) in [(Axis::X, check_x), (Axis::Y, check_y)] {
            if !enabled {
                continue;
            }
            let current = axis.coord(coords);
            let min = current + overflow.get(axis.min_side());
            let max = current - overflow.get(axis.max_side());
            let mut next = clamp_between(min, current, max);
            if let Some(max_shift) = self.options.max_shift {
                next = current + clamp(-max_shift, next - current, max_shift);
            }
            coords = axis.with_coord(coords, next);
        }

        if let Some(limiter) = &self.options.limiter {
            coords = limiter.apply(state, coords);
        }

        Ok(
            MiddlewareResult::reposition(coords.x, coords.y).with_data(ShiftData {
                x: coords.x - before.x,
                y: coords.y - before.y,
                enabled_x: check_x,
                enabled_y: check_y,
            }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::testing::Fixture;
    use crate::middleware::{Adjustment, MiddlewareData};
    use crate::overflow::detect_rect_overflow;
    use crate::placement::Placement;
    use kurbo::Rect;

    fn moved_to(result: &MiddlewareResult) -> Point {
        match result.adjustment {
            Adjustment::Reposition { x, y } => Point::new(x, y),
            other => panic!("expected a reposition, got {other:?}"),
        }
    }

    #[test]
    fn slides_back_inside_along_the_alignment_axis() {
        let fx = Fixture::new(200.0, 200.0, Rect::new(0.0, 100.0, 20.0, 120.0), (80.0, 30.0));
        let state = fx.state(Placement::BOTTOM);
        assert_eq!(state.coords(), Point::new(-30.0, 120.0));

        let result = Shift::default().compute(&state).unwrap();
        assert_eq!(moved_to(&result), Point::new(0.0, 120.0));
        let Some(MiddlewareData::Shift(data)) = result.data else {
            panic!("shift data missing");
        };
        assert_eq!(data.x, 30.0);
        assert_eq!(data.y, 0.0);
        assert!(data.enabled_x);
        assert!(!data.enabled_y);
    }

    #[test]
    fn no_overflow_leaves_coordinates_untouched() {
        let fx = Fixture::new(500.0, 500.0, Rect::new(200.0, 200.0, 250.0, 220.0), (80.0, 30.0));
        let state = fx.state(Placement::TOP_END);
        let result = Shift::new(ShiftOptions {
            axes: ShiftAxes::Both,
            ..ShiftOptions::default()
        })
        .compute(&state)
        .unwrap();
        assert_eq!(moved_to(&result), state.coords());
    }

    #[test]
    fn max_shift_caps_the_distance() {
        let fx = Fixture::new(200.0, 200.0, Rect::new(0.0, 100.0, 20.0, 120.0), (80.0, 30.0));
        let state = fx.state(Placement::BOTTOM);
        let result = Shift::new(ShiftOptions {
            max_shift: Some(10.0),
            ..ShiftOptions::default()
        })
        .compute(&state)
        .unwrap();
        assert_eq!(moved_to(&result), Point::new(-20.0, 120.0));
    }

    #[test]
    fn oversized_element_only_moves_toward_its_clear_edge() {
        let fx = Fixture::new(50.0, 200.0, Rect::new(10.0, 0.0, 30.0, 10.0), (80.0, 30.0));
        let opts = DetectOverflowOptions::default();

        // Both edges overflow: nothing to gain, nothing moves.
        let state = fx.state(Placement::BOTTOM);
        let result = Shift::default().compute(&state).unwrap();
        assert_eq!(moved_to(&result), state.coords());

        // Right edge has clearance: move until it touches, never past.
        let state = fx.state_at(Placement::BOTTOM, -40.0, 10.0);
        let before = detect_rect_overflow(&fx.platform, state.floating_rect(), &opts).unwrap();
        let moved = moved_to(&Shift::default().compute(&state).unwrap());
        assert_eq!(moved, Point::new(-30.0, 10.0));
        let after = detect_rect_overflow(
            &fx.platform,
            Rect::from_origin_size(moved, fx.floating.size()),
            &opts,
        )
        .unwrap();
        assert!(after.left <= before.left.max(0.0));
        assert!(after.right <= before.right.max(0.0));
    }

    #[test]
    fn limiter_keeps_the_element_attached() {
        let fx = Fixture::new(200.0, 200.0, Rect::new(190.0, 100.0, 200.0, 120.0), (80.0, 30.0));
        let state = fx.state(Placement::BOTTOM);
        let unlimited = moved_to(&Shift::default().compute(&state).unwrap());
        assert_eq!(unlimited, Point::new(120.0, 120.0));

        let limited = Shift::new(ShiftOptions {
            limiter: Some(LimitShift {
                main_axis_offset: 15.0,
                ..LimitShift::default()
            }),
            ..ShiftOptions::default()
        })
        .compute(&state)
        .unwrap();
        assert_eq!(moved_to(&limited), Point::new(125.0, 120.0));
    }
}
