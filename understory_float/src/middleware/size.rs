// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::boxed::Box;
use core::fmt;

use super::{Adjustment, Middleware, MiddlewareResult, MiddlewareState};
use crate::error::{ElementRole, Error};
use crate::overflow::{DetectOverflowOptions, detect_overflow};
use crate::placement::{Alignment, Axis, Side};
use crate::platform::dimensions;

/// What the [`Size`] callback receives.
#[derive(Copy, Clone, Debug)]
pub struct SizeApply<'s, 'a> {
    /// The state the sizes were computed from.
    pub state: &'s MiddlewareState<'a>,
    /// Width the floating element can take without overflowing.
    pub available_width: f64,
    /// Height the floating element can take without overflowing.
    pub available_height: f64,
}

/// Data recorded by [`Size`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SizeData {
    /// Last computed available width.
    pub available_width: f64,
    /// Last computed available height.
    pub available_height: f64,
}

type ApplyFn<'a> = dyn Fn(&SizeApply<'_, '_>) + 'a;

/// Reports the space available to the floating element.
///
/// The `apply` callback typically constrains the element (a max height on a
/// long menu, say). The floating element is then measured again; if its size
/// changed, the pipeline resets with fresh rects.
pub struct Size<'a> {
    apply: Box<ApplyFn<'a>>,
    /// Boundary and padding.
    pub overflow: DetectOverflowOptions<'a>,
}

impl<'a> Size<'a> {
    /// A size middleware calling `apply` with the available space.
    pub fn new(apply: impl Fn(&SizeApply<'_, '_>) + 'a) -> Self {
        Self {
            apply: Box::new(apply),
            overflow: DetectOverflowOptions::default(),
        }
    }

    /// Detect overflow with `options`.
    #[must_use]
    pub fn overflow(mut self, options: DetectOverflowOptions<'a>) -> Self {
        self.overflow = options;
        self
    }

    /// Available `(width, height)` for the floating element in `state`.
    pub fn available(&self, state: &MiddlewareState<'_>) -> Result<(f64, f64), Error> {
        let overflow = detect_overflow(state, &self.overflow)?;
        let placement = state.placement;
        let side = placement.side();
        let alignment = placement.alignment();
        let width = state.rects.floating.width();
        let height = state.rects.floating.height();

        let (height_side, width_side) = match side.axis() {
            Axis::Y => {
                let trailing = if state.rtl {
                    Alignment::Start
                } else {
                    Alignment::End
                };
                let width_side = if alignment == Some(trailing) {
                    Side::Left
                } else {
                    Side::Right
                };
                (side, width_side)
            }
            Axis::X => {
                let height_side = if alignment == Some(Alignment::End) {
                    Side::Top
                } else {
                    Side::Bottom
                };
                (height_side, side)
            }
        };

        let max_clip_height = height - overflow.top - overflow.bottom;
        let max_clip_width = width - overflow.left - overflow.right;
        let mut available_height = (height - overflow.get(height_side)).min(max_clip_height);
        let mut available_width = (width - overflow.get(width_side)).min(max_clip_width);

        let shift = state.middleware_data.shift();
        if shift.is_some_and(|s| s.enabled_x) {
            available_width = max_clip_width;
        }
        if shift.is_some_and(|s| s.enabled_y) {
            available_height = max_clip_height;
        }

        // A centered element that cannot shift grows symmetrically.
        if shift.is_none() && alignment.is_none() {
            let x_min = overflow.left.max(0.0);
            let x_max = overflow.right.max(0.0);
            let y_min = overflow.top.max(0.0);
            let y_max = overflow.bottom.max(0.0);
            if side.axis() == Axis::Y {
                let used = if x_min != 0.0 || x_max != 0.0 {
                    x_min + x_max
                } else {
                    overflow.left.max(overflow.right)
                };
                available_width = width - 2.0 * used;
            } else {
                let used = if y_min != 0.0 || y_max != 0.0 {
                    y_min + y_max
                } else {
                    overflow.top.max(overflow.bottom)
                };
                available_height = height - 2.0 * used;
            }
        }

        Ok((available_width, available_height))
    }
}

impl fmt::Debug for Size<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Size")
            .field("overflow", &self.overflow)
            .finish_non_exhaustive()
    }
}

impl Middleware for Size<'_> {
    fn name(&self) -> &str {
        "size"
    }

    fn compute(&self, state: &MiddlewareState<'_>) -> Result<MiddlewareResult, Error> {
        let (available_width, available_height) = self.available(state)?;
        (self.apply)(&SizeApply {
            state,
            available_width,
            available_height,
        });

        let data = SizeData {
            available_width,
            available_height,
        };
        let next = dimensions(state.elements.floating, ElementRole::Floating)?;
        if next != state.rects.floating.size() {
            #[cfg(feature = "tracing")]
            tracing::trace!(
                width = next.width,
                height = next.height,
                "size: floating element resized"
            );
            return Ok(MiddlewareResult {
                adjustment: Adjustment::Reset {
                    placement: None,
                    remeasure: true,
                },
                data: Some(data.into()),
            });
        }
        Ok(MiddlewareResult::none().with_data(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::testing::Fixture;
    use crate::middleware::{MiddlewareData, ShiftData};
    use crate::placement::Placement;
    use crate::platform::Measure;
    use core::cell::Cell;
    use kurbo::Rect;

    struct Resizable(Cell<Rect>);

    impl Measure for Resizable {
        fn bounding_rect(&self) -> Option<Rect> {
            Some(self.0.get())
        }
    }

    #[test]
    fn centered_bottom_placement_gets_symmetric_width() {
        let fx = Fixture::new(200.0, 200.0, Rect::new(50.0, 150.0, 100.0, 170.0), (80.0, 30.0));
        let size = Size::new(|_| {});
        let (w, h) = size.available(&fx.state(Placement::BOTTOM)).unwrap();
        assert_eq!(h, 30.0);
        // 35 px clear on the left, so the element may grow 35 px each way.
        assert_eq!(w, 150.0);
    }

    #[test]
    fn shift_on_the_alignment_axis_frees_the_whole_width() {
        let mut fx = Fixture::new(200.0, 200.0, Rect::new(50.0, 150.0, 100.0, 170.0), (80.0, 30.0));
        fx.data.insert(
            "shift",
            MiddlewareData::Shift(ShiftData {
                x: 0.0,
                y: 0.0,
                enabled_x: true,
                enabled_y: false,
            }),
        );
        let (w, _) = Size::new(|_| {})
            .available(&fx.state(Placement::BOTTOM))
            .unwrap();
        assert_eq!(w, 200.0);
    }

    #[test]
    fn resizing_in_apply_requests_a_remeasure() {
        let fx = Fixture::new(200.0, 190.0, Rect::new(50.0, 150.0, 100.0, 170.0), (80.0, 30.0));
        let floating = Resizable(Cell::new(fx.floating));
        let size = Size::new(|apply: &SizeApply<'_, '_>| {
            floating.0.set(Rect::new(0.0, 0.0, 80.0, apply.available_height.min(30.0)));
        });

        let mut state = fx.state(Placement::BOTTOM);
        state.elements.floating = &floating;
        let result = size.compute(&state).unwrap();
        assert_eq!(
            result.adjustment,
            Adjustment::Reset {
                placement: None,
                remeasure: true
            }
        );
        assert_eq!(floating.0.get().height(), 20.0);

        // Once the element already has the constrained size, nothing changes.
        let mut fx = fx;
        fx.floating = floating.0.get();
        let mut state = fx.state(Placement::BOTTOM);
        state.elements.floating = &floating;
        let result = size.compute(&state).unwrap();
        assert_eq!(result.adjustment, Adjustment::NoChange);
        let Some(MiddlewareData::Size(data)) = result.data else {
            panic!("size data missing");
        };
        assert_eq!(data.available_height, 20.0);
    }
}
