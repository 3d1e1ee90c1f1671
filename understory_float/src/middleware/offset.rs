// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::boxed::Box;
use core::fmt;

use kurbo::Vec2;

use super::{Middleware, MiddlewareResult, MiddlewareState};
use crate::error::Error;
use crate::placement::{Alignment, Axis, Placement};

/// Distances applied by [`Offset`].
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct OffsetOptions {
    /// Distance away from the reference along the side's axis (the gap).
    pub main_axis: f64,
    /// Distance along the alignment axis ("skidding").
    pub cross_axis: f64,
    /// Like `cross_axis`, but only for aligned placements and negated for `end`.
    /// Takes precedence over `cross_axis` when set.
    pub alignment_axis: Option<f64>,
}

impl From<f64> for OffsetOptions {
    fn from(main_axis: f64) -> Self {
        Self {
            main_axis,
            ..Self::default()
        }
    }
}

/// What the offset is computed from.
enum OffsetValue {
    Fixed(OffsetOptions),
    Derived(Box<dyn Fn(&MiddlewareState<'_>) -> OffsetOptions>),
}

/// Moves the floating element away from (or along) the reference.
///
/// A plain number moves the element outward: top/left placements subtract
/// it from the coordinate, bottom/right placements add it.
pub struct Offset {
    value: OffsetValue,
}

impl Offset {
    /// Offset by fixed distances. A bare number is the main-axis gap.
    pub fn new(options: impl Into<OffsetOptions>) -> Self {
        Self {
            value: OffsetValue::Fixed(options.into()),
        }
    }

    /// Offset by distances derived from the current state.
    pub fn from_fn(f: impl Fn(&MiddlewareState<'_>) -> OffsetOptions + 'static) -> Self {
        Self {
            value: OffsetValue::Derived(Box::new(f)),
        }
    }

    fn options(&self, state: &MiddlewareState<'_>) -> OffsetOptions {
        match &self.value {
            OffsetValue::Fixed(options) => *options,
            OffsetValue::Derived(f) => f(state),
        }
    }
}

impl fmt::Debug for Offset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            OffsetValue::Fixed(options) => f.debug_tuple("Offset").field(options).finish(),
            OffsetValue::Derived(_) => f.write_str("Offset(<fn>)"),
        }
    }
}

/// Data recorded by [`Offset`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct OffsetData {
    /// Horizontal displacement applied.
    pub x: f64,
    /// Vertical displacement applied.
    pub y: f64,
    /// Placement the displacement was computed for.
    pub placement: Placement,
}

/// Displacement for `options` at `placement`.
pub(crate) fn offset_delta(placement: Placement, rtl: bool, options: OffsetOptions) -> Vec2 {
    let side = placement.side();
    let vertical = placement.axis() == Axis::Y;
    let main_multi = if side.is_origin_side() { -1.0 } else { 1.0 };
    let cross_multi = if rtl && vertical { -1.0 } else { 1.0 };

    let cross = match (placement.alignment(), options.alignment_axis) {
        (Some(Alignment::End), Some(v)) => -v,
        (Some(Alignment::Start), Some(v)) => v,
        _ => options.cross_axis,
    };

    let main = options.main_axis * main_multi;
    let cross = cross * cross_multi;
    if vertical {
        Vec2::new(cross, main)
    } else {
        Vec2::new(main, cross)
    }
}

impl Middleware for Offset {
    fn name(&self) -> &str {
        "offset"
    }

    fn compute(&self, state: &MiddlewareState<'_>) -> Result<MiddlewareResult, Error> {
        let delta = offset_delta(state.placement, state.rtl, self.options(state));
        Ok(
            MiddlewareResult::reposition(state.x + delta.x, state.y + delta.y).with_data(
                OffsetData {
                    x: delta.x,
                    y: delta.y,
                    placement: state.placement,
                },
            ),
        )
    }
}
