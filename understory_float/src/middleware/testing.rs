// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared fixture for middleware unit tests.

use kurbo::{Point, Rect};

use super::{Elements, MiddlewareDataMap, MiddlewareState};
use crate::Strategy;
use crate::coords::compute_coords;
use crate::geometry::ElementRects;
use crate::placement::Placement;
use crate::platform::{BoundaryCache, Viewport};

/// A viewport, a reference, and a floating element, plus the per-pass state.
pub(crate) struct Fixture {
    pub(crate) platform: Viewport,
    pub(crate) reference: Rect,
    pub(crate) floating: Rect,
    pub(crate) data: MiddlewareDataMap,
    pub(crate) cache: BoundaryCache,
}

impl Fixture {
    /// `reference` in a `width × height` viewport, with a floating element of `floating` size.
    pub(crate) fn new(width: f64, height: f64, reference: Rect, floating: (f64, f64)) -> Self {
        Self {
            platform: Viewport::new(width, height),
            reference,
            floating: Rect::from_origin_size(Point::ORIGIN, floating),
            data: MiddlewareDataMap::new(),
            cache: BoundaryCache::new(),
        }
    }

    pub(crate) fn rects(&self) -> ElementRects {
        ElementRects {
            reference: self.reference,
            floating: self.floating,
        }
    }

    /// State at the base coordinates of `placement`.
    pub(crate) fn state(&self, placement: Placement) -> MiddlewareState<'_> {
        let p = compute_coords(placement, &self.rects(), self.platform.rtl);
        self.state_at(placement, p.x, p.y)
    }

    /// State at explicit coordinates.
    pub(crate) fn state_at(&self, placement: Placement, x: f64, y: f64) -> MiddlewareState<'_> {
        MiddlewareState {
            x,
            y,
            initial_placement: placement,
            placement,
            strategy: Strategy::Absolute,
            rects: self.rects(),
            elements: Elements {
                reference: &self.reference,
                floating: &self.floating,
            },
            middleware_data: &self.data,
            platform: &self.platform,
            rtl: self.platform.rtl,
            cache: &self.cache,
        }
    }
}
