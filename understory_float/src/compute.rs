// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The positioning pipeline: measure, anchor, then fold the middleware.

use core::fmt;

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use kurbo::Point;

use crate::coords::compute_coords;
use crate::error::Error;
use crate::geometry::ElementRects;
use crate::middleware::{
    Adjustment, AsyncMiddleware, Elements, Middleware, MiddlewareDataMap, MiddlewareResult,
    MiddlewareState,
};
use crate::placement::Placement;
use crate::platform::{BoundaryCache, Measure, Platform};

/// CSS positioning strategy the caller will apply the result with.
///
/// Computation does not depend on it; it is passed through to middleware and the result.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Positioned against the nearest positioned ancestor.
    #[default]
    Absolute,
    /// Positioned against the viewport.
    Fixed,
}

impl Strategy {
    /// Lowercase CSS keyword.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Absolute => "absolute",
            Self::Fixed => "fixed",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options for [`compute_position`] and [`compute_position_async`].
///
/// `M` is the middleware trait object: [`Middleware`] for the synchronous
/// pipeline, [`AsyncMiddleware`] for the asynchronous one.
pub struct PositionOptions<'a, M: ?Sized = dyn Middleware> {
    /// Requested placement. Defaults to `bottom`.
    pub placement: Placement,
    /// Positioning strategy hint.
    pub strategy: Strategy,
    /// Middleware, run in order.
    pub middleware: &'a [&'a M],
    /// Maximum number of resets before giving up with [`Error::ResetLimit`].
    /// `None` never gives up.
    pub max_resets: Option<u32>,
}

impl<M: ?Sized> Default for PositionOptions<'_, M> {
    fn default() -> Self {
        Self {
            placement: Placement::default(),
            strategy: Strategy::default(),
            middleware: &[],
            max_resets: None,
        }
    }
}

impl<M: ?Sized> Clone for PositionOptions<'_, M> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<M: ?Sized> Copy for PositionOptions<'_, M> {}

impl<M: ?Sized> fmt::Debug for PositionOptions<'_, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PositionOptions")
            .field("placement", &self.placement)
            .field("strategy", &self.strategy)
            .field("middleware", &self.middleware.len())
            .field("max_resets", &self.max_resets)
            .finish()
    }
}

impl<'a, M: ?Sized> PositionOptions<'a, M> {
    /// Use `placement`.
    #[must_use]
    pub fn placement(mut self, placement: Placement) -> Self {
        self.placement = placement;
        self
    }

    /// Use `strategy`.
    #[must_use]
    pub fn strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Run `middleware`.
    #[must_use]
    pub fn middleware(mut self, middleware: &'a [&'a M]) -> Self {
        self.middleware = middleware;
        self
    }
}

/// Where to draw the floating element.
#[derive(Clone, Debug)]
pub struct ComputePositionResult {
    /// Final x coordinate, un-rounded.
    pub x: f64,
    /// Final y coordinate, un-rounded.
    pub y: f64,
    /// Final placement, which middleware may have changed.
    pub placement: Placement,
    /// Strategy from the options.
    pub strategy: Strategy,
    /// Data recorded by each middleware, keyed by name.
    pub middleware_data: MiddlewareDataMap,
}

impl ComputePositionResult {
    /// The final coordinates.
    pub fn coords(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Coordinates snapped to the device pixel grid for `device_pixel_ratio`.
    pub fn round_to_device_pixels(&self, device_pixel_ratio: f64) -> Point {
        let dpr = if device_pixel_ratio > 0.0 {
            device_pixel_ratio
        } else {
            1.0
        };
        Point::new(
            (self.x * dpr).round() / dpr,
            (self.y * dpr).round() / dpr,
        )
    }

    /// Coordinates snapped to the device pixel grid of `platform`.
    pub fn round_with(&self, platform: &dyn Platform) -> Point {
        self.round_to_device_pixels(platform.device_pixel_ratio())
    }
}

/// Running state of one computation.
struct Pipeline<'a> {
    platform: &'a dyn Platform,
    elements: Elements<'a>,
    strategy: Strategy,
    initial_placement: Placement,
    placement: Placement,
    rects: ElementRects,
    rtl: bool,
    x: f64,
    y: f64,
    data: MiddlewareDataMap,
    cache: BoundaryCache,
    resets: u32,
    max_resets: Option<u32>,
}

impl<'a> Pipeline<'a> {
    fn new<M: ?Sized>(
        platform: &'a dyn Platform,
        reference: &'a dyn Measure,
        floating: &'a dyn Measure,
        options: &PositionOptions<'_, M>,
    ) -> Result<Self, Error> {
        let rects = platform.element_rects(reference, floating)?;
        let rtl = platform.is_rtl(floating);
        let Point { x, y } = compute_coords(options.placement, &rects, rtl);
        Ok(Self {
            platform,
            elements: Elements {
                reference,
                floating,
            },
            strategy: options.strategy,
            initial_placement: options.placement,
            placement: options.placement,
            rects,
            rtl,
            x,
            y,
            data: MiddlewareDataMap::new(),
            cache: BoundaryCache::new(),
            resets: 0,
            max_resets: options.max_resets,
        })
    }

    fn state(&self) -> MiddlewareState<'_> {
        MiddlewareState {
            x: self.x,
            y: self.y,
            initial_placement: self.initial_placement,
            placement: self.placement,
            strategy: self.strategy,
            rects: self.rects,
            elements: self.elements,
            middleware_data: &self.data,
            platform: self.platform,
            rtl: self.rtl,
            cache: &self.cache,
        }
    }

    /// Fold one result into the running state.
    fn apply(&mut self, name: &str, result: MiddlewareResult) -> Result<(), Error> {
        if let Some(data) = result.data {
            self.data.insert(name, data);
        }
        match result.adjustment {
            Adjustment::NoChange => Ok(()),
            Adjustment::Reposition { x, y } => {
                self.x = x;
                self.y = y;
                Ok(())
            }
            Adjustment::Replace { placement } => {
                self.placement = placement;
                Ok(())
            }
            Adjustment::Reset {
                placement,
                remeasure,
            } => {
                self.resets += 1;
                if let Some(limit) = self.max_resets
                    && self.resets > limit
                {
                    return Err(Error::ResetLimit { limit });
                }
                if let Some(placement) = placement {
                    self.placement = placement;
                }
                if remeasure {
                    self.rects = self
                        .platform
                        .element_rects(self.elements.reference, self.elements.floating)?;
                }
                #[cfg(feature = "tracing")]
                tracing::trace!(
                    middleware = name,
                    placement = %self.placement,
                    remeasure,
                    resets = self.resets,
                    "reset"
                );
                let Point { x, y } = compute_coords(self.placement, &self.rects, self.rtl);
                self.x = x;
                self.y = y;
                Ok(())
            }
        }
    }

    fn finish(self) -> ComputePositionResult {
        #[cfg(feature = "tracing")]
        tracing::debug!(
            x = self.x,
            y = self.y,
            placement = %self.placement,
            resets = self.resets,
            "position computed"
        );
        ComputePositionResult {
            x: self.x,
            y: self.y,
            placement: self.placement,
            strategy: self.strategy,
            middleware_data: self.data,
        }
    }
}

/// Compute where to draw `floating` next to `reference`.
///
/// Rects are read once, the base coordinates for the requested placement are
/// computed, and then each middleware runs once, in order, against the
/// running state. A middleware that resets discards the running coordinates
/// and recomputes the base anchor for the (possibly new) placement; the
/// remaining middleware then continue from there. Any middleware error aborts
/// the computation.
///
/// ```rust
/// use kurbo::Rect;
/// use understory_float::{
///     Flip, Middleware, Offset, Placement, PositionOptions, Shift, Viewport, compute_position,
/// };
///
/// let viewport = Viewport::new(800.0, 600.0);
/// let reference = Rect::new(100.0, 100.0, 150.0, 120.0);
/// let floating = Rect::new(0.0, 0.0, 80.0, 30.0);
///
/// let offset = Offset::new(4.0);
/// let flip = Flip::default();
/// let shift = Shift::default();
/// let middleware: [&dyn Middleware; 3] = [&flip, &offset, &shift];
///
/// let result = compute_position(
///     &viewport,
///     &reference,
///     &floating,
///     &PositionOptions::default()
///         .placement(Placement::BOTTOM)
///         .middleware(&middleware),
/// )
/// .unwrap();
/// assert_eq!((result.x, result.y), (85.0, 124.0));
/// assert_eq!(result.placement, Placement::BOTTOM);
/// ```
pub fn compute_position(
    platform: &dyn Platform,
    reference: &dyn Measure,
    floating: &dyn Measure,
    options: &PositionOptions<'_, dyn Middleware + '_>,
) -> Result<ComputePositionResult, Error> {
    #[cfg(feature = "tracing")]
    let _span = tracing::debug_span!("compute_position", placement = %options.placement).entered();

    let mut pipeline = Pipeline::new(platform, reference, floating, options)?;
    for middleware in options.middleware {
        let result = middleware.compute(&pipeline.state())?;
        pipeline.apply(Middleware::name(*middleware), result)?;
    }
    Ok(pipeline.finish())
}

/// Like [`compute_position`], awaiting each middleware before the next runs.
pub async fn compute_position_async(
    platform: &dyn Platform,
    reference: &dyn Measure,
    floating: &dyn Measure,
    options: &PositionOptions<'_, dyn AsyncMiddleware + '_>,
) -> Result<ComputePositionResult, Error> {
    let mut pipeline = Pipeline::new(platform, reference, floating, options)?;
    for middleware in options.middleware {
        let result = {
            let state = pipeline.state();
            middleware.compute_async(&state).await?
        };
        pipeline.apply(AsyncMiddleware::name(*middleware), result)?;
    }
    Ok(pipeline.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::{
        Arrow, AutoPlacement, AutoPlacementOptions, Flip, MiddlewareData, MiddlewareFuture,
        Offset, OffsetOptions, Shift, Size,
    };
    use crate::platform::Viewport;
    use alloc::boxed::Box;
    use alloc::vec;
    use core::cell::Cell;
    use kurbo::Rect;

    const REFERENCE: Rect = Rect::new(100.0, 100.0, 150.0, 120.0);
    const FLOATING: Rect = Rect::new(0.0, 0.0, 80.0, 30.0);

    fn run(
        viewport: &Viewport,
        reference: Rect,
        placement: Placement,
        middleware: &[&dyn Middleware],
    ) -> Result<ComputePositionResult, Error> {
        compute_position(
            viewport,
            &reference,
            &FLOATING,
            &PositionOptions::default()
                .placement(placement)
                .middleware(middleware),
        )
    }

    #[test]
    fn bare_placements_return_base_coordinates() {
        let vp = Viewport::new(800.0, 600.0);
        let r = run(&vp, REFERENCE, Placement::BOTTOM, &[]).unwrap();
        assert_eq!(r.coords(), Point::new(85.0, 120.0));
        assert_eq!(r.placement, Placement::BOTTOM);
        assert_eq!(r.strategy, Strategy::Absolute);
        assert!(r.middleware_data.is_empty());

        let r = run(&vp, REFERENCE, Placement::RIGHT_START, &[]).unwrap();
        assert_eq!(r.coords(), Point::new(150.0, 100.0));
    }

    #[test]
    fn reset_discards_earlier_deltas() {
        let vp = Viewport::new(800.0, 600.0);
        let reference = Rect::new(100.0, 10.0, 150.0, 30.0);
        let offset = Offset::new(4.0);
        let flip = Flip::default();
        let r = run(&vp, reference, Placement::TOP, &[&offset, &flip]).unwrap();
        assert_eq!(r.placement, Placement::BOTTOM);
        // The bare bottom anchor: the offset applied at `top` is not replayed.
        assert_eq!(r.coords(), Point::new(85.0, 30.0));
        assert!(r.middleware_data.flip().unwrap().flipped);
        assert_eq!(r.middleware_data.offset().map(|d| d.placement), Some(Placement::TOP));
    }

    #[test]
    fn middleware_after_a_reset_see_the_new_placement() {
        let vp = Viewport::new(800.0, 600.0);
        let reference = Rect::new(100.0, 10.0, 150.0, 30.0);
        let flip = Flip::default();
        let offset = Offset::new(4.0);
        let r = run(&vp, reference, Placement::TOP, &[&flip, &offset]).unwrap();
        assert_eq!(r.placement, Placement::BOTTOM);
        assert_eq!(r.coords(), Point::new(85.0, 34.0));
    }

    #[test]
    fn fitting_placement_is_not_flipped() {
        let vp = Viewport::new(800.0, 600.0);
        let flip = Flip::default();
        let r = run(&vp, REFERENCE, Placement::TOP, &[&flip]).unwrap();
        assert_eq!(r.placement, Placement::TOP);
        assert!(r.middleware_data.flip().is_none());
    }

    #[test]
    fn flip_then_shift_lands_inside_the_viewport() {
        let vp = Viewport::new(200.0, 200.0);
        let reference = Rect::new(0.0, 180.0, 20.0, 195.0);
        let flip = Flip::default();
        let shift = Shift::default();
        let r = run(&vp, reference, Placement::BOTTOM, &[&flip, &shift]).unwrap();
        assert_eq!(r.placement, Placement::TOP);
        assert_eq!(r.coords(), Point::new(0.0, 150.0));
        assert_eq!(r.middleware_data.shift().map(|d| d.x), Some(30.0));
    }

    #[test]
    fn auto_placement_chooses_the_roomier_side() {
        let vp = Viewport::new(800.0, 600.0);
        let reference = Rect::new(100.0, 10.0, 150.0, 30.0);
        let auto = AutoPlacement::new(AutoPlacementOptions {
            allowed_placements: vec![Placement::TOP, Placement::BOTTOM],
            ..AutoPlacementOptions::default()
        });
        let r = run(&vp, reference, Placement::TOP, &[&auto]).unwrap();
        assert_eq!(r.placement, Placement::BOTTOM);
        assert_eq!(r.coords(), Point::new(85.0, 30.0));
    }

    #[test]
    fn repeated_calls_are_bit_identical() {
        let vp = Viewport::new(300.0, 200.0);
        let reference = Rect::new(250.0, 5.0, 290.0, 25.0);
        let offset = Offset::new(OffsetOptions {
            main_axis: 6.0,
            cross_axis: 1.5,
            alignment_axis: None,
        });
        let flip = Flip::default();
        let shift = Shift::default();
        let arrow = Arrow::new(kurbo::Size::new(8.0, 8.0));
        let chain: [&dyn Middleware; 4] = [&offset, &flip, &shift, &arrow];
        let a = run(&vp, reference, Placement::TOP_START, &chain).unwrap();
        let b = run(&vp, reference, Placement::TOP_START, &chain).unwrap();
        assert_eq!(a.x.to_bits(), b.x.to_bits());
        assert_eq!(a.y.to_bits(), b.y.to_bits());
        assert_eq!(a.placement, b.placement);
        assert_eq!(a.middleware_data.shift(), b.middleware_data.shift());
        assert_eq!(a.middleware_data.arrow(), b.middleware_data.arrow());
        assert_eq!(a.middleware_data.flip(), b.middleware_data.flip());
    }

    struct Failing;

    impl Middleware for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        fn compute(&self, _: &MiddlewareState<'_>) -> Result<MiddlewareResult, Error> {
            Err(Error::middleware("failing", "boom"))
        }
    }

    #[test]
    fn middleware_errors_abort_the_call() {
        let vp = Viewport::new(800.0, 600.0);
        let offset = Offset::new(4.0);
        let err = run(&vp, REFERENCE, Placement::BOTTOM, &[&offset, &Failing]).unwrap_err();
        assert_eq!(err, Error::middleware("failing", "boom"));
    }

    /// Always asks for a reset.
    struct Restless;

    impl Middleware for Restless {
        fn name(&self) -> &str {
            "restless"
        }

        fn compute(&self, state: &MiddlewareState<'_>) -> Result<MiddlewareResult, Error> {
            Ok(MiddlewareResult::reset_to(state.placement.opposite()))
        }
    }

    #[test]
    fn reset_limit_caps_resets_per_call() {
        let vp = Viewport::new(800.0, 600.0);
        let middleware: [&dyn Middleware; 3] = [&Restless, &Restless, &Restless];
        let options = PositionOptions {
            middleware: &middleware,
            max_resets: Some(2),
            ..PositionOptions::default()
        };
        let err = compute_position(&vp, &REFERENCE, &FLOATING, &options).unwrap_err();
        assert_eq!(err, Error::ResetLimit { limit: 2 });

        let within = PositionOptions {
            max_resets: Some(3),
            ..options
        };
        let r = compute_position(&vp, &REFERENCE, &FLOATING, &within).unwrap();
        // bottom -> top -> bottom -> top
        assert_eq!(r.placement, Placement::TOP);
        assert_eq!(r.coords(), Point::new(85.0, 70.0));
    }

    /// Records custom data and counts its runs.
    struct Counter(Cell<u32>);

    impl Middleware for Counter {
        fn name(&self) -> &str {
            "counter"
        }

        fn compute(&self, _: &MiddlewareState<'_>) -> Result<MiddlewareResult, Error> {
            self.0.set(self.0.get() + 1);
            Ok(MiddlewareResult::none().with_data(MiddlewareData::custom(self.0.get())))
        }
    }

    #[test]
    fn each_middleware_runs_once_across_a_reset() {
        let vp = Viewport::new(800.0, 600.0);
        let reference = Rect::new(100.0, 10.0, 150.0, 30.0);
        let before = Counter(Cell::new(0));
        let after = Counter(Cell::new(0));
        let flip = Flip::default();
        let r = run(&vp, reference, Placement::TOP, &[&before, &flip, &after]).unwrap();
        assert_eq!(r.placement, Placement::BOTTOM);
        assert_eq!(before.0.get(), 1);
        assert_eq!(after.0.get(), 1);
        assert_eq!(r.middleware_data.custom::<u32>("counter"), Some(&1));
    }

    struct Floating(Cell<Rect>);

    impl Measure for Floating {
        fn bounding_rect(&self) -> Option<Rect> {
            Some(self.0.get())
        }
    }

    #[test]
    fn size_remeasures_and_recomputes() {
        let vp = Viewport::new(200.0, 190.0);
        let reference = Rect::new(50.0, 150.0, 100.0, 170.0);
        let floating = Floating(Cell::new(FLOATING));
        let size = Size::new(|apply: &crate::middleware::SizeApply<'_, '_>| {
            let h = apply.available_height.min(30.0);
            floating.0.set(Rect::new(0.0, 0.0, 80.0, h));
        });
        let middleware: [&dyn Middleware; 1] = [&size];
        let r = compute_position(
            &vp,
            &reference,
            &floating,
            &PositionOptions::default().middleware(&middleware),
        )
        .unwrap();
        assert_eq!(floating.0.get().height(), 20.0);
        assert_eq!(r.coords(), Point::new(35.0, 170.0));
        assert_eq!(r.middleware_data.size().map(|d| d.available_height), Some(20.0));
    }

    #[test]
    fn rounding_snaps_to_device_pixels() {
        let r = ComputePositionResult {
            x: 10.3,
            y: 20.76,
            placement: Placement::BOTTOM,
            strategy: Strategy::Fixed,
            middleware_data: MiddlewareDataMap::new(),
        };
        assert_eq!(r.round_to_device_pixels(1.0), Point::new(10.0, 21.0));
        assert_eq!(r.round_to_device_pixels(2.0), Point::new(10.5, 21.0));
        assert_eq!(r.x, 10.3);
    }

    #[test]
    fn rounding_reads_the_platform_ratio() {
        struct Retina;
        impl Platform for Retina {
            fn viewport_rect(&self) -> Rect {
                Rect::new(0.0, 0.0, 800.0, 600.0)
            }
            fn device_pixel_ratio(&self) -> f64 {
                2.0
            }
        }
        let r = ComputePositionResult {
            x: 10.3,
            y: 20.76,
            placement: Placement::BOTTOM,
            strategy: Strategy::Absolute,
            middleware_data: MiddlewareDataMap::new(),
        };
        assert_eq!(r.round_with(&Retina), Point::new(10.5, 21.0));
        assert_eq!(r.round_with(&Viewport::new(800.0, 600.0)), Point::new(10.0, 21.0));
    }

    /// Yields once before answering, like a middleware awaiting a measurement.
    struct Deferred;

    impl AsyncMiddleware for Deferred {
        fn name(&self) -> &str {
            "deferred"
        }

        fn compute_async<'a>(&'a self, state: &'a MiddlewareState<'a>) -> MiddlewareFuture<'a> {
            Box::pin(async move {
                YieldOnce(false).await;
                Ok(MiddlewareResult::reposition(state.x + 1.0, state.y))
            })
        }
    }

    struct YieldOnce(bool);

    impl core::future::Future for YieldOnce {
        type Output = ();

        fn poll(
            mut self: core::pin::Pin<&mut Self>,
            cx: &mut core::task::Context<'_>,
        ) -> core::task::Poll<()> {
            if self.0 {
                core::task::Poll::Ready(())
            } else {
                self.0 = true;
                cx.waker().wake_by_ref();
                core::task::Poll::Pending
            }
        }
    }

    #[test]
    fn async_pipeline_awaits_each_middleware_in_order() {
        let vp = Viewport::new(800.0, 600.0);
        let offset = Offset::new(10.0);
        let middleware: [&dyn AsyncMiddleware; 2] = [&offset, &Deferred];
        let options = PositionOptions {
            middleware: &middleware,
            ..PositionOptions::default()
        };
        let r = pollster::block_on(compute_position_async(&vp, &REFERENCE, &FLOATING, &options))
            .unwrap();
        assert_eq!(r.coords(), Point::new(86.0, 130.0));
        assert!(r.middleware_data.offset().is_some());
    }

    #[test]
    fn sync_and_async_pipelines_agree() {
        let vp = Viewport::new(200.0, 200.0);
        let reference = Rect::new(0.0, 180.0, 20.0, 195.0);
        let flip = Flip::default();
        let shift = Shift::default();
        let sync = run(&vp, reference, Placement::BOTTOM, &[&flip, &shift]).unwrap();
        let chain: [&dyn AsyncMiddleware; 2] = [&flip, &shift];
        let options = PositionOptions {
            placement: Placement::BOTTOM,
            middleware: &chain,
            ..PositionOptions::default()
        };
        let awaited =
            pollster::block_on(compute_position_async(&vp, &reference, &FLOATING, &options))
                .unwrap();
        assert_eq!(sync.coords(), awaited.coords());
        assert_eq!(sync.placement, awaited.placement);
    }
}
