// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Float: anchored positioning for tooltips, popovers, and menus.
//!
//! Given a *reference* element and a *floating* element, this crate computes
//! where the floating element should be drawn so it sits next to the
//! reference and stays inside a clipping boundary.
//!
//! - A [`Placement`] is one of 12 positions: a [`Side`] plus an optional
//!   [`Alignment`] (`bottom`, `bottom-start`, `right-end`, …).
//! - [`compute_coords`] gives the base anchor for a placement.
//! - [`compute_position`] measures both elements once, computes the base
//!   anchor, then folds a list of [`Middleware`] over the running position.
//!   A middleware that changes placement resets the anchor; the ones after it
//!   work from the new anchor, so put [`Flip`] before [`Offset`].
//! - Built-in middleware cover the usual needs: [`Offset`], [`Flip`],
//!   [`Shift`], [`Arrow`], [`Size`], [`AutoPlacement`], and [`Hide`].
//!
//! Elements are anything implementing [`Measure`]: a host node, a virtual
//! anchor such as a caret, or a plain [`kurbo::Rect`]. The environment is a
//! [`Platform`]; [`Viewport`] is the simplest one.
//!
//! The crate never applies the result. Callers set the returned `x`/`y` as
//! the floating element's position with the returned [`Strategy`].
//! Re-running the computation when the page scrolls or reflows is the job of
//! `understory_float_auto`.
//!
//! ## Features
//!
//! - `std` *(default)*: use `std` for float math.
//! - `libm`: float math through `libm` for `no_std` targets.
//! - `tracing`: emit `tracing` spans and events for each computation,
//!   including resets and placement changes.
//!
//! # Example
//!
//! ```rust
//! use kurbo::Rect;
//! use understory_float::{
//!     Flip, Middleware, Offset, Placement, PositionOptions, Shift, Viewport, compute_position,
//! };
//!
//! let viewport = Viewport::new(300.0, 200.0);
//! // A button near the bottom edge.
//! let reference = Rect::new(20.0, 170.0, 60.0, 190.0);
//! let tooltip = Rect::new(0.0, 0.0, 100.0, 24.0);
//!
//! let flip = Flip::default();
//! let offset = Offset::new(6.0);
//! let shift = Shift::default();
//! let middleware: [&dyn Middleware; 3] = [&flip, &offset, &shift];
//!
//! let result = compute_position(
//!     &viewport,
//!     &reference,
//!     &tooltip,
//!     &PositionOptions::default()
//!         .placement(Placement::BOTTOM)
//!         .middleware(&middleware),
//! )
//! .unwrap();
//!
//! // No room below, so the tooltip flips above, then shifts off the left edge.
//! assert_eq!(result.placement, Placement::TOP);
//! assert_eq!((result.x, result.y), (0.0, 140.0));
//! assert!(result.middleware_data.flip().is_some_and(|f| f.flipped));
//! ```
//!
//! Middleware data is keyed by middleware name. Custom middleware store
//! their own types with [`MiddlewareData::custom`]:
//!
//! ```rust
//! use kurbo::Rect;
//! use understory_float::{
//!     Error, Middleware, MiddlewareData, MiddlewareResult, MiddlewareState, PositionOptions,
//!     Viewport, compute_position,
//! };
//!
//! /// Records the distance between the reference and the floating element.
//! struct Gap;
//!
//! impl Middleware for Gap {
//!     fn name(&self) -> &str {
//!         "gap"
//!     }
//!
//!     fn compute(&self, state: &MiddlewareState<'_>) -> Result<MiddlewareResult, Error> {
//!         let gap = state.y - state.rects.reference.y1;
//!         Ok(MiddlewareResult::none().with_data(MiddlewareData::custom(gap)))
//!     }
//! }
//!
//! let middleware: [&dyn Middleware; 1] = [&Gap];
//! let result = compute_position(
//!     &Viewport::new(100.0, 100.0),
//!     &Rect::new(10.0, 10.0, 20.0, 20.0),
//!     &Rect::new(0.0, 0.0, 5.0, 5.0),
//!     &PositionOptions::default().middleware(&middleware),
//! )
//! .unwrap();
//! assert_eq!(result.middleware_data.custom::<f64>("gap"), Some(&0.0));
//! ```

#![no_std]

extern crate alloc;

mod compute;
mod coords;
mod error;
mod geometry;
pub mod middleware;
mod overflow;
mod placement;
mod platform;

pub use compute::{
    ComputePositionResult, PositionOptions, Strategy, compute_position, compute_position_async,
};
pub use coords::compute_coords;
pub use error::{ElementRole, Error};
pub use geometry::{ElementRects, Padding, SideValues, clamp};
pub use middleware::{
    Adjustment, Arrow, ArrowData, ArrowElement, AsyncMiddleware, AutoPlacement,
    AutoPlacementData, AutoPlacementOptions, Elements, FallbackStrategy, Flip, FlipData,
    FlipOptions, Hide, HideData, HideOptions, HideStrategy, LimitShift, Middleware,
    MiddlewareData, MiddlewareDataMap, MiddlewareFuture, MiddlewareResult, MiddlewareState,
    Offset, OffsetData, OffsetOptions, PlacementOverflows, RankedPlacement, Shift, ShiftAxes,
    ShiftData, ShiftOptions, Size, SizeApply, SizeData,
};
pub use overflow::{
    Boundary, DetectOverflowOptions, ElementContext, Overflow, RootBoundary, detect_overflow,
    detect_rect_overflow, has_overflow,
};
pub use placement::{Alignment, Axis, Placement, Side};
pub use platform::{
    BoundaryCache, Measure, Platform, Viewport, dimensions, measure, read_element_rects,
};
