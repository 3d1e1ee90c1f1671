// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Middleware contracts and the built-in middleware.
//!
//! A middleware reads a [`MiddlewareState`] snapshot and returns a
//! [`MiddlewareResult`]: an [`Adjustment`] to the running position plus
//! optional [`MiddlewareData`] recorded under the middleware's name.
//!
//! Built-ins:
//! - [`Offset`]: move away from (or along) the reference.
//! - [`Flip`]: switch to a fallback placement when the current one overflows.
//! - [`Shift`]: slide along an axis to stay inside the boundary.
//! - [`Arrow`]: position an arrow element so it points at the reference.
//! - [`Size`]: report the space available to the floating element.
//! - [`AutoPlacement`]: pick the placement with the most room.
//! - [`Hide`]: report whether the reference is clipped or the floating element escaped.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::sync::Arc;
use core::any::Any;
use core::fmt;
use core::future::Future;
use core::pin::Pin;

use hashbrown::HashMap;
use kurbo::{Point, Rect};

use crate::error::Error;
use crate::geometry::ElementRects;
use crate::placement::Placement;
use crate::platform::{BoundaryCache, Measure, Platform};
use crate::Strategy;

mod arrow;
mod auto_placement;
mod flip;
mod hide;
mod offset;
mod shift;
mod size;

#[cfg(test)]
pub(crate) mod testing;

pub use arrow::{Arrow, ArrowData, ArrowElement};
pub use auto_placement::{AutoPlacement, AutoPlacementData, AutoPlacementOptions, RankedPlacement};
pub use flip::{FallbackStrategy, Flip, FlipData, FlipOptions, PlacementOverflows};
pub use hide::{Hide, HideData, HideOptions, HideStrategy};
pub use offset::{Offset, OffsetData, OffsetOptions};
pub use shift::{LimitShift, Shift, ShiftAxes, ShiftData, ShiftOptions};
pub use size::{Size, SizeApply, SizeData};

/// The reference and floating elements of a computation.
#[derive(Copy, Clone)]
pub struct Elements<'a> {
    /// The anchor element.
    pub reference: &'a dyn Measure,
    /// The element being positioned.
    pub floating: &'a dyn Measure,
}

impl fmt::Debug for Elements<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Elements").finish_non_exhaustive()
    }
}

/// Read-only snapshot handed to each middleware.
///
/// Middleware never mutate the state; they describe changes through their
/// [`MiddlewareResult`].
#[derive(Copy, Clone)]
pub struct MiddlewareState<'a> {
    /// Running x coordinate of the floating element.
    pub x: f64,
    /// Running y coordinate of the floating element.
    pub y: f64,
    /// Placement requested by the caller.
    pub initial_placement: Placement,
    /// Running placement.
    pub placement: Placement,
    /// Positioning strategy hint.
    pub strategy: Strategy,
    /// Rects measured for this pass.
    pub rects: ElementRects,
    /// The elements being positioned.
    pub elements: Elements<'a>,
    /// Data recorded so far by earlier middleware in this call.
    pub middleware_data: &'a MiddlewareDataMap,
    /// The host platform.
    pub platform: &'a dyn Platform,
    /// Whether the floating element lays out right-to-left.
    pub rtl: bool,
    /// Boundary measurements memoized for this pass.
    pub cache: &'a BoundaryCache,
}

impl MiddlewareState<'_> {
    /// The running coordinates.
    #[inline]
    pub fn coords(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// The floating element's rect at the running coordinates.
    #[inline]
    pub fn floating_rect(&self) -> Rect {
        Rect::from_origin_size(self.coords(), self.rects.floating.size())
    }
}

impl fmt::Debug for MiddlewareState<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MiddlewareState")
            .field("x", &self.x)
            .field("y", &self.y)
            .field("initial_placement", &self.initial_placement)
            .field("placement", &self.placement)
            .field("strategy", &self.strategy)
            .field("rects", &self.rects)
            .field("middleware_data", &self.middleware_data)
            .field("rtl", &self.rtl)
            .finish_non_exhaustive()
    }
}

/// How a middleware changes the running position.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Adjustment {
    /// Leave everything as is.
    NoChange,
    /// Move the floating element to new coordinates.
    Reposition {
        /// New x coordinate.
        x: f64,
        /// New y coordinate.
        y: f64,
    },
    /// Change the placement without recomputing coordinates.
    Replace {
        /// New placement.
        placement: Placement,
    },
    /// Restart positioning at a placement: optionally switch placement and
    /// re-measure, then recompute the base coordinates, discarding the running
    /// ones. The remaining middleware continue from the new anchor.
    Reset {
        /// New placement, or `None` to keep the running one.
        placement: Option<Placement>,
        /// Re-read the element rects before recomputing.
        remeasure: bool,
    },
}

/// What a middleware returns.
#[derive(Clone, Debug)]
pub struct MiddlewareResult {
    /// Change to the running position.
    pub adjustment: Adjustment,
    /// Data to record under the middleware's name. Replaces earlier data for that name.
    pub data: Option<MiddlewareData>,
}

impl MiddlewareResult {
    /// No change, no data.
    pub const fn none() -> Self {
        Self {
            adjustment: Adjustment::NoChange,
            data: None,
        }
    }

    /// Move to `(x, y)`.
    pub const fn reposition(x: f64, y: f64) -> Self {
        Self {
            adjustment: Adjustment::Reposition { x, y },
            data: None,
        }
    }

    /// Reset onto `placement`.
    pub const fn reset_to(placement: Placement) -> Self {
        Self {
            adjustment: Adjustment::Reset {
                placement: Some(placement),
                remeasure: false,
            },
            data: None,
        }
    }

    /// Attach data.
    #[must_use]
    pub fn with_data(mut self, data: impl Into<MiddlewareData>) -> Self {
        self.data = Some(data.into());
        self
    }
}

impl Default for MiddlewareResult {
    fn default() -> Self {
        Self::none()
    }
}

/// Data contributed by a middleware.
///
/// Built-in middleware use their own variants. Other middleware store
/// anything in [`MiddlewareData::Custom`] and read it back with
/// [`MiddlewareDataMap::custom`].
#[derive(Clone)]
pub enum MiddlewareData {
    /// From [`Offset`].
    Offset(OffsetData),
    /// From [`Flip`].
    Flip(FlipData),
    /// From [`Shift`].
    Shift(ShiftData),
    /// From [`Arrow`].
    Arrow(ArrowData),
    /// From [`Size`].
    Size(SizeData),
    /// From [`AutoPlacement`].
    AutoPlacement(AutoPlacementData),
    /// From [`Hide`].
    Hide(HideData),
    /// Anything else.
    Custom(Arc<dyn Any + Send + Sync>),
}

impl MiddlewareData {
    /// Wrap a custom value.
    pub fn custom<T: Any + Send + Sync>(value: T) -> Self {
        Self::Custom(Arc::new(value))
    }
}

impl fmt::Debug for MiddlewareData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Offset(d) => f.debug_tuple("Offset").field(d).finish(),
            Self::Flip(d) => f.debug_tuple("Flip").field(d).finish(),
            Self::Shift(d) => f.debug_tuple("Shift").field(d).finish(),
            Self::Arrow(d) => f.debug_tuple("Arrow").field(d).finish(),
            Self::Size(d) => f.debug_tuple("Size").field(d).finish(),
            Self::AutoPlacement(d) => f.debug_tuple("AutoPlacement").field(d).finish(),
            Self::Hide(d) => f.debug_tuple("Hide").field(d).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

macro_rules! impl_data_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for MiddlewareData {
                fn from(data: $ty) -> Self {
                    Self::$variant(data)
                }
            }
        )*
    };
}

impl_data_from! {
    OffsetData => Offset,
    FlipData => Flip,
    ShiftData => Shift,
    ArrowData => Arrow,
    SizeData => Size,
    AutoPlacementData => AutoPlacement,
    HideData => Hide,
}

/// Middleware data keyed by middleware name.
#[derive(Clone, Debug, Default)]
pub struct MiddlewareDataMap {
    entries: HashMap<String, MiddlewareData>,
}

impl MiddlewareDataMap {
    /// An empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `data` for `name`, replacing what was there.
    pub fn insert(&mut self, name: &str, data: MiddlewareData) {
        match self.entries.get_mut(name) {
            Some(slot) => *slot = data,
            None => {
                self.entries.insert(String::from(name), data);
            }
        }
    }

    /// Data recorded under `name`.
    pub fn get(&self, name: &str) -> Option<&MiddlewareData> {
        self.entries.get(name)
    }

    /// Whether anything is recorded under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Number of names with data.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no middleware recorded data.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(name, data)` pairs in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &MiddlewareData)> + '_ {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Custom data recorded under `name`, if it has type `T`.
    pub fn custom<T: Any>(&self, name: &str) -> Option<&T> {
        match self.get(name)? {
            MiddlewareData::Custom(value) => value.downcast_ref::<T>(),
            _ => None,
        }
    }
}

macro_rules! typed_getters {
    ($($fn_name:ident, $name:literal => $variant:ident($ty:ty)),* $(,)?) => {
        impl MiddlewareDataMap {
            $(
                #[doc = concat!("Data from the built-in `", $name, "` middleware.")]
                pub fn $fn_name(&self) -> Option<&$ty> {
                    match self.get($name)? {
                        MiddlewareData::$variant(d) => Some(d),
                        _ => None,
                    }
                }
            )*
        }
    };
}

typed_getters! {
    offset, "offset" => Offset(OffsetData),
    flip, "flip" => Flip(FlipData),
    shift, "shift" => Shift(ShiftData),
    arrow, "arrow" => Arrow(ArrowData),
    size, "size" => Size(SizeData),
    auto_placement, "autoPlacement" => AutoPlacement(AutoPlacementData),
    hide, "hide" => Hide(HideData),
}

/// A step in the positioning pipeline.
pub trait Middleware {
    /// Name used to key this middleware's data.
    fn name(&self) -> &str;

    /// Compute an adjustment from the current state.
    fn compute(&self, state: &MiddlewareState<'_>) -> Result<MiddlewareResult, Error>;
}

/// Future returned by [`AsyncMiddleware::compute_async`].
pub type MiddlewareFuture<'a> = Pin<Box<dyn Future<Output = Result<MiddlewareResult, Error>> + 'a>>;

/// A pipeline step that may suspend, for example to await a measurement.
///
/// Every [`Middleware`] is also an `AsyncMiddleware` that completes immediately.
pub trait AsyncMiddleware {
    /// Name used to key this middleware's data.
    fn name(&self) -> &str;

    /// Compute an adjustment from the current state.
    fn compute_async<'a>(&'a self, state: &'a MiddlewareState<'a>) -> MiddlewareFuture<'a>;
}

impl<M: Middleware + ?Sized> AsyncMiddleware for M {
    fn name(&self) -> &str {
        Middleware::name(self)
    }

    fn compute_async<'a>(&'a self, state: &'a MiddlewareState<'a>) -> MiddlewareFuture<'a> {
        Box::pin(core::future::ready(self.compute(state)))
    }
}
