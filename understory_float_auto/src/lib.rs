// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Float Auto: keep floating elements positioned as things move.
//!
//! [`understory_float`] computes a position once. This crate re-runs that
//! computation whenever the page changes in a way that could move the
//! reference or the floating element:
//!
//! - scrolling of any scroll container above either element, or the window,
//! - window resizes,
//! - size changes of either element,
//! - layout shifts that move the reference without any scroll or resize,
//! - and, opt-in, every animation frame.
//!
//! The environment is abstracted as a [`Host`]: a tree of nodes with
//! bounding boxes and computed styles, plus event sources. Hosts that lack an
//! observer return `None` from the corresponding method and the trigger is
//! skipped.
//!
//! [`HostElement`] and [`HostPlatform`] adapt host nodes for the engine, and
//! [`position_nodes`] runs [`understory_float::compute_position`] for two
//! nodes.
//!
//! ## Features
//!
//! - `std` *(default)*: use `std` for float math.
//! - `libm`: float math through `libm` for `no_std` targets.
//! - `tracing`: log subscription setup, skipped observers, and cleanup.
//!
//! # Example
//!
//! ```rust
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! use kurbo::Rect;
//! use understory_float::{Flip, Middleware, Placement, PositionOptions};
//! use understory_float_auto::{
//!     AutoUpdateOptions, Callback, Host, ScrollTarget, Subscription, auto_update, position_nodes,
//! };
//!
//! /// Two fixed nodes in a 300×200 window, with no events.
//! struct Page;
//!
//! impl Host for Page {
//!     type Node = u8;
//!     fn bounding_rect(&self, node: u8) -> Option<Rect> {
//!         match node {
//!             0 => Some(Rect::new(20.0, 170.0, 60.0, 190.0)),
//!             _ => Some(Rect::new(0.0, 0.0, 100.0, 24.0)),
//!         }
//!     }
//!     fn parent(&self, _: u8) -> Option<u8> {
//!         None
//!     }
//!     fn computed_style(&self, _: u8, _: &str) -> Option<String> {
//!         None
//!     }
//!     fn viewport_rect(&self) -> Rect {
//!         Rect::new(0.0, 0.0, 300.0, 200.0)
//!     }
//!     fn listen_scroll(&self, _: ScrollTarget<u8>, _: Callback) -> Subscription {
//!         Subscription::empty()
//!     }
//!     fn listen_resize(&self, _: Callback) -> Subscription {
//!         Subscription::empty()
//!     }
//! }
//!
//! let host = Rc::new(Page);
//! let placed = Rc::new(Cell::new(None));
//!
//! let update = {
//!     let host = host.clone();
//!     let placed = placed.clone();
//!     move || {
//!         let flip = Flip::default();
//!         let middleware: [&dyn Middleware; 1] = [&flip];
//!         let options = PositionOptions::default()
//!             .placement(Placement::BOTTOM)
//!             .middleware(&middleware);
//!         if let Ok(result) = position_nodes(&*host, 0, 1, &options) {
//!             placed.set(Some((result.placement, result.x, result.y)));
//!         }
//!     }
//! };
//!
//! let mut handle = auto_update(&host, 0, 1, update, &AutoUpdateOptions::default());
//! // The first update runs immediately.
//! assert_eq!(placed.get(), Some((Placement::TOP, -10.0, 146.0)));
//! handle.cancel();
//! ```

#![no_std]

extern crate alloc;

mod ancestors;
mod auto_update;
mod host;
mod layout_shift;

#[cfg(test)]
mod mock;

pub use ancestors::{AncestorCache, Ancestors, is_scroll_container, overflow_ancestors};
pub use auto_update::{AutoUpdate, AutoUpdateOptions, Triggers, auto_update, auto_update_with_cache};
pub use host::{
    Callback, FrameId, Host, HostElement, HostPlatform, IntersectionCallback, IntersectionOptions,
    ScrollTarget, Subscription, position_nodes,
};
