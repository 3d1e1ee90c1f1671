// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layout-shift detection through an intersection observer.
//!
//! The observer's root is shrunk to exactly the reference's bounding box
//! (via negated root margins) with a threshold of `1.0`. Any movement of the
//! reference then changes its visible ratio and produces a callback. Each
//! callback re-arms the observer around the new box.

use alloc::rc::{Rc, Weak};
use core::cell::{Cell, RefCell};

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use kurbo::{Insets, Rect};

use crate::host::{Callback, Host, IntersectionCallback, IntersectionOptions, Subscription};

/// Root margins that shrink `viewport` to `rect`.
pub(crate) fn root_margin_for(rect: Rect, viewport: Rect) -> Insets {
    let top = (rect.y0 - viewport.y0).floor();
    let right = (viewport.x1 - rect.x1).floor();
    let bottom = (viewport.y1 - rect.y1).floor();
    let left = (rect.x0 - viewport.x0).floor();
    Insets::new(-left, -top, -right, -bottom)
}

struct Inner<H: Host> {
    host: Rc<H>,
    node: H::Node,
    update: Callback,
    last: Cell<Option<Rect>>,
    subscription: RefCell<Option<Subscription>>,
}

/// Watches one node and calls `update` when its bounding box moves.
pub(crate) struct LayoutShift<H: Host> {
    inner: Rc<Inner<H>>,
}

impl<H: Host + 'static> LayoutShift<H> {
    /// Start observing `node`. Returns `None` when the host has no
    /// intersection observer.
    pub(crate) fn observe(host: Rc<H>, node: H::Node, update: Callback) -> Option<Self> {
        let inner = Rc::new(Inner {
            host,
            node,
            update,
            last: Cell::new(None),
            subscription: RefCell::new(None),
        });
        if !arm(&inner, 1.0) {
            return None;
        }
        Some(Self { inner })
    }

    pub(crate) fn cancel(&self) {
        let old = self.inner.subscription.borrow_mut().take();
        drop(old);
    }
}

impl<H: Host> Drop for LayoutShift<H> {
    fn drop(&mut self) {
        let old = self.inner.subscription.borrow_mut().take();
        drop(old);
    }
}

/// Measure the node, notify if it moved since the last arming, and observe
/// again around its current box. Returns `false` only when the host does not
/// support intersection observers.
fn arm<H: Host + 'static>(inner: &Rc<Inner<H>>, threshold: f64) -> bool {
    let old = inner.subscription.borrow_mut().take();
    drop(old);

    let current = inner.host.bounding_rect(inner.node);
    let previous = inner.last.replace(current);
    if previous.is_some() && previous != current {
        (inner.update)();
    }

    let Some(rect) = current else {
        return true;
    };
    if rect.width() <= 0.0 || rect.height() <= 0.0 {
        return true;
    }

    let options = IntersectionOptions {
        root_margin: root_margin_for(rect, inner.host.viewport_rect()),
        threshold: threshold.clamp(0.0, 1.0),
    };
    let weak = Rc::downgrade(inner);
    let first = Cell::new(true);
    let callback: IntersectionCallback = Rc::new(move |ratio| {
        on_intersection(&weak, ratio, options.threshold, first.replace(false));
    });
    match inner.host.observe_intersection(inner.node, options, callback) {
        Some(subscription) => {
            *inner.subscription.borrow_mut() = Some(subscription);
            true
        }
        None => false,
    }
}

fn on_intersection<H: Host + 'static>(
    weak: &Weak<Inner<H>>,
    ratio: f64,
    threshold: f64,
    first: bool,
) {
    let Some(inner) = weak.upgrade() else {
        return;
    };
    if inner.subscription.borrow().is_none() {
        return;
    }
    if ratio != threshold {
        if !first {
            arm(&inner, 1.0);
        } else if ratio > 0.0 {
            // Partially clipped from the start: watch for changes from here.
            arm(&inner, ratio);
        }
        return;
    }
    if inner.last.get() != inner.host.bounding_rect(inner.node) {
        arm(&inner, 1.0);
    }
}

impl<H: Host> core::fmt::Debug for LayoutShift<H> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LayoutShift")
            .field("node", &self.inner.node)
            .field("last", &self.inner.last.get())
            .finish_non_exhaustive()
    }
}
