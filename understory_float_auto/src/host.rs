// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The host environment: node geometry, computed styles, and change sources.

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::string::String;
use core::fmt;
use core::hash::Hash;

use kurbo::{Insets, Rect};
use understory_float::{
    ComputePositionResult, Error, Measure, Middleware, Platform, PositionOptions,
    compute_position,
};

/// A callback invoked by the host when something changed.
pub type Callback = Rc<dyn Fn()>;

/// A callback receiving an intersection ratio in `[0, 1]`.
pub type IntersectionCallback = Rc<dyn Fn(f64)>;

/// Where a scroll listener is attached.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ScrollTarget<N> {
    /// The window (or top-level scroll surface).
    Window,
    /// A scroll container.
    Node(N),
}

/// Configuration for an intersection observer.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct IntersectionOptions {
    /// Growth applied to the root (viewport) rect before intersecting.
    /// Negative values shrink it, in CSS `rootMargin` fashion.
    pub root_margin: Insets,
    /// Ratio at which the callback fires.
    pub threshold: f64,
}

/// Identifier of a scheduled animation frame.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct FrameId(pub u64);

/// A live registration with the host. Dropping it unsubscribes.
pub struct Subscription {
    cleanup: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// A subscription that runs `cleanup` when cancelled or dropped.
    pub fn new(cleanup: impl FnOnce() + 'static) -> Self {
        Self {
            cleanup: Some(Box::new(cleanup)),
        }
    }

    /// A subscription with nothing to clean up.
    pub fn empty() -> Self {
        Self { cleanup: None }
    }

    /// Unsubscribe now. Later calls do nothing.
    pub fn cancel(&mut self) {
        if let Some(cleanup) = self.cleanup.take() {
            cleanup();
        }
    }

    /// Whether cleanup has not yet run.
    pub fn is_active(&self) -> bool {
        self.cleanup.is_some()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}

/// What the auto-update orchestrator needs from the host environment.
///
/// Optional capabilities return `Option`; `None` means the host does not
/// support them and the corresponding trigger is skipped.
pub trait Host {
    /// Handle to a node in the host's tree.
    type Node: Copy + Eq + Hash + fmt::Debug + 'static;

    /// Bounding box of `node`, or `None` if it is not rendered.
    fn bounding_rect(&self, node: Self::Node) -> Option<Rect>;

    /// The parent of `node`, or `None` at the root.
    fn parent(&self, node: Self::Node) -> Option<Self::Node>;

    /// Computed value of a CSS-like `property` on `node`.
    fn computed_style(&self, node: Self::Node, property: &str) -> Option<String>;

    /// The visible viewport.
    fn viewport_rect(&self) -> Rect;

    /// Device pixels per layout pixel.
    fn device_pixel_ratio(&self) -> f64 {
        1.0
    }

    /// Call `callback` whenever `target` scrolls.
    fn listen_scroll(&self, target: ScrollTarget<Self::Node>, callback: Callback) -> Subscription;

    /// Call `callback` whenever the window resizes.
    fn listen_resize(&self, callback: Callback) -> Subscription;

    /// Call `callback` whenever the size of `node` changes.
    fn observe_size(&self, _node: Self::Node, _callback: Callback) -> Option<Subscription> {
        None
    }

    /// Call `callback` with the visible ratio of `node` whenever it crosses
    /// `options.threshold` within the margin-adjusted viewport. Hosts deliver
    /// one initial callback after observing.
    fn observe_intersection(
        &self,
        _node: Self::Node,
        _options: IntersectionOptions,
        _callback: IntersectionCallback,
    ) -> Option<Subscription> {
        None
    }

    /// Run `callback` before the next frame.
    fn request_animation_frame(&self, _callback: Box<dyn FnOnce()>) -> Option<FrameId> {
        None
    }

    /// Cancel a frame requested with [`Host::request_animation_frame`].
    fn cancel_animation_frame(&self, _id: FrameId) {}
}

/// A host node seen as a [`Measure`].
pub struct HostElement<'h, H: Host> {
    host: &'h H,
    node: H::Node,
}

impl<'h, H: Host> HostElement<'h, H> {
    /// Wrap `node`.
    pub fn new(host: &'h H, node: H::Node) -> Self {
        Self { host, node }
    }

    /// The wrapped node.
    pub fn node(&self) -> H::Node {
        self.node
    }
}

impl<H: Host> Measure for HostElement<'_, H> {
    fn bounding_rect(&self) -> Option<Rect> {
        self.host.bounding_rect(self.node)
    }
}

impl<H: Host> fmt::Debug for HostElement<'_, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("HostElement").field(&self.node).finish()
    }
}

/// A [`Host`] seen as a [`Platform`] for one floating element.
///
/// Text direction comes from the floating element's computed `direction`.
pub struct HostPlatform<'h, H: Host> {
    host: &'h H,
    floating: H::Node,
}

impl<'h, H: Host> HostPlatform<'h, H> {
    /// A platform positioning `floating` inside `host`.
    pub fn new(host: &'h H, floating: H::Node) -> Self {
        Self { host, floating }
    }
}

impl<H: Host> Platform for HostPlatform<'_, H> {
    fn viewport_rect(&self) -> Rect {
        self.host.viewport_rect()
    }

    fn is_rtl(&self, _floating: &dyn Measure) -> bool {
        self.host
            .computed_style(self.floating, "direction")
            .is_some_and(|d| d.trim() == "rtl")
    }

    fn device_pixel_ratio(&self) -> f64 {
        self.host.device_pixel_ratio()
    }
}

impl<H: Host> fmt::Debug for HostPlatform<'_, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostPlatform")
            .field("floating", &self.floating)
            .finish_non_exhaustive()
    }
}

/// [`compute_position`] for two host nodes.
pub fn position_nodes<H: Host>(
    host: &H,
    reference: H::Node,
    floating: H::Node,
    options: &PositionOptions<'_, dyn Middleware + '_>,
) -> Result<ComputePositionResult, Error> {
    compute_position(
        &HostPlatform::new(host, floating),
        &HostElement::new(host, reference),
        &HostElement::new(host, floating),
        options,
    )
}
