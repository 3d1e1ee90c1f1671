// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The auto-update orchestrator.

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::Cell;
use core::fmt;

use kurbo::Rect;
use smallvec::SmallVec;

use crate::ancestors::AncestorCache;
use crate::host::{Callback, FrameId, Host, ScrollTarget, Subscription};
use crate::layout_shift::LayoutShift;

bitflags::bitflags! {
    /// Which changes re-run `update`.
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
    pub struct Triggers: u8 {
        /// Scrolling of any scroll container above either element, or of the window.
        const ANCESTOR_SCROLL = 1 << 0;
        /// Window resizes.
        const ANCESTOR_RESIZE = 1 << 1;
        /// Size changes of either element.
        const ELEMENT_RESIZE = 1 << 2;
        /// Movement of the reference caused by layout elsewhere on the page.
        const LAYOUT_SHIFT = 1 << 3;
        /// Poll the reference's bounding box every frame.
        const ANIMATION_FRAME = 1 << 4;
    }
}

impl Default for Triggers {
    fn default() -> Self {
        Self::ANCESTOR_SCROLL | Self::ANCESTOR_RESIZE | Self::ELEMENT_RESIZE | Self::LAYOUT_SHIFT
    }
}

/// Options for [`auto_update`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct AutoUpdateOptions {
    /// Enabled triggers.
    pub triggers: Triggers,
}

impl AutoUpdateOptions {
    /// Replace the enabled triggers.
    #[must_use]
    pub fn triggers(mut self, triggers: Triggers) -> Self {
        self.triggers = triggers;
        self
    }

    /// Turn per-frame polling on or off.
    ///
    /// Polling catches movement that produces no event at all, such as a
    /// transform animation on the reference.
    #[must_use]
    pub fn animation_frame(mut self, enabled: bool) -> Self {
        self.triggers.set(Triggers::ANIMATION_FRAME, enabled);
        self
    }
}

/// A running auto-update. Cancel it (or drop it) to stop.
pub struct AutoUpdate {
    active: Rc<Cell<bool>>,
    subscriptions: Vec<Subscription>,
}

impl AutoUpdate {
    /// Remove every listener and observer. Later calls do nothing, and
    /// `update` is never invoked again.
    pub fn cancel(&mut self) {
        if !self.active.replace(false) {
            return;
        }
        #[cfg(feature = "tracing")]
        tracing::debug!(
            subscriptions = self.subscriptions.len(),
            "auto-update cancelled"
        );
        for subscription in &mut self.subscriptions {
            subscription.cancel();
        }
        self.subscriptions.clear();
    }

    /// Whether [`AutoUpdate::cancel`] has not yet run.
    pub fn is_active(&self) -> bool {
        self.active.get()
    }

    /// Number of live host subscriptions.
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }
}

impl Drop for AutoUpdate {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl fmt::Debug for AutoUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AutoUpdate")
            .field("active", &self.active.get())
            .field("subscriptions", &self.subscriptions.len())
            .finish()
    }
}

/// Keep `floating` positioned next to `reference`.
///
/// Calls `update` once right away, then again whenever one of the enabled
/// [`Triggers`] fires. Triggers are not coalesced. Observers the host does
/// not support are skipped.
///
/// `update` typically calls [`position_nodes`](crate::position_nodes) and
/// applies the result.
pub fn auto_update<H: Host + 'static>(
    host: &Rc<H>,
    reference: H::Node,
    floating: H::Node,
    update: impl Fn() + 'static,
    options: &AutoUpdateOptions,
) -> AutoUpdate {
    auto_update_with_cache(
        host,
        reference,
        floating,
        update,
        options,
        &AncestorCache::new(),
    )
}

/// [`auto_update`] with scroll containers looked up through `cache`.
pub fn auto_update_with_cache<H: Host + 'static>(
    host: &Rc<H>,
    reference: H::Node,
    floating: H::Node,
    update: impl Fn() + 'static,
    options: &AutoUpdateOptions,
    cache: &AncestorCache<H::Node>,
) -> AutoUpdate {
    let active = Rc::new(Cell::new(true));
    let update: Callback = {
        let active = active.clone();
        Rc::new(move || {
            if active.get() {
                update();
            }
        })
    };
    let triggers = options.triggers;
    let mut subscriptions = Vec::new();

    if triggers.intersects(Triggers::ANCESTOR_SCROLL) {
        let mut targets: SmallVec<[ScrollTarget<H::Node>; 16]> = SmallVec::new();
        for node in cache
            .get(&**host, reference)
            .into_iter()
            .chain(cache.get(&**host, floating))
        {
            let target = ScrollTarget::Node(node);
            if !targets.contains(&target) {
                targets.push(target);
            }
        }
        targets.push(ScrollTarget::Window);
        for target in targets {
            subscriptions.push(host.listen_scroll(target, update.clone()));
        }
    }

    if triggers.intersects(Triggers::ANCESTOR_RESIZE) {
        subscriptions.push(host.listen_resize(update.clone()));
    }

    if triggers.intersects(Triggers::ELEMENT_RESIZE) {
        for node in [reference, floating] {
            match host.observe_size(node, update.clone()) {
                Some(subscription) => subscriptions.push(subscription),
                None => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(node = ?node, "size observer unsupported; skipped");
                }
            }
        }
    }

    if triggers.intersects(Triggers::LAYOUT_SHIFT) {
        match LayoutShift::observe(host.clone(), reference, update.clone()) {
            Some(shift) => subscriptions.push(Subscription::new(move || shift.cancel())),
            None => {
                #[cfg(feature = "tracing")]
                tracing::debug!("intersection observer unsupported; layout shift skipped");
            }
        }
    }

    if triggers.intersects(Triggers::ANIMATION_FRAME) {
        let frames = Rc::new(FrameLoop {
            host: host.clone(),
            reference,
            update: update.clone(),
            last: Cell::new(None),
            pending: Cell::new(None),
            cancelled: Cell::new(false),
        });
        tick(&frames);
        if frames.pending.get().is_some() {
            subscriptions.push(Subscription::new(move || {
                frames.cancelled.set(true);
                if let Some(id) = frames.pending.take() {
                    frames.host.cancel_animation_frame(id);
                }
            }));
        } else {
            #[cfg(feature = "tracing")]
            tracing::debug!("animation frames unsupported; polling skipped");
        }
    }

    #[cfg(feature = "tracing")]
    tracing::debug!(
        reference = ?reference,
        floating = ?floating,
        triggers = ?triggers,
        subscriptions = subscriptions.len(),
        "auto-update started"
    );

    update();
    AutoUpdate {
        active,
        subscriptions,
    }
}

struct FrameLoop<H: Host> {
    host: Rc<H>,
    reference: H::Node,
    update: Callback,
    last: Cell<Option<Rect>>,
    pending: Cell<Option<FrameId>>,
    cancelled: Cell<bool>,
}

fn tick<H: Host + 'static>(frames: &Rc<FrameLoop<H>>) {
    if frames.cancelled.get() {
        return;
    }
    let current = frames.host.bounding_rect(frames.reference);
    let previous = frames.last.replace(current);
    if previous.is_some() && previous != current {
        (frames.update)();
    }
    let weak = Rc::downgrade(frames);
    let id = frames.host.request_animation_frame(Box::new(move || {
        if let Some(frames) = weak.upgrade() {
            tick(&frames);
        }
    }));
    frames.pending.set(id);
}
