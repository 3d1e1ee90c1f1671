// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-memory host used by the unit tests.

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};

use hashbrown::HashMap;
use kurbo::Rect;

use crate::host::{
    Callback, FrameId, Host, IntersectionCallback, IntersectionOptions, ScrollTarget,
    Subscription,
};

type Frame = (u64, Box<dyn FnOnce()>);

#[derive(Default)]
struct Registry {
    next_id: Cell<u64>,
    scroll: RefCell<Vec<(u64, ScrollTarget<u32>, Callback)>>,
    resize: RefCell<Vec<(u64, Callback)>>,
    size: RefCell<Vec<(u64, u32, Callback)>>,
    intersection: RefCell<Vec<(u64, u32, IntersectionOptions, IntersectionCallback)>>,
    frames: RefCell<Vec<Frame>>,
}

impl Registry {
    fn id(&self) -> u64 {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        id
    }
}

pub(crate) struct MockHost {
    rects: RefCell<HashMap<u32, Rect>>,
    parents: RefCell<HashMap<u32, u32>>,
    styles: RefCell<HashMap<(u32, String), String>>,
    viewport: Cell<Rect>,
    registry: Rc<Registry>,
    pub(crate) observers: Cell<bool>,
    pub(crate) style_reads: Cell<u32>,
    pub(crate) pixel_ratio: Cell<f64>,
}

impl MockHost {
    pub(crate) fn new(width: f64, height: f64) -> Self {
        Self {
            rects: RefCell::default(),
            parents: RefCell::default(),
            styles: RefCell::default(),
            viewport: Cell::new(Rect::new(0.0, 0.0, width, height)),
            registry: Rc::default(),
            observers: Cell::new(true),
            style_reads: Cell::new(0),
            pixel_ratio: Cell::new(1.0),
        }
    }

    pub(crate) fn add_node(&self, id: u32, parent: Option<u32>, rect: Rect) {
        self.rects.borrow_mut().insert(id, rect);
        if let Some(parent) = parent {
            self.parents.borrow_mut().insert(id, parent);
        }
    }

    pub(crate) fn set_rect(&self, id: u32, rect: Rect) {
        self.rects.borrow_mut().insert(id, rect);
    }

    pub(crate) fn set_style(&self, id: u32, property: &str, value: &str) {
        self.styles
            .borrow_mut()
            .insert((id, String::from(property)), String::from(value));
    }

    pub(crate) fn listener_count(&self) -> usize {
        let r = &self.registry;
        r.scroll.borrow().len()
            + r.resize.borrow().len()
            + r.size.borrow().len()
            + r.intersection.borrow().len()
            + r.frames.borrow().len()
    }

    pub(crate) fn scroll_targets(&self) -> Vec<ScrollTarget<u32>> {
        self.registry
            .scroll
            .borrow()
            .iter()
            .map(|(_, t, _)| *t)
            .collect()
    }

    pub(crate) fn intersection_options(&self, node: u32) -> Option<IntersectionOptions> {
        self.registry
            .intersection
            .borrow()
            .iter()
            .rev()
            .find(|(_, n, ..)| *n == node)
            .map(|(_, _, o, _)| *o)
    }

    pub(crate) fn fire_scroll(&self, target: ScrollTarget<u32>) {
        let callbacks: Vec<_> = self
            .registry
            .scroll
            .borrow()
            .iter()
            .filter(|(_, t, _)| *t == target)
            .map(|(_, _, cb)| cb.clone())
            .collect();
        for cb in callbacks {
            cb();
        }
    }

    pub(crate) fn fire_resize(&self) {
        let callbacks: Vec<_> = self
            .registry
            .resize
            .borrow()
            .iter()
            .map(|(_, cb)| cb.clone())
            .collect();
        for cb in callbacks {
            cb();
        }
    }

    pub(crate) fn fire_size(&self, node: u32) {
        let callbacks: Vec<_> = self
            .registry
            .size
            .borrow()
            .iter()
            .filter(|(_, n, _)| *n == node)
            .map(|(_, _, cb)| cb.clone())
            .collect();
        for cb in callbacks {
            cb();
        }
    }

    pub(crate) fn fire_intersection(&self, node: u32, ratio: f64) {
        let callbacks: Vec<_> = self
            .registry
            .intersection
            .borrow()
            .iter()
            .filter(|(_, n, ..)| *n == node)
            .map(|(.., cb)| cb.clone())
            .collect();
        for cb in callbacks {
            cb(ratio);
        }
    }

    pub(crate) fn run_frame(&self) {
        let frames = core::mem::take(&mut *self.registry.frames.borrow_mut());
        for (_, frame) in frames {
            frame();
        }
    }
}

impl Host for MockHost {
    type Node = u32;

    fn bounding_rect(&self, node: u32) -> Option<Rect> {
        self.rects.borrow().get(&node).copied()
    }

    fn parent(&self, node: u32) -> Option<u32> {
        self.parents.borrow().get(&node).copied()
    }

    fn computed_style(&self, node: u32, property: &str) -> Option<String> {
        self.style_reads.set(self.style_reads.get() + 1);
        self.styles
            .borrow()
            .get(&(node, String::from(property)))
            .cloned()
    }

    fn viewport_rect(&self) -> Rect {
        self.viewport.get()
    }

    fn device_pixel_ratio(&self) -> f64 {
        self.pixel_ratio.get()
    }

    fn listen_scroll(&self, target: ScrollTarget<u32>, callback: Callback) -> Subscription {
        let id = self.registry.id();
        self.registry.scroll.borrow_mut().push((id, target, callback));
        let registry = Rc::clone(&self.registry);
        Subscription::new(move || registry.scroll.borrow_mut().retain(|(i, ..)| *i != id))
    }

    fn listen_resize(&self, callback: Callback) -> Subscription {
        let id = self.registry.id();
        self.registry.resize.borrow_mut().push((id, callback));
        let registry = Rc::clone(&self.registry);
        Subscription::new(move || registry.resize.borrow_mut().retain(|(i, _)| *i != id))
    }

    fn observe_size(&self, node: u32, callback: Callback) -> Option<Subscription> {
        if !self.observers.get() {
            return None;
        }
        let id = self.registry.id();
        self.registry.size.borrow_mut().push((id, node, callback));
        let registry = Rc::clone(&self.registry);
        Some(Subscription::new(move || {
            registry.size.borrow_mut().retain(|(i, ..)| *i != id);
        }))
    }

    fn observe_intersection(
        &self,
        node: u32,
        options: IntersectionOptions,
        callback: IntersectionCallback,
    ) -> Option<Subscription> {
        if !self.observers.get() {
            return None;
        }
        let id = self.registry.id();
        self.registry
            .intersection
            .borrow_mut()
            .push((id, node, options, callback));
        let registry = Rc::clone(&self.registry);
        Some(Subscription::new(move || {
            registry.intersection.borrow_mut().retain(|(i, ..)| *i != id);
        }))
    }

    fn request_animation_frame(&self, callback: Box<dyn FnOnce()>) -> Option<FrameId> {
        if !self.observers.get() {
            return None;
        }
        let id = self.registry.id();
        self.registry.frames.borrow_mut().push((id, callback));
        Some(FrameId(id))
    }

    fn cancel_animation_frame(&self, id: FrameId) {
        self.registry.frames.borrow_mut().retain(|(i, _)| *i != id.0);
    }
}
