// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A popover that follows its anchor while a panel scrolls.
//!
//! This example shows how to combine:
//! - a small `Host` with one scrolling panel,
//! - `auto_update` to re-run positioning on every scroll,
//! - `position_nodes` with `Flip` and `Shift` inside the update callback.
//!
//! The panel scrolls in steps; as the anchor nears the bottom of the window
//! the popover flips above it.
//!
//! Run:
//! - `cargo run -p understory_float_demos --example scrolling_popover`

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use kurbo::{Rect, Vec2};
use understory_float::{Flip, Middleware, Offset, Placement, PositionOptions, Shift};
use understory_float_auto::{
    AutoUpdateOptions, Callback, Host, ScrollTarget, Subscription, auto_update, position_nodes,
};

const PANEL: u32 = 1;
const ANCHOR: u32 = 2;
const POPOVER: u32 = 3;

/// A window with a scrolling panel that holds the anchor. The popover lives
/// outside the panel.
#[derive(Default)]
struct Page {
    scroll_y: Cell<f64>,
    listeners: Rc<RefCell<Vec<(u64, Callback)>>>,
    next_id: Cell<u64>,
}

impl Page {
    fn scroll_to(&self, y: f64) {
        self.scroll_y.set(y);
        let listeners: Vec<Callback> = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, cb)| cb.clone())
            .collect();
        for cb in listeners {
            cb();
        }
    }
}

impl Host for Page {
    type Node = u32;

    fn bounding_rect(&self, node: u32) -> Option<Rect> {
        match node {
            PANEL => Some(Rect::new(0.0, 0.0, 400.0, 300.0)),
            ANCHOR => {
                Some(Rect::new(160.0, 120.0, 240.0, 144.0) + Vec2::new(0.0, self.scroll_y.get()))
            }
            POPOVER => Some(Rect::new(0.0, 0.0, 180.0, 60.0)),
            _ => None,
        }
    }

    fn parent(&self, node: u32) -> Option<u32> {
        (node == ANCHOR).then_some(PANEL)
    }

    fn computed_style(&self, node: u32, property: &str) -> Option<String> {
        (node == PANEL && property == "overflow-y").then(|| "auto".to_string())
    }

    fn viewport_rect(&self) -> Rect {
        Rect::new(0.0, 0.0, 400.0, 300.0)
    }

    fn listen_scroll(&self, target: ScrollTarget<u32>, callback: Callback) -> Subscription {
        if target != ScrollTarget::Node(PANEL) {
            return Subscription::empty();
        }
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        self.listeners.borrow_mut().push((id, callback));
        let listeners = self.listeners.clone();
        Subscription::new(move || listeners.borrow_mut().retain(|(i, _)| *i != id))
    }

    fn listen_resize(&self, _callback: Callback) -> Subscription {
        Subscription::empty()
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let page = Rc::new(Page::default());

    let update = {
        let page = page.clone();
        move || {
            let offset = Offset::new(6.0);
            let flip = Flip::default();
            let shift = Shift::default();
            let middleware: [&dyn Middleware; 3] = [&flip, &offset, &shift];
            let options = PositionOptions::default()
                .placement(Placement::BOTTOM)
                .middleware(&middleware);
            match position_nodes(&*page, ANCHOR, POPOVER, &options) {
                Ok(result) => println!(
                    "scroll {:>5.1}: popover {:<6} at ({:>6.1}, {:>6.1})",
                    page.scroll_y.get(),
                    result.placement.to_string(),
                    result.x,
                    result.y
                ),
                Err(err) => println!("scroll {:>5.1}: {err}", page.scroll_y.get()),
            }
        }
    };

    let mut handle = auto_update(&page, ANCHOR, POPOVER, update, &AutoUpdateOptions::default());
    for step in 1..=5 {
        page.scroll_to(f64::from(step) * 20.0);
    }

    handle.cancel();
    // Nothing is printed once cancelled.
    page.scroll_to(0.0);
}
