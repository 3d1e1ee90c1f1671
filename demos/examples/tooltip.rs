// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A tooltip with an arrow, placed against buttons across a small window.
//!
//! This example shows how to combine:
//! - `Offset` to leave a gap for the arrow,
//! - `Flip` and `Shift` to keep the tooltip on screen,
//! - `Arrow` to point back at the button,
//! - `Hide` to notice when the button itself is clipped.
//!
//! Each computation is logged at `debug`, so resets and flips show up
//! alongside the printed results.
//!
//! Run:
//! - `cargo run -p understory_float_demos --example tooltip`

use kurbo::{Rect, Size};
use understory_float::{
    Arrow, Flip, Hide, HideOptions, LimitShift, Middleware, Offset, Placement, PositionOptions,
    Shift, ShiftOptions, Viewport, compute_position,
};

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let viewport = Viewport::new(320.0, 240.0);
    let tooltip = Rect::new(0.0, 0.0, 120.0, 32.0);

    let offset = Offset::new(8.0);
    let flip = Flip::default();
    let shift = Shift::new(ShiftOptions {
        limiter: Some(LimitShift::default()),
        ..ShiftOptions::default()
    });
    let arrow = Arrow::new(Size::new(8.0, 8.0)).padding(4.0);
    let hide = Hide::new(HideOptions::default());
    let middleware: [&dyn Middleware; 5] = [&flip, &offset, &shift, &arrow, &hide];
    let options = PositionOptions::default()
        .placement(Placement::TOP)
        .middleware(&middleware);

    let buttons = [
        ("centered", Rect::new(140.0, 100.0, 180.0, 120.0)),
        ("top edge", Rect::new(140.0, 4.0, 180.0, 24.0)),
        ("top-left corner", Rect::new(2.0, 2.0, 42.0, 22.0)),
        ("right edge", Rect::new(290.0, 120.0, 330.0, 140.0)),
        ("scrolled away", Rect::new(140.0, -60.0, 180.0, -40.0)),
    ];

    for (label, button) in buttons {
        match compute_position(&viewport, &button, &tooltip, &options) {
            Ok(result) => {
                let at = result.round_with(&viewport);
                let data = &result.middleware_data;
                let arrow = data.arrow();
                let hidden = data
                    .hide()
                    .and_then(|h| h.reference_hidden)
                    .unwrap_or(false);
                println!(
                    "{label:>16}: {:<12} at ({:>6.1}, {:>6.1})  arrow x={:?} y={:?}  reference hidden: {hidden}",
                    result.placement.to_string(),
                    at.x,
                    at.y,
                    arrow.and_then(|a| a.x),
                    arrow.and_then(|a| a.y),
                );
            }
            Err(err) => println!("{label:>16}: {err}"),
        }
    }
}
