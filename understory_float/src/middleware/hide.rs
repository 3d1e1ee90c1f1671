// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use kurbo::Rect;

use super::{Middleware, MiddlewareResult, MiddlewareState};
use crate::error::Error;
use crate::geometry::SideValues;
use crate::overflow::{DetectOverflowOptions, ElementContext, Overflow, detect_overflow};

/// Which visibility checks [`Hide`] runs.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum HideStrategy {
    /// Whether the reference is fully clipped by the boundary.
    ReferenceHidden,
    /// Whether the floating element has fully escaped the boundary.
    Escaped,
    /// Both checks.
    #[default]
    Both,
}

/// Options for [`Hide`].
#[derive(Copy, Clone, Debug, Default)]
pub struct HideOptions<'a> {
    /// Checks to run.
    pub strategy: HideStrategy,
    /// Boundary and padding. The element context is chosen per check.
    pub overflow: DetectOverflowOptions<'a>,
}

/// Data recorded by [`Hide`]. Checks that did not run are `None`.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct HideData {
    /// Whether the reference is fully clipped on some side.
    pub reference_hidden: Option<bool>,
    /// Per-side distance past full clipping for the reference.
    pub reference_hidden_offsets: Option<SideValues>,
    /// Whether the floating element is fully outside on some side.
    pub escaped: Option<bool>,
    /// Per-side distance past full clipping for the floating element.
    pub escaped_offsets: Option<SideValues>,
}

/// Reports whether the floating element should be hidden. Never moves it.
#[derive(Copy, Clone, Debug, Default)]
pub struct Hide<'a> {
    /// Options.
    pub options: HideOptions<'a>,
}

impl<'a> Hide<'a> {
    /// A hide middleware with `options`.
    pub fn new(options: HideOptions<'a>) -> Self {
        Self { options }
    }

    fn check(
        &self,
        state: &MiddlewareState<'_>,
        context: ElementContext,
        rect: Rect,
    ) -> Result<(bool, SideValues), Error> {
        let options = self.options.overflow.element_context(context);
        let offsets = side_offsets(detect_overflow(state, &options)?, rect);
        Ok((offsets.any_non_negative(), offsets))
    }
}

/// How far each side is past the point where `rect` is fully clipped there.
fn side_offsets(overflow: Overflow, rect: Rect) -> SideValues {
    SideValues {
        top: overflow.top - rect.height(),
        right: overflow.right - rect.width(),
        bottom: overflow.bottom - rect.height(),
        left: overflow.left - rect.width(),
    }
}

impl Middleware for Hide<'_> {
    fn name(&self) -> &str {
        "hide"
    }

    fn compute(&self, state: &MiddlewareState<'_>) -> Result<MiddlewareResult, Error> {
        let mut data = HideData::default();
        let strategy = self.options.strategy;
        if matches!(strategy, HideStrategy::ReferenceHidden | HideStrategy::Both) {
            let (hidden, offsets) =
                self.check(state, ElementContext::Reference, state.rects.reference)?;
            data.reference_hidden = Some(hidden);
            data.reference_hidden_offsets = Some(offsets);
        }
        if matches!(strategy, HideStrategy::Escaped | HideStrategy::Both) {
            let (escaped, offsets) =
                self.check(state, ElementContext::Floating, state.rects.floating)?;
            data.escaped = Some(escaped);
            data.escaped_offsets = Some(offsets);
        }
        Ok(MiddlewareResult::none().with_data(data))
    }
}
