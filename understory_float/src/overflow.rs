// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Overflow detection: how far a rect extends past its clipping boundary.

use kurbo::Rect;

use crate::error::{ElementRole, Error};
use crate::geometry::{Padding, SideValues};
use crate::middleware::MiddlewareState;
use crate::platform::{BoundaryCache, Measure, Platform, measure};

/// Signed per-side overflow. Positive values overflow, negative values are clearance.
pub type Overflow = SideValues;

/// The area a floating element must stay inside.
#[derive(Copy, Clone, Default)]
pub enum Boundary<'a> {
    /// Only the root boundary applies.
    #[default]
    Viewport,
    /// A fixed rect.
    Rect(Rect),
    /// The bounding box of an element.
    Element(&'a dyn Measure),
    /// The intersection of several elements' bounding boxes.
    Elements(&'a [&'a dyn Measure]),
}

impl core::fmt::Debug for Boundary<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Viewport => f.write_str("Viewport"),
            Self::Rect(r) => f.debug_tuple("Rect").field(r).finish(),
            Self::Element(_) => f.write_str("Element(..)"),
            Self::Elements(es) => write!(f, "Elements({} elements)", es.len()),
        }
    }
}

/// The outermost clipping area, intersected with every [`Boundary`].
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum RootBoundary {
    /// The platform viewport.
    #[default]
    Viewport,
    /// A fixed rect (for example a document or canvas extent).
    Rect(Rect),
}

/// Which element's rect is tested against the boundary.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ElementContext {
    /// The floating element at the running coordinates.
    #[default]
    Floating,
    /// The reference element.
    Reference,
}

/// Options shared by every middleware that detects overflow.
#[derive(Copy, Clone, Debug, Default)]
pub struct DetectOverflowOptions<'a> {
    /// Clipping boundary.
    pub boundary: Boundary<'a>,
    /// Root boundary intersected with `boundary`.
    pub root_boundary: RootBoundary,
    /// Element tested against the boundary.
    pub element_context: ElementContext,
    /// Virtual padding inside the boundary.
    pub padding: Padding,
}

impl<'a> DetectOverflowOptions<'a> {
    /// Use `boundary` as the clipping boundary.
    #[must_use]
    pub fn boundary(mut self, boundary: Boundary<'a>) -> Self {
        self.boundary = boundary;
        self
    }

    /// Use `padding` inside the boundary.
    #[must_use]
    pub fn padding(mut self, padding: impl Into<Padding>) -> Self {
        self.padding = padding.into();
        self
    }

    /// Test `context` instead of the floating element.
    #[must_use]
    pub fn element_context(mut self, context: ElementContext) -> Self {
        self.element_context = context;
        self
    }
}

/// Edges of a clipping area. Unlike a `Rect`, these may be inverted when the
/// boundary and root boundary do not intersect.
#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) struct ClipEdges {
    pub(crate) top: f64,
    pub(crate) right: f64,
    pub(crate) bottom: f64,
    pub(crate) left: f64,
}

impl ClipEdges {
    fn of(rect: Rect) -> Self {
        Self {
            top: rect.y0,
            right: rect.x1,
            bottom: rect.y1,
            left: rect.x0,
        }
    }

    fn intersect(self, rect: Rect) -> Self {
        Self {
            top: self.top.max(rect.y0),
            right: self.right.min(rect.x1),
            bottom: self.bottom.min(rect.y1),
            left: self.left.max(rect.x0),
        }
    }
}

/// Resolve the clipping area for `boundary` within `root`.
pub(crate) fn clipping_edges(
    platform: &dyn Platform,
    boundary: &Boundary<'_>,
    root: &RootBoundary,
    cache: Option<&BoundaryCache>,
) -> Result<ClipEdges, Error> {
    let root = match root {
        RootBoundary::Viewport => platform.viewport_rect(),
        RootBoundary::Rect(r) => *r,
    };
    let read = |element: &dyn Measure| match cache {
        Some(cache) => cache.boundary_rect(element),
        None => measure(element, ElementRole::Boundary),
    };
    let mut edges = ClipEdges::of(root);
    match boundary {
        Boundary::Viewport => {}
        Boundary::Rect(r) => edges = edges.intersect(*r),
        Boundary::Element(e) => edges = edges.intersect(read(*e)?),
        Boundary::Elements(es) => {
            for e in es.iter() {
                edges = edges.intersect(read(*e)?);
            }
        }
    }
    Ok(edges)
}

/// Overflow of `rect` past `clip`, shrunk inward by `padding`.
pub(crate) fn overflow_within(rect: Rect, clip: ClipEdges, padding: Padding) -> Overflow {
    let p = padding.resolve();
    Overflow {
        top: clip.top - rect.y0 + p.y0,
        right: rect.x1 - clip.right + p.x1,
        bottom: rect.y1 - clip.bottom + p.y1,
        left: clip.left - rect.x0 + p.x0,
    }
}

/// Overflow of an arbitrary rect against a boundary.
///
/// ```rust
/// use kurbo::Rect;
/// use understory_float::{DetectOverflowOptions, Viewport, detect_rect_overflow};
///
/// let viewport = Viewport::new(100.0, 100.0);
/// let o = detect_rect_overflow(
///     &viewport,
///     Rect::new(90.0, 10.0, 120.0, 20.0),
///     &DetectOverflowOptions::default(),
/// )
/// .unwrap();
/// assert_eq!(o.right, 20.0);
/// assert_eq!(o.top, -10.0);
/// ```
pub fn detect_rect_overflow(
    platform: &dyn Platform,
    rect: Rect,
    options: &DetectOverflowOptions<'_>,
) -> Result<Overflow, Error> {
    let clip = clipping_edges(platform, &options.boundary, &options.root_boundary, None)?;
    Ok(overflow_within(rect, clip, options.padding))
}

/// Whether `rect` overflows the boundary on any side.
pub fn has_overflow(
    platform: &dyn Platform,
    rect: Rect,
    options: &DetectOverflowOptions<'_>,
) -> Result<bool, Error> {
    detect_rect_overflow(platform, rect, options).map(|o| o.any_positive())
}

/// Overflow of the element selected by `options.element_context` in the current pipeline state.
///
/// The floating element is tested at the running `(x, y)` with its measured size.
pub fn detect_overflow(
    state: &MiddlewareState<'_>,
    options: &DetectOverflowOptions<'_>,
) -> Result<Overflow, Error> {
    let clip = clipping_edges(
        state.platform,
        &options.boundary,
        &options.root_boundary,
        Some(state.cache),
    )?;
    let rect = match options.element_context {
        ElementContext::Floating => state.floating_rect(),
        ElementContext::Reference => state.rects.reference,
    };
    Ok(overflow_within(rect, clip, options.padding))
}
