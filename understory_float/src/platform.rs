// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Host capabilities: measuring elements, the viewport, and the rect reader.

use core::cell::{Cell, RefCell};

use hashbrown::HashMap;
use kurbo::{Rect, Size};

use crate::error::{ElementRole, Error};
use crate::geometry::ElementRects;

/// Anything that can report its current bounding box.
///
/// This is the only thing the engine needs from an element. Real nodes,
/// virtual anchors (a caret position, a pointer location), and test fixtures
/// all implement it the same way.
pub trait Measure {
    /// The element's bounding box in the shared coordinate space, or `None` if
    /// it is not currently renderable (detached, hidden, or not a drawable node).
    fn bounding_rect(&self) -> Option<Rect>;
}

impl Measure for Rect {
    fn bounding_rect(&self) -> Option<Rect> {
        Some(*self)
    }
}

impl<M: Measure + ?Sized> Measure for &M {
    fn bounding_rect(&self) -> Option<Rect> {
        (**self).bounding_rect()
    }
}

/// Measure `element` once, mapping absence to [`Error::NotRenderable`].
pub fn measure(element: &dyn Measure, role: ElementRole) -> Result<Rect, Error> {
    element
        .bounding_rect()
        .ok_or(Error::NotRenderable { role })
}

/// Size of `element`, measured once.
pub fn dimensions(element: &dyn Measure, role: ElementRole) -> Result<Size, Error> {
    measure(element, role).map(|r| r.size())
}

/// Read the reference and floating rects, each exactly once.
///
/// The floating rect is returned at the origin.
pub fn read_element_rects(
    reference: &dyn Measure,
    floating: &dyn Measure,
) -> Result<ElementRects, Error> {
    let reference = measure(reference, ElementRole::Reference)?;
    let floating = measure(floating, ElementRole::Floating)?;
    Ok(ElementRects {
        reference,
        floating: Rect::from_origin_size((0.0, 0.0), floating.size()),
    })
}

/// Environment the engine runs in.
///
/// Implementors supply the viewport and may override how elements are
/// measured (for example to convert into an offset-parent space).
pub trait Platform {
    /// The visible viewport, used as the default boundary.
    fn viewport_rect(&self) -> Rect;

    /// Measure reference and floating together for one pass.
    fn element_rects(
        &self,
        reference: &dyn Measure,
        floating: &dyn Measure,
    ) -> Result<ElementRects, Error> {
        read_element_rects(reference, floating)
    }

    /// Whether the floating element lays out right-to-left.
    fn is_rtl(&self, _floating: &dyn Measure) -> bool {
        false
    }

    /// Device pixels per layout pixel.
    fn device_pixel_ratio(&self) -> f64 {
        1.0
    }
}

/// A fixed viewport, the simplest [`Platform`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Viewport {
    /// Viewport rect.
    pub rect: Rect,
    /// Right-to-left layout.
    pub rtl: bool,
}

impl Viewport {
    /// A left-to-right viewport of the given size at the origin.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            rect: Rect::new(0.0, 0.0, width, height),
            rtl: false,
        }
    }
}

impl Platform for Viewport {
    fn viewport_rect(&self) -> Rect {
        self.rect
    }

    fn is_rtl(&self, _floating: &dyn Measure) -> bool {
        self.rtl
    }
}

/// Memo of boundary element rects for one computation pass.
///
/// Overflow detection may run many times per pass (once per candidate
/// placement, once per middleware), and each run resolves the same boundary
/// elements. The cache keeps those reads to one per element. It is owned by
/// whoever scopes it, never global, and dropping or clearing it only costs
/// extra reads.
#[derive(Debug, Default)]
pub struct BoundaryCache {
    rects: RefCell<HashMap<ElementKey, Rect>>,
    misses: Cell<u32>,
}

impl BoundaryCache {
    /// An empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget all memoized rects.
    pub fn clear(&self) {
        self.rects.borrow_mut().clear();
        self.misses.set(0);
    }

    /// Number of memoized elements.
    pub fn len(&self) -> usize {
        self.rects.borrow().len()
    }

    /// Whether nothing is memoized.
    pub fn is_empty(&self) -> bool {
        self.rects.borrow().is_empty()
    }

    /// How many times an element was actually measured since the last clear.
    pub fn misses(&self) -> u32 {
        self.misses.get()
    }

    /// The rect of a boundary element, measured at most once per cache lifetime.
    ///
    /// Zero-sized elements are measured every time.
    pub fn boundary_rect(&self, element: &dyn Measure) -> Result<Rect, Error> {
        let key = ElementKey::of(element);
        if let Some(rect) = key.and_then(|k| self.rects.borrow().get(&k).copied()) {
            return Ok(rect);
        }
        let rect = measure(element, ElementRole::Boundary)?;
        self.misses.set(self.misses.get() + 1);
        if let Some(key) = key {
            self.rects.borrow_mut().insert(key, rect);
        }
        Ok(rect)
    }
}

/// Identity of an element for caching: its address and size.
///
/// Distinct zero-sized values may share an address, so they get no key. A
/// value and its first field share an address too; the size tells them apart
/// unless the field fills the whole value.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
struct ElementKey {
    addr: usize,
    size: usize,
}

impl ElementKey {
    fn of(element: &dyn Measure) -> Option<Self> {
        let size = core::mem::size_of_val(element);
        (size != 0).then(|| Self {
            addr: (element as *const dyn Measure).cast::<()>() as usize,
            size,
        })
    }
}
