// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scroll-container detection and the ancestor cache.

use core::cell::RefCell;
use core::fmt;

use hashbrown::HashMap;
use smallvec::SmallVec;

use crate::host::Host;

/// Ancestor lists are usually short.
pub type Ancestors<N> = SmallVec<[N; 8]>;

const SCROLLING_OVERFLOW: [&str; 4] = ["auto", "scroll", "overlay", "hidden"];

/// Whether `node` clips or scrolls its content.
///
/// A node is a scroll container when any of `overflow`, `overflow-x`, or
/// `overflow-y` holds `auto`, `scroll`, `overlay`, or `hidden`, and its
/// `display` is neither `inline` nor `contents`.
pub fn is_scroll_container<H: Host + ?Sized>(host: &H, node: H::Node) -> bool {
    if let Some(display) = host.computed_style(node, "display")
        && matches!(display.trim(), "inline" | "contents")
    {
        return false;
    }
    ["overflow", "overflow-x", "overflow-y"]
        .into_iter()
        .filter_map(|property| host.computed_style(node, property))
        .any(|value| {
            value
                .split_whitespace()
                .any(|token| SCROLLING_OVERFLOW.contains(&token))
        })
}

/// Scroll containers above `node`, nearest first. `node` itself is excluded.
pub fn overflow_ancestors<H: Host + ?Sized>(host: &H, node: H::Node) -> Ancestors<H::Node> {
    let mut out = Ancestors::new();
    let mut current = host.parent(node);
    while let Some(n) = current {
        if is_scroll_container(host, n) {
            out.push(n);
        }
        current = host.parent(n);
    }
    out
}

/// Memoized [`overflow_ancestors`] results, keyed by node.
///
/// Entries never expire on their own; call [`AncestorCache::clear`] after the
/// tree or its styles change. Skipping the cache is always correct.
pub struct AncestorCache<N> {
    entries: RefCell<HashMap<N, Ancestors<N>>>,
}

impl<N: Copy + Eq + core::hash::Hash> AncestorCache<N> {
    /// An empty cache.
    pub fn new() -> Self {
        Self {
            entries: RefCell::new(HashMap::new()),
        }
    }

    /// The scroll containers above `node`, computed on first request.
    pub fn get<H: Host<Node = N> + ?Sized>(&self, host: &H, node: N) -> Ancestors<N> {
        if let Some(hit) = self.entries.borrow().get(&node) {
            return hit.clone();
        }
        let ancestors = overflow_ancestors(host, node);
        self.entries.borrow_mut().insert(node, ancestors.clone());
        ancestors
    }

    /// Forget every entry.
    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }

    /// Number of cached nodes.
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Whether nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl<N: Copy + Eq + core::hash::Hash> Default for AncestorCache<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N> fmt::Debug for AncestorCache<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AncestorCache")
            .field("len", &self.entries.borrow().len())
            .finish()
    }
}
