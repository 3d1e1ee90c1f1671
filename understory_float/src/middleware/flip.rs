// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::vec;
use alloc::vec::Vec;

use smallvec::{SmallVec, smallvec};

use super::{Middleware, MiddlewareResult, MiddlewareState};
use crate::coords::compute_coords;
use crate::error::Error;
use crate::overflow::{DetectOverflowOptions, detect_overflow};
use crate::placement::Placement;

/// What [`Flip`] settles on when no fallback fits.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum FallbackStrategy {
    /// The direct opposite of the current placement.
    #[default]
    Opposite,
    /// The evaluated placement (current one included) with the least total
    /// positive overflow.
    BestFit,
    /// The placement originally requested.
    InitialPlacement,
}

/// Options for [`Flip`].
#[derive(Clone, Debug)]
pub struct FlipOptions<'a> {
    /// Check overflow on the placement's side.
    pub main_axis: bool,
    /// Also check overflow across the alignment axis.
    pub cross_axis: bool,
    /// Placements to try, in order, when the current one overflows.
    ///
    /// `None` tries the opposite side (and, with `flip_alignment`, the
    /// alignment-flipped variants).
    pub fallback_placements: Option<Vec<Placement>>,
    /// For aligned placements, also try the opposite alignment.
    pub flip_alignment: bool,
    /// Choice when no fallback fits.
    pub fallback_strategy: FallbackStrategy,
    /// Boundary and padding.
    pub overflow: DetectOverflowOptions<'a>,
}

impl Default for FlipOptions<'_> {
    fn default() -> Self {
        Self {
            main_axis: true,
            cross_axis: false,
            fallback_placements: None,
            flip_alignment: false,
            fallback_strategy: FallbackStrategy::Opposite,
            overflow: DetectOverflowOptions::default(),
        }
    }
}

/// Overflow recorded for one candidate placement.
#[derive(Clone, Debug, PartialEq)]
pub struct PlacementOverflows {
    /// The candidate.
    pub placement: Placement,
    /// Overflow on the checked sides: the main side first, then the alignment sides.
    pub overflows: SmallVec<[f64; 3]>,
}

impl PlacementOverflows {
    fn fits(&self) -> bool {
        self.overflows.iter().all(|v| *v <= 0.0)
    }

    fn total_positive(&self) -> f64 {
        self.overflows.iter().filter(|v| **v > 0.0).sum()
    }
}

/// Data recorded by [`Flip`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FlipData {
    /// Whether flip moved the floating element off the placement it found.
    pub flipped: bool,
    /// Index of the settled placement in `overflows`.
    pub index: usize,
    /// The placement flip found, then every fallback, in order.
    pub overflows: Vec<PlacementOverflows>,
}

/// Switches to the opposite side when the current placement overflows.
///
/// By default the only fallback is the direct opposite, alignment kept. Each
/// fallback is measured at its base coordinates and the first that fits wins;
/// otherwise the [`FallbackStrategy`] decides. A switch resets the pipeline
/// onto the new placement.
#[derive(Clone, Debug, Default)]
pub struct Flip<'a> {
    /// Options.
    pub options: FlipOptions<'a>,
}

impl<'a> Flip<'a> {
    /// A flip middleware with `options`.
    pub fn new(options: FlipOptions<'a>) -> Self {
        Self { options }
    }

    fn fallbacks(&self, current: Placement) -> SmallVec<[Placement; 4]> {
        match &self.options.fallback_placements {
            Some(list) => list.iter().copied().filter(|p| *p != current).collect(),
            None if current.is_centered() || !self.options.flip_alignment => {
                smallvec![current.opposite()]
            }
            None => current.expanded_placements().into_iter().collect(),
        }
    }

    /// Overflow on the checked sides of `placement` with the floating element at `state`'s coordinates.
    fn checked(
        &self,
        state: &MiddlewareState<'_>,
        placement: Placement,
    ) -> Result<PlacementOverflows, Error> {
        let overflow = detect_overflow(state, &self.options.overflow)?;
        let mut overflows = SmallVec::new();
        if self.options.main_axis {
            overflows.push(overflow.get(placement.side()));
        }
        if self.options.cross_axis {
            let (main, cross) = placement.alignment_sides(
                state.rects.reference,
                state.rects.floating,
                state.rtl,
            );
            overflows.push(overflow.get(main));
            overflows.push(overflow.get(cross));
        }
        Ok(PlacementOverflows {
            placement,
            overflows,
        })
    }
}

impl Middleware for Flip<'_> {
    fn name(&self) -> &str {
        "flip"
    }

    fn compute(&self, state: &MiddlewareState<'_>) -> Result<MiddlewareResult, Error> {
        let current = self.checked(state, state.placement)?;
        if current.fits() {
            return Ok(MiddlewareResult::none());
        }

        let mut evaluated = vec![current];
        for placement in self.fallbacks(state.placement) {
            let coords = compute_coords(placement, &state.rects, state.rtl);
            let mut at = *state;
            at.x = coords.x;
            at.y = coords.y;
            at.placement = placement;
            evaluated.push(self.checked(&at, placement)?);
        }

        let index = match evaluated.iter().skip(1).position(PlacementOverflows::fits) {
            Some(i) => i + 1,
            None => {
                let target = match self.options.fallback_strategy {
                    FallbackStrategy::Opposite => Some(state.placement.opposite()),
                    FallbackStrategy::BestFit => None,
                    FallbackStrategy::InitialPlacement => Some(state.initial_placement),
                };
                match target {
                    Some(target) => match evaluated.iter().position(|d| d.placement == target) {
                        Some(i) => i,
                        None => {
                            let coords = compute_coords(target, &state.rects, state.rtl);
                            let mut at = *state;
                            at.x = coords.x;
                            at.y = coords.y;
                            at.placement = target;
                            evaluated.push(self.checked(&at, target)?);
                            evaluated.len() - 1
                        }
                    },
                    None => evaluated
                        .iter()
                        .enumerate()
                        .min_by(|(_, a), (_, b)| a.total_positive().total_cmp(&b.total_positive()))
                        .map_or(0, |(i, _)| i),
                }
            }
        };

        let settled = evaluated[index].placement;
        let data = FlipData {
            flipped: settled != state.placement,
            index,
            overflows: evaluated,
        };
        if settled == state.placement {
            return Ok(MiddlewareResult::none().with_data(data));
        }
        #[cfg(feature = "tracing")]
        tracing::debug!(from = %state.placement, to = %settled, "flip: switching side");
        Ok(MiddlewareResult::reset_to(settled).with_data(data))
    }
}
