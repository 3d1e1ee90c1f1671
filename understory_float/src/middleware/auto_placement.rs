// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::vec::Vec;

use super::{Middleware, MiddlewareResult, MiddlewareState};
use crate::coords::compute_coords;
use crate::error::Error;
use crate::overflow::{DetectOverflowOptions, detect_overflow};
use crate::placement::{Alignment, Placement};

/// Options for [`AutoPlacement`].
#[derive(Clone, Debug)]
pub struct AutoPlacementOptions<'a> {
    /// Placements to choose from. Defaults to [`Placement::ALL`].
    pub allowed_placements: Vec<Placement>,
    /// Preferred alignment. Candidates with it are ranked first on ties.
    pub alignment: Option<Alignment>,
    /// With a preferred alignment, also consider the opposite alignment.
    pub auto_alignment: bool,
    /// Rank aligned candidates by their alignment-side overflow as well.
    pub cross_axis: bool,
    /// Take the first ranked candidate that fits, instead of the top-ranked one.
    pub prefer_fitting: bool,
    /// Boundary and padding.
    pub overflow: DetectOverflowOptions<'a>,
}

impl Default for AutoPlacementOptions<'_> {
    fn default() -> Self {
        Self {
            allowed_placements: Placement::ALL.to_vec(),
            alignment: None,
            auto_alignment: true,
            cross_axis: false,
            prefer_fitting: false,
            overflow: DetectOverflowOptions::default(),
        }
    }
}

/// One evaluated candidate.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RankedPlacement {
    /// The candidate.
    pub placement: Placement,
    /// Ranking key; lower means more room.
    pub score: f64,
    /// Overflow on the candidate's side, then on its two alignment sides.
    pub overflows: [f64; 3],
}

impl RankedPlacement {
    /// Whether the candidate fits on every side that matters to it.
    ///
    /// Aligned candidates only need their side and leading alignment side to fit.
    pub fn fits(&self) -> bool {
        let checked = if self.placement.is_centered() { 3 } else { 2 };
        self.overflows[..checked].iter().all(|v| *v <= 0.0)
    }
}

/// Data recorded by [`AutoPlacement`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AutoPlacementData {
    /// Every candidate, most room first. Ties keep candidate order.
    pub ranked: Vec<RankedPlacement>,
}

/// Chooses the placement with the most room, ignoring the requested one.
///
/// Every candidate is measured at its own base coordinates and ranked by the
/// overflow on its side (plus its leading alignment side with `cross_axis`).
/// The top-ranked candidate wins. With `prefer_fitting`, the first ranked
/// candidate that fits wins instead, and the top-ranked one only when none fits.
#[derive(Clone, Debug, Default)]
pub struct AutoPlacement<'a> {
    /// Options.
    pub options: AutoPlacementOptions<'a>,
}

impl<'a> AutoPlacement<'a> {
    /// An auto-placement middleware with `options`.
    pub fn new(options: AutoPlacementOptions<'a>) -> Self {
        Self { options }
    }

    /// Candidates in evaluation order.
    fn candidates(&self) -> Vec<Placement> {
        let allowed = &self.options.allowed_placements;
        let Some(preferred) = self.options.alignment else {
            return allowed.clone();
        };
        let keep = |p: &Placement| {
            p.alignment() == Some(preferred)
                || (self.options.auto_alignment && !p.is_centered())
        };
        let preferred_first = allowed
            .iter()
            .filter(|p| p.alignment() == Some(preferred));
        let rest = allowed
            .iter()
            .filter(|p| p.alignment() != Some(preferred));
        preferred_first.chain(rest).copied().filter(keep).collect()
    }

    /// Evaluate and rank every candidate.
    pub fn rank(&self, state: &MiddlewareState<'_>) -> Result<Vec<RankedPlacement>, Error> {
        let mut ranked = Vec::new();
        for placement in self.candidates() {
            let coords = compute_coords(placement, &state.rects, state.rtl);
            let mut at = *state;
            at.x = coords.x;
            at.y = coords.y;
            at.placement = placement;
            let overflow = detect_overflow(&at, &self.options.overflow)?;
            let (main, cross) = placement.alignment_sides(
                state.rects.reference,
                state.rects.floating,
                state.rtl,
            );
            let overflows = [
                overflow.get(placement.side()),
                overflow.get(main),
                overflow.get(cross),
            ];
            let score = if self.options.cross_axis && !placement.is_centered() {
                overflows[0] + overflows[1]
            } else {
                overflows[0]
            };
            ranked.push(RankedPlacement {
                placement,
                score,
                overflows,
            });
        }
        // Stable, so equal scores keep candidate order.
        ranked.sort_by(|a, b| a.score.total_cmp(&b.score));
        Ok(ranked)
    }
}

impl Middleware for AutoPlacement<'_> {
    fn name(&self) -> &str {
        "autoPlacement"
    }

    fn compute(&self, state: &MiddlewareState<'_>) -> Result<MiddlewareResult, Error> {
        let ranked = self.rank(state)?;
        let Some(top) = ranked.first() else {
            return Err(Error::middleware(
                "autoPlacement",
                "no placements are allowed",
            ));
        };
        let best = if self.options.prefer_fitting {
            ranked.iter().find(|r| r.fits()).unwrap_or(top)
        } else {
            top
        }
        .placement;

        let data = AutoPlacementData { ranked };
        if best == state.placement {
            return Ok(MiddlewareResult::none().with_data(data));
        }
        #[cfg(feature = "tracing")]
        tracing::debug!(from = %state.placement, to = %best, "autoPlacement: switching");
        Ok(MiddlewareResult::reset_to(best).with_data(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::testing::Fixture;
    use crate::middleware::{Adjustment, MiddlewareData};
    use alloc::vec;
    use kurbo::Rect;

    fn top_and_bottom() -> AutoPlacement<'static> {
        AutoPlacement::new(AutoPlacementOptions {
            allowed_placements: vec![Placement::TOP, Placement::BOTTOM],
            ..AutoPlacementOptions::default()
        })
    }

    #[test]
    fn picks_the_side_that_fits() {
        let fx = Fixture::new(200.0, 200.0, Rect::new(50.0, 10.0, 100.0, 30.0), (80.0, 30.0));
        let result = top_and_bottom().compute(&fx.state(Placement::TOP)).unwrap();
        assert_eq!(
            result.adjustment,
            Adjustment::Reset {
                placement: Some(Placement::BOTTOM),
                remeasure: false
            }
        );
        let Some(MiddlewareData::AutoPlacement(data)) = result.data else {
            panic!("autoPlacement data missing");
        };
        let order: Vec<_> = data.ranked.iter().map(|r| r.placement).collect();
        assert_eq!(order, vec![Placement::BOTTOM, Placement::TOP]);
    }

    #[test]
    fn top_ranked_candidate_wins() {
        // Pinned to the top-left corner: every bottom variant has the most room.
        let fx = Fixture::new(100.0, 600.0, Rect::new(0.0, 0.0, 20.0, 20.0), (80.0, 30.0));
        let result = AutoPlacement::default()
            .compute(&fx.state(Placement::TOP))
            .unwrap();
        assert_eq!(
            result.adjustment,
            Adjustment::Reset {
                placement: Some(Placement::BOTTOM),
                remeasure: false
            }
        );
    }

    #[test]
    fn prefer_fitting_skips_clipped_candidates() {
        // Centered below, the floating element hangs 30 past the left edge.
        let fx = Fixture::new(100.0, 600.0, Rect::new(0.0, 0.0, 20.0, 20.0), (80.0, 30.0));
        let auto = AutoPlacement::new(AutoPlacementOptions {
            prefer_fitting: true,
            ..AutoPlacementOptions::default()
        });
        let result = auto.compute(&fx.state(Placement::TOP)).unwrap();
        assert_eq!(
            result.adjustment,
            Adjustment::Reset {
                placement: Some(Placement::BOTTOM_START),
                remeasure: false
            }
        );
    }

    #[test]
    fn settled_placement_is_kept() {
        let fx = Fixture::new(200.0, 200.0, Rect::new(50.0, 10.0, 100.0, 30.0), (80.0, 30.0));
        let result = top_and_bottom()
            .compute(&fx.state(Placement::BOTTOM))
            .unwrap();
        assert_eq!(result.adjustment, Adjustment::NoChange);
        assert!(result.data.is_some());
    }

    #[test]
    fn ties_keep_candidate_order() {
        // Centered in a large viewport: left and right have equal room.
        let fx = Fixture::new(400.0, 400.0, Rect::new(190.0, 190.0, 210.0, 210.0), (20.0, 20.0));
        let auto = AutoPlacement::new(AutoPlacementOptions {
            allowed_placements: vec![Placement::RIGHT, Placement::LEFT],
            ..AutoPlacementOptions::default()
        });
        let ranked = auto.rank(&fx.state(Placement::BOTTOM)).unwrap();
        assert_eq!(ranked[0].placement, Placement::RIGHT);
        assert_eq!(ranked[0].score, ranked[1].score);
    }

    #[test]
    fn preferred_alignment_orders_candidates() {
        let auto = AutoPlacement::new(AutoPlacementOptions {
            alignment: Some(Alignment::Start),
            ..AutoPlacementOptions::default()
        });
        let candidates = auto.candidates();
        assert_eq!(candidates.len(), 8);
        assert!(candidates[..4].iter().all(|p| p.alignment() == Some(Alignment::Start)));
        assert!(candidates[4..].iter().all(|p| p.alignment() == Some(Alignment::End)));

        let strict = AutoPlacement::new(AutoPlacementOptions {
            alignment: Some(Alignment::End),
            auto_alignment: false,
            ..AutoPlacementOptions::default()
        });
        assert_eq!(strict.candidates().len(), 4);
    }

    #[test]
    fn empty_candidate_list_is_an_error() {
        let fx = Fixture::new(200.0, 200.0, Rect::new(50.0, 10.0, 100.0, 30.0), (80.0, 30.0));
        let auto = AutoPlacement::new(AutoPlacementOptions {
            allowed_placements: Vec::new(),
            ..AutoPlacementOptions::default()
        });
        assert!(matches!(
            auto.compute(&fx.state(Placement::TOP)),
            Err(Error::Middleware { .. })
        ));
    }
}
