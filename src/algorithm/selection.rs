//! Tiered candidate selection for a single grid cell
//!
//! Tiers are tried in order and each is consulted only when the previous one
//! has no qualifying candidate:
//! 1. unused candidates within tolerance, chosen uniformly at random
//! 2. candidates below the usage cap within tolerance, chosen uniformly at random
//! 3. the candidate with the smallest brightness difference, first in pool order on ties
//!
//! Tier 3 applies neither the tolerance nor the cap, so it is the only path
//! by which a candidate can exceed `max_usage`.

use crate::algorithm::pool::CandidatePool;
use crate::algorithm::random::RandomSource;
use crate::io::error::{Result, invalid_argument};
use tracing::trace;

/// Which policy tier produced a selection
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SelectionTier {
    /// Unused and within tolerance
    #[default]
    Fresh,
    /// Below the usage cap and within tolerance
    Reused,
    /// Closest brightness, ignoring tolerance and cap
    Closest,
}

impl SelectionTier {
    /// All tiers in evaluation order
    pub const ALL: [Self; 3] = [Self::Fresh, Self::Reused, Self::Closest];

    /// Short lowercase name used in reports
    pub const fn name(self) -> &'static str {
        match self {
            Self::Fresh => "fresh",
            Self::Reused => "reused",
            Self::Closest => "closest",
        }
    }
}

/// Outcome of one selector call
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Selection {
    /// Pool index of the chosen candidate
    pub index: usize,
    /// Tier that produced the choice
    pub tier: SelectionTier,
}

/// Indices of unused candidates within `tolerance` of `target`
pub fn fresh_candidates(pool: &CandidatePool, target: f64, tolerance: f64) -> Vec<usize> {
    pool.candidates()
        .iter()
        .enumerate()
        .filter(|(_, candidate)| {
            candidate.usage_count() == 0 && candidate.distance_to(target) <= tolerance
        })
        .map(|(index, _)| index)
        .collect()
}

/// Indices of candidates below the usage cap within `tolerance` of `target`
///
/// Filters the whole pool, so every fresh candidate is also reusable.
pub fn reusable_candidates(pool: &CandidatePool, target: f64, tolerance: f64) -> Vec<usize> {
    let max_usage = pool.max_usage();
    pool.candidates()
        .iter()
        .enumerate()
        .filter(|(_, candidate)| {
            candidate.usage_count() < max_usage && candidate.distance_to(target) <= tolerance
        })
        .map(|(index, _)| index)
        .collect()
}

/// Index of the candidate closest in brightness to `target`
///
/// Ties resolve to the earliest candidate in pool order. Returns `None` only
/// for an empty pool.
pub fn closest_candidate(pool: &CandidatePool, target: f64) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (index, candidate) in pool.candidates().iter().enumerate() {
        let distance = candidate.distance_to(target);
        match best {
            Some((_, best_distance)) if distance >= best_distance => {}
            _ => best = Some((index, distance)),
        }
    }
    best.map(|(index, _)| index)
}

fn choose_uniform<R: RandomSource + ?Sized>(indices: &[usize], rng: &mut R) -> Option<usize> {
    if indices.is_empty() {
        return None;
    }
    let pick = rng.choose_index(indices.len());
    indices.get(pick).or_else(|| indices.last()).copied()
}

/// Choose a candidate for a cell of brightness `target` and count its use
///
/// # Errors
///
/// Returns `InvalidArgument` if the pool holds no candidates
pub fn select_candidate<R: RandomSource + ?Sized>(
    target: f64,
    pool: &mut CandidatePool,
    tolerance: f64,
    rng: &mut R,
) -> Result<Selection> {
    let selection = if let Some(index) =
        choose_uniform(&fresh_candidates(pool, target, tolerance), rng)
    {
        Selection {
            index,
            tier: SelectionTier::Fresh,
        }
    } else if let Some(index) = choose_uniform(&reusable_candidates(pool, target, tolerance), rng)
    {
        Selection {
            index,
            tier: SelectionTier::Reused,
        }
    } else {
        let index = closest_candidate(pool, target).ok_or_else(|| {
            invalid_argument(
                "pool",
                &0,
                &"candidate pool must contain at least one image",
            )
        })?;
        trace!(target, index, "no candidate within tolerance, using closest");
        Selection {
            index,
            tier: SelectionTier::Closest,
        }
    };

    pool.record_use(selection.index);
    Ok(selection)
}
