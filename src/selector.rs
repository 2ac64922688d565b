// Move selection over per-direction summaries
//
// 1. Filter: drop directions with no reachable cells
// 2. Optionally drop tight directions when a roomier one exists
// 3. Rank: keep the directions with the nearest food
// 4. Tie-break uniformly at random with a caller-provided generator

use rand::Rng;

use crate::error::DecisionError;
use crate::metadata::DirectionSummary;
use crate::types::Direction;

/// A chosen direction plus the tie set it was drawn from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub direction: Direction,
    pub candidates: Vec<Direction>,
}

/// Directions with at least one reachable cell
pub fn filter_possible_moves(summaries: &[DirectionSummary]) -> Vec<&DirectionSummary> {
    summaries.iter().filter(|s| s.total_cells > 0).collect()
}

/// Drops tight directions, unless every candidate is tight
pub fn drop_tight_spaces(candidates: Vec<&DirectionSummary>) -> Vec<&DirectionSummary> {
    if candidates.iter().all(|s| s.tight) {
        return candidates;
    }
    candidates.into_iter().filter(|s| !s.tight).collect()
}

/// Directions sharing the minimum closest-food distance
pub fn closest_food_directions(candidates: &[&DirectionSummary]) -> Vec<Direction> {
    let best = match candidates.iter().map(|s| s.closest_food).min() {
        Some(best) => best,
        None => return vec![],
    };

    candidates
        .iter()
        .filter(|s| s.closest_food == best)
        .map(|s| s.direction)
        .collect()
}

/// Picks a move, or `NoLegalMove` when every direction is a dead end
pub fn select_move<R: Rng + ?Sized>(
    summaries: &[DirectionSummary],
    avoid_tight_spaces: bool,
    rng: &mut R,
) -> Result<Selection, DecisionError> {
    let mut possible = filter_possible_moves(summaries);
    if possible.is_empty() {
        return Err(DecisionError::NoLegalMove);
    }

    if avoid_tight_spaces {
        possible = drop_tight_spaces(possible);
    }

    let candidates = closest_food_directions(&possible);
    let direction = candidates[rng.random_range(0..candidates.len())];

    Ok(Selection {
        direction,
        candidates,
    })
}
