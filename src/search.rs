// Reachability search from a single starting cell
//
// A depth-labelled flood fill driven by a min-heap keyed on "moves from start".
// Cells are grouped into cumulative depth layers; hazard cells are walls, but
// the vacancy records of occupied cells met at the edge of the explored region
// are collected so callers can reason about when the region opens up.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::geometry;
use crate::occupancy::{Occupancy, VacancyRecord};
use crate::types::{Board, Coord};

/// Cumulative counts for every cell reachable within `depth` steps of the start
///
/// The start cell itself is depth 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DepthLayer {
    pub depth: usize,
    pub food: usize,
    pub cells: usize,
}

/// Deadline and cancellation shared by every search in one decision
#[derive(Debug, Clone)]
pub struct SearchBudget {
    deadline: Option<Instant>,
    cancelled: Arc<AtomicBool>,
    check_interval: usize,
    /// Heap pops allowed per search; `None` means no limit
    pop_limit: Option<usize>,
}

impl SearchBudget {
    const DEFAULT_CHECK_INTERVAL: usize = 32;

    /// A budget that only stops when cancelled
    pub fn unbounded() -> Self {
        SearchBudget {
            deadline: None,
            cancelled: Arc::new(AtomicBool::new(false)),
            check_interval: Self::DEFAULT_CHECK_INTERVAL,
            pop_limit: None,
        }
    }

    pub fn until(deadline: Instant) -> Self {
        SearchBudget {
            deadline: Some(deadline),
            ..Self::unbounded()
        }
    }

    /// Number of heap pops between budget checks
    pub fn with_check_interval(mut self, check_interval: usize) -> Self {
        self.check_interval = check_interval.max(1);
        self
    }

    /// Caps the number of cells each search may expand
    pub fn with_pop_limit(mut self, pop_limit: usize) -> Self {
        self.pop_limit = Some(pop_limit);
        self
    }

    /// Handle the caller can use to abort outstanding searches
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        self.cancelled.clone()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_exhausted(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
            || self.deadline.map_or(false, |deadline| Instant::now() >= deadline)
    }

    fn should_stop(&self, pops: usize) -> bool {
        if self.pop_limit.map_or(false, |limit| pops >= limit) {
            return true;
        }
        pops % self.check_interval == 0 && self.is_exhausted()
    }
}

/// Result of one reachability search
#[derive(Debug, Clone, Default)]
pub struct SearchOutcome {
    /// Completed layers in strictly increasing depth order
    pub layers: Vec<DepthLayer>,
    /// Vacancy records of occupied cells bordering the explored region
    pub frontier: Vec<VacancyRecord>,
    /// Set when the budget ran out before the region was exhausted
    pub truncated: bool,
}

impl SearchOutcome {
    pub fn total_cells(&self) -> usize {
        self.layers.last().map_or(0, |layer| layer.cells)
    }

    pub fn total_food(&self) -> usize {
        self.layers.last().map_or(0, |layer| layer.food)
    }
}

/// Explores every cell reachable from `start` without crossing a hazard
///
/// An off-board (`None`) or hazardous start yields no layers. A truncated
/// search keeps only the layers it finished; the layer being expanded when
/// the budget ran out is dropped.
pub fn reachability_search(
    start: Option<Coord>,
    board: &Board,
    occupancy: &Occupancy,
    budget: &SearchBudget,
) -> SearchOutcome {
    let start = match start {
        Some(cell) if board.contains(cell) && !occupancy.is_hazard(cell) => cell,
        _ => return SearchOutcome::default(),
    };

    let mut outcome = SearchOutcome::default();
    let mut seen: HashSet<Coord> = HashSet::new();
    let mut frontier_seen: HashSet<Coord> = HashSet::new();
    let mut queue: BinaryHeap<Reverse<(usize, i32, i32)>> = BinaryHeap::new();

    seen.insert(start);
    queue.push(Reverse((1, start.x, start.y)));

    let mut accumulator = DepthLayer {
        depth: 1,
        ..DepthLayer::default()
    };
    let mut pops = 0;

    while let Some(Reverse((depth, x, y))) = queue.pop() {
        if budget.should_stop(pops) {
            outcome.truncated = true;
            break;
        }
        pops += 1;

        if depth > accumulator.depth {
            outcome.layers.push(accumulator);
            accumulator = DepthLayer {
                depth,
                ..accumulator
            };
        }

        let cell = Coord::new(x, y);
        if occupancy.is_food(cell) {
            accumulator.food += 1;
        }
        accumulator.cells += 1;

        for next in geometry::neighbors(cell, board) {
            if occupancy.is_hazard(next) {
                if let Some(record) = occupancy.vacancy_at(next) {
                    if frontier_seen.insert(next) {
                        outcome.frontier.push(record.clone());
                    }
                }
                continue;
            }
            if seen.insert(next) {
                queue.push(Reverse((depth + 1, next.x, next.y)));
            }
        }
    }

    if !outcome.truncated && accumulator.cells > 0 {
        outcome.layers.push(accumulator);
    }

    outcome
}
