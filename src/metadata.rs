// Per-direction metadata
//
// Runs one reachability search from each cell adjacent to the controlled
// snake's head and reduces it to a DirectionSummary.

use log::debug;
use rayon::prelude::*;
use std::fmt;

use crate::error::DecisionError;
use crate::geometry;
use crate::occupancy::{Occupancy, VacancyRecord};
use crate::search::{reachability_search, DepthLayer, SearchBudget, SearchOutcome};
use crate::types::{Board, Coord, Direction};

/// Distance to the nearest food, as a 1-based depth layer index
///
/// `Unreachable` orders after every reachable depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FoodDistance {
    Reachable(usize),
    Unreachable,
}

impl fmt::Display for FoodDistance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FoodDistance::Reachable(depth) => write!(f, "{}", depth),
            FoodDistance::Unreachable => write!(f, "unreachable"),
        }
    }
}

/// Execution strategy for the four per-direction searches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionStrategy {
    /// One search after another on the calling thread
    Sequential,
    /// Searches fanned out over the rayon pool
    Parallel,
}

impl ExecutionStrategy {
    /// Picks parallel execution only when enabled and the pool is wide enough
    pub fn determine(parallel_enabled: bool, min_cpus_for_parallel: usize) -> Self {
        let num_cpus = rayon::current_num_threads();
        if parallel_enabled && num_cpus >= min_cpus_for_parallel {
            ExecutionStrategy::Parallel
        } else {
            ExecutionStrategy::Sequential
        }
    }
}

/// Reduced search output for one candidate direction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectionSummary {
    pub direction: Direction,
    /// First cell in this direction, None when it is off the board
    pub start: Option<Coord>,
    pub closest_food: FoodDistance,
    pub total_cells: usize,
    pub total_food: usize,
    /// Cells left over once the snake and all the food it eats are packed in
    pub moves_vs_space: i64,
    /// Bordering segment that frees up soonest
    pub tightest_vacancy: Option<VacancyRecord>,
    /// Region is too small for the snake and will not open up in time
    pub tight: bool,
    pub truncated: bool,
}

impl DirectionSummary {
    pub fn from_outcome(
        direction: Direction,
        start: Option<Coord>,
        outcome: SearchOutcome,
        my_length: usize,
    ) -> Self {
        let total_cells = outcome.total_cells();
        let total_food = outcome.total_food();
        let moves_vs_space = total_cells as i64 - (my_length + total_food) as i64;
        let tightest_vacancy = tightest_vacancy(&outcome.frontier);
        let opens_in_time = tightest_vacancy
            .as_ref()
            .map_or(false, |record| record.turns_until_vacant <= total_cells);

        DirectionSummary {
            direction,
            start,
            closest_food: closest_food(&outcome.layers),
            total_cells,
            total_food,
            moves_vs_space,
            tightest_vacancy,
            tight: moves_vs_space < 0 && !opens_in_time,
            truncated: outcome.truncated,
        }
    }
}

impl fmt::Display for DirectionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: closest_food={} cells={} food={} moves_vs_space={} tight={}",
            self.direction.as_str(),
            self.closest_food,
            self.total_cells,
            self.total_food,
            self.moves_vs_space,
            self.tight
        )?;
        if let Some(record) = &self.tightest_vacancy {
            write!(
                f,
                " key_segment={}@({},{}) in {}",
                record.snake_id, record.cell.x, record.cell.y, record.turns_until_vacant
            )?;
        }
        if self.truncated {
            write!(f, " (truncated)")?;
        }
        Ok(())
    }
}

/// 1-based index of the first layer that has seen any food
pub fn closest_food(layers: &[DepthLayer]) -> FoodDistance {
    layers
        .iter()
        .position(|layer| layer.food > 0)
        .map_or(FoodDistance::Unreachable, |index| FoodDistance::Reachable(index + 1))
}

/// The bordering vacancy record with the fewest turns until vacant
pub fn tightest_vacancy(frontier: &[VacancyRecord]) -> Option<VacancyRecord> {
    frontier
        .iter()
        .min_by_key(|record| record.turns_until_vacant)
        .cloned()
}

/// Everything computed about the board for one decision
#[derive(Debug, Clone)]
pub struct DecisionContext {
    pub you_id: String,
    pub head: Coord,
    pub occupancy: Occupancy,
    /// One summary per direction, in `Direction::all()` order
    pub directions: Vec<DirectionSummary>,
}

impl DecisionContext {
    /// Builds the occupancy model and searches all four directions from the head
    pub fn build(
        board: &Board,
        you_id: &str,
        budget: &SearchBudget,
        strategy: ExecutionStrategy,
    ) -> Result<Self, DecisionError> {
        let you = board
            .snake(you_id)
            .ok_or_else(|| DecisionError::NotFound(you_id.to_string()))?;
        let head = you
            .head()
            .ok_or_else(|| DecisionError::NotFound(you_id.to_string()))?;

        let occupancy = Occupancy::build(board, you_id, you.body.len());

        let summarize = |direction: &Direction| {
            let start = geometry::step(*direction, head, board);
            let outcome = reachability_search(start, board, &occupancy, budget);
            DirectionSummary::from_outcome(*direction, start, outcome, occupancy.my_length)
        };

        let all = Direction::all();
        let directions: Vec<DirectionSummary> = match strategy {
            ExecutionStrategy::Parallel => all.par_iter().map(summarize).collect(),
            ExecutionStrategy::Sequential => all.iter().map(summarize).collect(),
        };

        for summary in &directions {
            debug!("{}", summary);
        }

        Ok(DecisionContext {
            you_id: you_id.to_string(),
            head,
            occupancy,
            directions,
        })
    }

    pub fn summary(&self, direction: Direction) -> Option<&DirectionSummary> {
        self.directions.iter().find(|s| s.direction == direction)
    }

    /// True when no direction can reach any food
    pub fn no_food(&self) -> bool {
        self.directions.iter().all(|s| s.total_food == 0)
    }

    /// True when any search was cut short by the budget
    pub fn truncated(&self) -> bool {
        self.directions.iter().any(|s| s.truncated)
    }
}
