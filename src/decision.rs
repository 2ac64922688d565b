// Single-turn decision pipeline
//
// Board snapshot -> occupancy model -> four reachability searches ->
// per-direction summaries -> move selection. Nothing survives the call.

use log::info;
use rand::Rng;

use crate::config::Config;
use crate::error::DecisionError;
use crate::metadata::{DecisionContext, ExecutionStrategy};
use crate::search::SearchBudget;
use crate::selector;
use crate::types::{Board, Direction};

/// Knobs for one decision, usually derived from `Config`
#[derive(Debug, Clone)]
pub struct DecisionOptions {
    pub strategy: ExecutionStrategy,
    pub avoid_tight_spaces: bool,
    pub taunt: Option<String>,
}

impl DecisionOptions {
    pub fn from_config(config: &Config) -> Self {
        DecisionOptions {
            strategy: ExecutionStrategy::determine(
                config.search.parallel,
                config.search.min_cpus_for_parallel,
            ),
            avoid_tight_spaces: config.selection.avoid_tight_spaces,
            taunt: config.appearance.taunt.clone(),
        }
    }
}

impl Default for DecisionOptions {
    fn default() -> Self {
        DecisionOptions {
            strategy: ExecutionStrategy::Sequential,
            avoid_tight_spaces: true,
            taunt: None,
        }
    }
}

/// The chosen move and everything that led to it
#[derive(Debug, Clone)]
pub struct Decision {
    pub direction: Direction,
    /// Tie set the direction was drawn from
    pub candidates: Vec<Direction>,
    pub context: DecisionContext,
    pub taunt: Option<String>,
}

/// Chooses the controlled snake's next move
///
/// # Errors
/// * `NotFound` - `you_id` is not on the board
/// * `DeadlineExceeded` - the budget ran out before any direction was explored
/// * `NoLegalMove` - every direction is off-board or blocked
pub fn decide<R: Rng + ?Sized>(
    board: &Board,
    you_id: &str,
    rng: &mut R,
    budget: &SearchBudget,
    options: &DecisionOptions,
) -> Result<Decision, DecisionError> {
    let context = DecisionContext::build(board, you_id, budget, options.strategy)?;

    let selection = match selector::select_move(&context.directions, options.avoid_tight_spaces, rng)
    {
        Err(DecisionError::NoLegalMove) if context.truncated() => {
            return Err(DecisionError::DeadlineExceeded)
        }
        other => other?,
    };

    info!(
        "Chose {} from {:?}{}{}",
        selection.direction.as_str(),
        selection
            .candidates
            .iter()
            .map(|d| d.as_str())
            .collect::<Vec<_>>(),
        if context.no_food() { " (no food reachable)" } else { "" },
        if context.truncated() { " (partial search)" } else { "" },
    );

    Ok(Decision {
        direction: selection.direction,
        candidates: selection.candidates,
        context,
        taunt: options.taunt.clone(),
    })
}
