// Battlesnake bot: the request-facing shell around the decision pipeline
//
// Each move runs `decide` on a blocking worker while an async poller watches
// the clock. When the budget runs out the searches are cancelled and whatever
// has been decided (or a fallback) is returned.

use log::{info, warn};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::Config;
use crate::decision::{decide, Decision, DecisionOptions};
use crate::error::DecisionError;
use crate::geometry;
use crate::search::SearchBudget;
use crate::turn_recorder::TurnRecorder;
use crate::types::{Battlesnake, Board, Direction, Game};

/// State shared between the async poller and the blocking decision worker
#[derive(Debug)]
pub struct SharedDecisionState {
    outcome: Mutex<Option<Result<Decision, DecisionError>>>,
    complete: AtomicBool,
}

impl SharedDecisionState {
    pub fn new() -> Self {
        SharedDecisionState {
            outcome: Mutex::new(None),
            complete: AtomicBool::new(false),
        }
    }

    fn publish(&self, outcome: Result<Decision, DecisionError>) {
        *self.outcome.lock() = Some(outcome);
        self.complete.store(true, Ordering::Release);
    }

    pub fn is_complete(&self) -> bool {
        self.complete.load(Ordering::Acquire)
    }

    pub fn take(&self) -> Option<Result<Decision, DecisionError>> {
        self.outcome.lock().take()
    }
}

impl Default for SharedDecisionState {
    fn default() -> Self {
        Self::new()
    }
}

/// Battlesnake Bot with OOP-style API
/// Takes static configuration dependencies and exposes methods corresponding to API endpoints
pub struct Bot {
    config: Config,
    recorder: TurnRecorder,
}

impl Bot {
    /// Creates a new Bot instance with the given configuration
    pub fn new(config: Config) -> Self {
        Bot {
            config,
            recorder: TurnRecorder::disabled(),
        }
    }

    /// Attaches a turn recorder
    pub fn with_recorder(mut self, recorder: TurnRecorder) -> Self {
        self.recorder = recorder;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns bot metadata and appearance
    /// Corresponds to GET / endpoint
    pub fn info(&self) -> Value {
        info!("INFO");

        let appearance = &self.config.appearance;
        json!({
            "apiversion": "1",
            "author": appearance.author,
            "color": appearance.color,
            "head": appearance.head,
            "tail": appearance.tail,
        })
    }

    /// Called when a game starts
    /// Corresponds to POST /start endpoint
    pub fn start(&self, game: &Game, _turn: &i32, board: &Board, _you: &Battlesnake) {
        info!("GAME START {} ({}x{})", game.id, board.width, board.height);
        self.recorder.record_game_start(game, board);
    }

    /// Called when a game ends
    /// Corresponds to POST /end endpoint
    pub fn end(&self, game: &Game, turn: &i32, _board: &Board, _you: &Battlesnake) {
        info!("GAME OVER {} after {} turns", game.id, turn);
    }

    /// Computes and returns the next move
    /// Corresponds to POST /move endpoint
    ///
    /// # Returns
    /// * `Value` - JSON response with the chosen `move` and an optional `shout`
    pub async fn get_move(&self, game: &Game, turn: &i32, board: &Board, you: &Battlesnake) -> Value {
        let start_time = Instant::now();
        let effective_budget = Duration::from_millis(self.config.timing.effective_budget_ms());
        let polling_interval = Duration::from_millis(self.config.timing.polling_interval_ms.max(1));
        let search_budget = Duration::from_millis(self.config.timing.search_budget_ms());

        info!("Turn {}: Computing move", turn);

        let budget = SearchBudget::until(start_time + search_budget)
            .with_check_interval(self.config.search.deadline_check_interval);
        let shared = Arc::new(SharedDecisionState::new());

        {
            let shared = shared.clone();
            let budget = budget.clone();
            let board = board.clone();
            let you_id = you.id.clone();
            let options = DecisionOptions::from_config(&self.config);
            let mut rng = Self::turn_rng(self.config.selection.rng_seed, *turn);

            tokio::task::spawn_blocking(move || {
                let outcome = decide(&board, &you_id, &mut rng, &budget, &options);
                shared.publish(outcome);
            });
        }

        // Polling loop: wait for the worker or the deadline
        loop {
            tokio::time::sleep(polling_interval).await;
            if shared.is_complete() || start_time.elapsed() >= effective_budget {
                break;
            }
        }
        budget.cancel();

        let (chosen_move, shout) = match shared.take() {
            Some(Ok(decision)) => (decision.direction, decision.taunt),
            Some(Err(e)) => {
                warn!("Turn {}: {}, using fallback", turn, e);
                (Self::fallback_move(board, you), None)
            }
            None => {
                warn!("Turn {}: no decision within budget, using fallback", turn);
                (Self::fallback_move(board, you), None)
            }
        };

        info!(
            "Turn {}: Chose {} (time: {}ms)",
            turn,
            chosen_move.as_str(),
            start_time.elapsed().as_millis()
        );

        self.recorder
            .record_move(game, *turn, &you.id, board.clone(), chosen_move);

        match shout {
            Some(shout) => json!({ "move": chosen_move.as_str(), "shout": shout }),
            None => json!({ "move": chosen_move.as_str() }),
        }
    }

    /// Per-turn generator: deterministic when a seed is configured
    pub fn turn_rng(seed: Option<u64>, turn: i32) -> StdRng {
        match seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(turn as u64)),
            None => StdRng::from_os_rng(),
        }
    }

    /// Last-resort direction when no decision is available
    ///
    /// Prefers an on-board cell that is not a body segment, then any on-board
    /// cell, then up.
    pub fn fallback_move(board: &Board, you: &Battlesnake) -> Direction {
        let head = match board.snake(&you.id).and_then(|s| s.head()).or_else(|| you.head()) {
            Some(head) => head,
            None => return Direction::Up,
        };

        let on_board: Vec<Direction> = Direction::all()
            .iter()
            .copied()
            .filter(|&dir| geometry::step(dir, head, board).is_some())
            .collect();

        on_board
            .iter()
            .copied()
            .find(|&dir| {
                let next = dir.apply(&head);
                !board.snakes.iter().any(|s| s.body.contains(&next))
            })
            .or_else(|| on_board.first().copied())
            .unwrap_or(Direction::Up)
    }
}
