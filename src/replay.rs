// Replay module for re-running recorded turns through the decision pipeline
//
// This module provides functionality to:
// 1. Parse JSONL turn recordings
// 2. Replay the decision on each recorded board
// 3. Compare recorded vs replayed moves, allowing for random tie-breaks
// 4. Generate summary reports

use log::{info, warn};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::Instant;

use crate::bot::Bot;
use crate::config::Config;
use crate::decision::{decide, DecisionOptions};
use crate::metadata::FoodDistance;
use crate::search::SearchBudget;
use crate::turn_recorder::{MoveRecord, RecordEntry};
use crate::types::Direction;

/// Result of replaying a single turn
#[derive(Debug, Clone)]
pub struct ReplayResult {
    pub turn: i32,
    pub original_move: Direction,
    pub replayed_move: Direction,
    /// Replayed tie set; the original move may legitimately be any of these
    pub candidates: Vec<Direction>,
    pub matches: bool,
    pub consistent: bool,
    pub closest_food: FoodDistance,
    pub computation_time_ms: u128,
}

/// Statistics for a complete replay session
#[derive(Debug, Default)]
pub struct ReplayStats {
    pub total_turns: usize,
    pub matches: usize,
    pub consistent: usize,
    pub mismatches: usize,
    pub match_rate: f64,
}

/// Replay engine for analyzing recorded games
pub struct ReplayEngine {
    config: Config,
    verbose: bool,
}

impl ReplayEngine {
    /// Creates a new replay engine with the given configuration
    pub fn new(config: Config, verbose: bool) -> Self {
        ReplayEngine { config, verbose }
    }

    /// Loads all move records from a JSONL file, skipping game-start lines
    pub fn load_log_file<P: AsRef<Path>>(&self, log_path: P) -> Result<Vec<MoveRecord>, String> {
        let file =
            File::open(log_path.as_ref()).map_err(|e| format!("Failed to open log file: {}", e))?;

        let reader = BufReader::new(file);
        let mut entries = Vec::new();

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| format!("Failed to read line {}: {}", line_num + 1, e))?;

            if line.trim().is_empty() {
                continue;
            }

            let entry: RecordEntry = serde_json::from_str(&line)
                .map_err(|e| format!("Failed to parse JSON on line {}: {}", line_num + 1, e))?;

            if let RecordEntry::Move(record) = entry {
                entries.push(record);
            }
        }

        info!("Loaded {} move records", entries.len());
        Ok(entries)
    }

    /// Replays a single record and compares the result
    pub fn replay_entry(&self, entry: &MoveRecord) -> Result<ReplayResult, String> {
        if self.verbose {
            info!("Replaying turn {}...", entry.turn);
        }

        let start_time = Instant::now();
        let mut rng = Bot::turn_rng(Some(self.config.selection.rng_seed.unwrap_or(0)), entry.turn);
        let budget = SearchBudget::unbounded();
        let options = DecisionOptions::from_config(&self.config);

        let decision = decide(&entry.board, &entry.you_id, &mut rng, &budget, &options)
            .map_err(|e| format!("Turn {}: {}", entry.turn, e))?;

        let closest_food = decision
            .context
            .summary(decision.direction)
            .map_or(FoodDistance::Unreachable, |s| s.closest_food);

        let result = ReplayResult {
            turn: entry.turn,
            original_move: entry.chosen_move,
            replayed_move: decision.direction,
            matches: entry.chosen_move == decision.direction,
            consistent: decision.candidates.contains(&entry.chosen_move),
            candidates: decision.candidates,
            closest_food,
            computation_time_ms: start_time.elapsed().as_millis(),
        };

        if self.verbose {
            if result.consistent {
                info!(
                    "Turn {}: ✓ {} (replayed {}, closest food {}, {}ms)",
                    result.turn,
                    result.original_move.as_str(),
                    result.replayed_move.as_str(),
                    result.closest_food,
                    result.computation_time_ms
                );
            } else {
                warn!(
                    "Turn {}: ✗ MISMATCH - Original: {}, Replayed: {} (candidates: {:?})",
                    result.turn,
                    result.original_move.as_str(),
                    result.replayed_move.as_str(),
                    result.candidates
                );
            }
        }

        Ok(result)
    }

    /// Replays all records, logging and skipping turns that fail
    pub fn replay_all(&self, entries: &[MoveRecord]) -> Vec<ReplayResult> {
        entries
            .iter()
            .filter_map(|entry| match self.replay_entry(entry) {
                Ok(result) => Some(result),
                Err(e) => {
                    warn!("Failed to replay turn {}: {}", entry.turn, e);
                    None
                }
            })
            .collect()
    }

    /// Replays specific turns
    pub fn replay_turns(
        &self,
        entries: &[MoveRecord],
        turn_numbers: &[i32],
    ) -> Result<Vec<ReplayResult>, String> {
        let mut selected = Vec::new();
        for turn_num in turn_numbers {
            let entry = entries
                .iter()
                .find(|e| e.turn == *turn_num)
                .ok_or_else(|| format!("Turn {} not found in log file", turn_num))?;
            selected.push(entry.clone());
        }

        Ok(self.replay_all(&selected))
    }

    /// Generates statistics from replay results
    pub fn generate_stats(&self, results: &[ReplayResult]) -> ReplayStats {
        let total_turns = results.len();
        let matches = results.iter().filter(|r| r.matches).count();
        let consistent = results.iter().filter(|r| r.consistent).count();
        let match_rate = if total_turns > 0 {
            (consistent as f64 / total_turns as f64) * 100.0
        } else {
            0.0
        };

        ReplayStats {
            total_turns,
            matches,
            consistent,
            mismatches: total_turns - consistent,
            match_rate,
        }
    }

    /// Prints a report of replay results
    pub fn print_report(&self, results: &[ReplayResult]) {
        let stats = self.generate_stats(results);

        println!("\n═══════════════════════════════════════════════════════════");
        println!("                    REPLAY REPORT");
        println!("═══════════════════════════════════════════════════════════");
        println!("Total Turns:    {}", stats.total_turns);
        println!("Exact Matches:  {}", stats.matches);
        println!("Consistent:     {} ({:.1}%)", stats.consistent, stats.match_rate);
        println!("Mismatches:     {}", stats.mismatches);
        println!("═══════════════════════════════════════════════════════════\n");

        if !results.is_empty() {
            let avg_time: f64 = results.iter().map(|r| r.computation_time_ms as f64).sum::<f64>()
                / results.len() as f64;
            println!("Average Computation Time:   {:.1}ms\n", avg_time);
        }

        let mismatches: Vec<_> = results.iter().filter(|r| !r.consistent).collect();
        if !mismatches.is_empty() {
            println!("═══════════════════════════════════════════════════════════");
            println!("                  DETAILED MISMATCHES");
            println!("═══════════════════════════════════════════════════════════");

            for result in mismatches {
                println!(
                    "Turn {}: {} → {} (candidates: {:?})",
                    result.turn,
                    result.original_move.as_str(),
                    result.replayed_move.as_str(),
                    result.candidates.iter().map(|d| d.as_str()).collect::<Vec<_>>()
                );
            }
            println!();
        }
    }

    /// Validates that specific expected moves were made
    pub fn validate_expected_moves(
        &self,
        entries: &[MoveRecord],
        expected_moves: &[(i32, Vec<Direction>)], // (turn, acceptable_moves)
    ) -> Result<(), String> {
        for (turn, acceptable) in expected_moves {
            let entry = entries
                .iter()
                .find(|e| e.turn == *turn)
                .ok_or_else(|| format!("Turn {} not found in log", turn))?;

            if !acceptable.contains(&entry.chosen_move) {
                return Err(format!(
                    "Turn {}: Expected one of {:?}, but got {}",
                    turn,
                    acceptable.iter().map(|d| d.as_str()).collect::<Vec<_>>(),
                    entry.chosen_move.as_str()
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Battlesnake, Board, Coord};

    fn record(turn: i32, chosen_move: Direction) -> MoveRecord {
        MoveRecord {
            game_id: "g".to_string(),
            turn,
            you_id: "me".to_string(),
            board: Board {
                width: 7,
                height: 7,
                food: vec![Coord::new(3, 6)],
                snakes: vec![Battlesnake::from_body(
                    "me",
                    90,
                    vec![Coord::new(3, 3), Coord::new(3, 2), Coord::new(3, 1)],
                )],
                hazards: vec![],
            },
            chosen_move,
            timestamp: "2024-01-01T00:00:00Z".to_string(),
        }
    }

    fn engine() -> ReplayEngine {
        let mut config = Config::default_hardcoded();
        config.search.parallel = false;
        ReplayEngine::new(config, false)
    }

    #[test]
    fn test_replay_entry_matches_recorded_move() {
        let result = engine().replay_entry(&record(1, Direction::Up)).unwrap();

        assert!(result.matches);
        assert!(result.consistent);
        assert_eq!(result.closest_food, FoodDistance::Reachable(3));
    }

    #[test]
    fn test_replay_entry_flags_mismatch() {
        let result = engine().replay_entry(&record(2, Direction::Left)).unwrap();

        assert!(!result.matches);
        assert!(!result.consistent);
        assert_eq!(result.replayed_move, Direction::Up);
    }

    #[test]
    fn test_replay_entry_reports_missing_snake() {
        let mut entry = record(3, Direction::Up);
        entry.you_id = "ghost".to_string();

        assert!(engine().replay_entry(&entry).is_err());
    }

    #[test]
    fn test_stats_count_consistent_moves() {
        let engine = engine();
        let results = engine.replay_all(&[record(1, Direction::Up), record(2, Direction::Left)]);
        let stats = engine.generate_stats(&results);

        assert_eq!(stats.total_turns, 2);
        assert_eq!(stats.matches, 1);
        assert_eq!(stats.consistent, 1);
        assert_eq!(stats.mismatches, 1);
        assert!((stats.match_rate - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_replay_turns_requires_known_turn() {
        let engine = engine();
        let entries = vec![record(1, Direction::Up)];

        assert_eq!(engine.replay_turns(&entries, &[1]).unwrap().len(), 1);
        assert!(engine.replay_turns(&entries, &[9]).is_err());
    }

    #[test]
    fn test_validate_expected_moves() {
        let engine = engine();
        let entries = vec![record(1, Direction::Up), record(2, Direction::Left)];

        assert!(engine
            .validate_expected_moves(&entries, &[(1, vec![Direction::Up]), (2, vec![Direction::Left, Direction::Right])])
            .is_ok());
        assert!(engine
            .validate_expected_moves(&entries, &[(2, vec![Direction::Down])])
            .is_err());
    }

    #[test]
    fn test_load_log_file_skips_game_start_lines() {
        let path = std::env::temp_dir().join(format!("kaa_replay_{}.jsonl", std::process::id()));
        let start = RecordEntry::GameStart {
            game_id: "g".to_string(),
            width: 7,
            height: 7,
            timestamp: "t".to_string(),
        };
        let lines = vec![
            serde_json::to_string(&start).unwrap(),
            String::new(),
            serde_json::to_string(&RecordEntry::Move(record(1, Direction::Up))).unwrap(),
        ];
        std::fs::write(&path, lines.join("\n")).unwrap();

        let loaded = engine().load_log_file(&path);
        let _ = std::fs::remove_file(&path);

        let loaded = loaded.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].turn, 1);
    }
}
