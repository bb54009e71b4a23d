// Replay module for analyzing historical game states and debugging decision-making
//
// This module provides functionality to:
// 1. Parse JSONL debug logs
// 2. Re-plan each logged turn from its snapshot and status table
// 3. Compare logged vs replayed commands
// 4. Generate detailed analysis reports

use log::{info, warn};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::Instant;

use crate::behavior::BehaviorTable;
use crate::bot::Bot;
use crate::config::Config;
use crate::debug_logger::DebugLogEntry;
use crate::protocol::format_commands;
use crate::types::{Direction, UnitId};

/// Result of replaying a single turn
#[derive(Debug, Clone)]
pub struct ReplayResult {
    pub turn: u32,
    pub original_commands: String,
    pub replayed_commands: String,
    pub matches: bool,
    pub computation_time_ms: u128,
}

/// Statistics for a complete replay session
#[derive(Debug, Default)]
pub struct ReplayStats {
    pub total_turns: usize,
    pub matches: usize,
    pub mismatches: usize,
    pub match_rate: f64,
}

/// Replay engine for analyzing debug logs
pub struct ReplayEngine {
    config: Config,
    verbose: bool,
}

impl ReplayEngine {
    /// Creates a new replay engine with the given configuration
    pub fn new(config: Config, verbose: bool) -> Self {
        ReplayEngine { config, verbose }
    }

    /// Loads all log entries from a JSONL file
    pub fn load_log_file<P: AsRef<Path>>(&self, log_path: P) -> Result<Vec<DebugLogEntry>, String> {
        let file = File::open(log_path.as_ref())
            .map_err(|e| format!("Failed to open log file: {}", e))?;

        let reader = BufReader::new(file);
        let mut entries = Vec::new();

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| format!("Failed to read line {}: {}", line_num + 1, e))?;

            if line.trim().is_empty() {
                continue;
            }

            let entry: DebugLogEntry = serde_json::from_str(&line).map_err(|e| {
                format!("Failed to parse JSON on line {}: {}", line_num + 1, e)
            })?;

            entries.push(entry);
        }

        // Writes are fire-and-forget, so lines may land out of order
        entries.sort_by_key(|e| e.turn);

        info!("Loaded {} log entries", entries.len());
        Ok(entries)
    }

    /// Re-plans a single logged turn and returns the command line it produces
    pub fn replay_turn(&self, entry: &DebugLogEntry) -> Result<(String, u128), String> {
        let start_time = Instant::now();

        let behavior = BehaviorTable::from_entries(entry.statuses.iter().copied());
        let mut bot = Bot::with_statuses(self.config.clone(), entry.constants.clone(), behavior);

        let plan = bot
            .play_turn(&entry.snapshot)
            .map_err(|e| format!("Turn {} could not be planned: {}", entry.turn, e))?;

        Ok((format_commands(&plan.commands), start_time.elapsed().as_millis()))
    }

    /// Replays a single log entry and compares the result
    pub fn replay_entry(&self, entry: &DebugLogEntry) -> Result<ReplayResult, String> {
        if self.verbose {
            info!("Replaying turn {}...", entry.turn);
        }

        let (replayed_commands, computation_time) = self.replay_turn(entry)?;
        let matches = replayed_commands == entry.commands;

        if self.verbose {
            if matches {
                info!(
                    "Turn {}: ✓ MATCH - {} (time: {}ms)",
                    entry.turn, replayed_commands, computation_time
                );
            } else {
                warn!(
                    "Turn {}: ✗ MISMATCH - Original: {}, Replayed: {} (time: {}ms)",
                    entry.turn, entry.commands, replayed_commands, computation_time
                );
            }
        }

        Ok(ReplayResult {
            turn: entry.turn,
            original_commands: entry.commands.clone(),
            replayed_commands,
            matches,
            computation_time_ms: computation_time,
        })
    }

    /// Replays all entries in a log file
    pub fn replay_all(&self, entries: &[DebugLogEntry]) -> Result<Vec<ReplayResult>, String> {
        let mut results = Vec::new();

        for entry in entries {
            match self.replay_entry(entry) {
                Ok(result) => results.push(result),
                Err(e) => {
                    warn!("Failed to replay turn {}: {}", entry.turn, e);
                }
            }
        }

        Ok(results)
    }

    /// Replays specific turns
    pub fn replay_turns(
        &self,
        entries: &[DebugLogEntry],
        turn_numbers: &[u32],
    ) -> Result<Vec<ReplayResult>, String> {
        let mut results = Vec::new();

        for turn_num in turn_numbers {
            let entry = entries
                .iter()
                .find(|e| e.turn == *turn_num)
                .ok_or_else(|| format!("Turn {} not found in log file", turn_num))?;

            match self.replay_entry(entry) {
                Ok(result) => results.push(result),
                Err(e) => {
                    warn!("Failed to replay turn {}: {}", turn_num, e);
                }
            }
        }

        Ok(results)
    }

    /// Generates statistics from replay results
    pub fn generate_stats(&self, results: &[ReplayResult]) -> ReplayStats {
        let total_turns = results.len();
        let matches = results.iter().filter(|r| r.matches).count();
        let mismatches = total_turns - matches;
        let match_rate = if total_turns > 0 {
            (matches as f64 / total_turns as f64) * 100.0
        } else {
            0.0
        };

        ReplayStats {
            total_turns,
            matches,
            mismatches,
            match_rate,
        }
    }

    /// Prints a detailed report of replay results
    pub fn print_report(&self, results: &[ReplayResult]) {
        let stats = self.generate_stats(results);

        println!("\n═══════════════════════════════════════════════════════════");
        println!("                    REPLAY REPORT");
        println!("═══════════════════════════════════════════════════════════");
        println!("Total Turns:    {}", stats.total_turns);
        println!("Matches:        {} ({:.1}%)", stats.matches, stats.match_rate);
        println!("Mismatches:     {}", stats.mismatches);
        println!("═══════════════════════════════════════════════════════════\n");

        if !results.is_empty() {
            let avg_time: f64 = results
                .iter()
                .map(|r| r.computation_time_ms as f64)
                .sum::<f64>()
                / results.len() as f64;

            println!("Average Computation Time:   {:.1}ms\n", avg_time);
        }

        let mismatches: Vec<_> = results.iter().filter(|r| !r.matches).collect();
        if !mismatches.is_empty() {
            println!("═══════════════════════════════════════════════════════════");
            println!("                  DETAILED MISMATCHES");
            println!("═══════════════════════════════════════════════════════════");

            for result in mismatches {
                println!("Turn {}:", result.turn);
                println!("  logged:   {}", result.original_commands);
                println!("  replayed: {}", result.replayed_commands);
            }
            println!();
        }
    }

    /// Validates that specific units made one of the expected moves
    pub fn validate_expected_moves(
        &self,
        entries: &[DebugLogEntry],
        expected_moves: &[(u32, UnitId, Vec<Direction>)], // (turn, unit, acceptable_moves)
    ) -> Result<(), String> {
        for (turn, unit, acceptable) in expected_moves {
            let entry = entries
                .iter()
                .find(|e| e.turn == *turn)
                .ok_or_else(|| format!("Turn {} not found in log", turn))?;

            let actual_move = Self::logged_direction(&entry.commands, *unit)
                .ok_or_else(|| format!("Turn {}: no move logged for unit {}", turn, unit))?;

            if !acceptable.contains(&actual_move) {
                return Err(format!(
                    "Turn {}: Expected unit {} to move one of {:?}, but got {}",
                    turn,
                    unit,
                    acceptable.iter().map(|d| d.as_str()).collect::<Vec<_>>(),
                    actual_move.as_str()
                ));
            }
        }

        Ok(())
    }

    /// Finds `unit`'s move in a logged command line such as "m 1 n m 2 o g"
    fn logged_direction(commands: &str, unit: UnitId) -> Option<Direction> {
        let tokens: Vec<&str> = commands.split_whitespace().collect();
        let mut i = 0;
        while i < tokens.len() {
            if tokens[i] == "m" && i + 2 < tokens.len() {
                if tokens[i + 1].parse::<u32>().ok() == Some(unit.0) {
                    return tokens[i + 2].chars().next().and_then(Direction::from_char);
                }
                i += 3;
            } else {
                i += 1;
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logged_direction() {
        let line = "m 1 n m 12 o m 3 e g";
        assert_eq!(
            ReplayEngine::logged_direction(line, UnitId(1)),
            Some(Direction::North)
        );
        assert_eq!(
            ReplayEngine::logged_direction(line, UnitId(12)),
            Some(Direction::Still)
        );
        assert_eq!(
            ReplayEngine::logged_direction(line, UnitId(3)),
            Some(Direction::East)
        );
        assert_eq!(ReplayEngine::logged_direction(line, UnitId(2)), None);
        assert_eq!(ReplayEngine::logged_direction("", UnitId(1)), None);
    }

    #[test]
    fn test_generate_stats() {
        let engine = ReplayEngine::new(Config::default_hardcoded(), false);
        let result = |turn, matches| ReplayResult {
            turn,
            original_commands: String::new(),
            replayed_commands: String::new(),
            matches,
            computation_time_ms: 0,
        };

        let stats = engine.generate_stats(&[result(1, true), result(2, true), result(3, false), result(4, true)]);
        assert_eq!(stats.total_turns, 4);
        assert_eq!(stats.matches, 3);
        assert_eq!(stats.mismatches, 1);
        assert_eq!(stats.match_rate, 75.0);

        assert_eq!(engine.generate_stats(&[]).match_rate, 0.0);
    }
}
