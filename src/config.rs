// Configuration module for reading Halite.toml
// Tunable policy knobs for the bot; engine rules come from GameConstants instead

use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Main configuration structure containing all tunable parameters
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub bot: BotConfig,
    pub timing: TimingConfig,
    pub behavior: BehaviorConfig,
    pub search: SearchConfig,
    pub spawn: SpawnConfig,
    pub debug: DebugConfig,
}

/// Identity sent to the engine during the handshake
#[derive(Debug, Deserialize, Clone)]
pub struct BotConfig {
    pub name: String,
}

/// Timing and performance constants
#[derive(Debug, Deserialize, Clone)]
pub struct TimingConfig {
    pub turn_time_budget_ms: u64,
    pub io_overhead_ms: u64,
}

impl TimingConfig {
    /// Computes the effective computation budget
    pub fn effective_budget_ms(&self) -> u64 {
        self.turn_time_budget_ms.saturating_sub(self.io_overhead_ms)
    }
}

/// Unit state machine thresholds
#[derive(Debug, Deserialize, Clone)]
pub struct BehaviorConfig {
    /// Fraction of MAX_HALITE carried before heading home
    pub return_fraction: f64,
    /// Fraction of MAX_HALITE below which a cell is abandoned
    pub low_halite_fraction: f64,
    /// Units stop exploring once fewer turns than this remain
    pub end_game_margin_turns: u32,
    /// Book the cell a unit sits on while mining it
    pub book_idle_cell: bool,
}

/// Resource search constants
#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    pub target_halite: u32,
    pub max_radius: u32,
}

/// Ship production constants
#[derive(Debug, Deserialize, Clone)]
pub struct SpawnConfig {
    pub last_spawn_turn: u32,
    pub max_units_two_player: usize,
    pub max_units_multi_player: usize,
}

impl SpawnConfig {
    pub fn max_units(&self, num_players: usize) -> usize {
        if num_players > 2 {
            self.max_units_multi_player
        } else {
            self.max_units_two_player
        }
    }
}

/// Debug configuration
#[derive(Debug, Deserialize, Clone)]
pub struct DebugConfig {
    pub enabled: bool,
    pub log_file_path: String,
}

impl Config {
    /// Loads configuration from a TOML file
    ///
    /// # Arguments
    /// * `path` - Path to the Halite.toml configuration file
    ///
    /// # Returns
    /// * `Result<Config, String>` - Parsed configuration or error message
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let contents = fs::read_to_string(path.as_ref())
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        toml::from_str(&contents).map_err(|e| format!("Failed to parse config file: {}", e))
    }

    /// Loads default configuration from Halite.toml in the project root
    pub fn load_default() -> Result<Self, String> {
        Self::from_file("Halite.toml")
    }

    /// Creates a configuration with hardcoded default values as fallback
    /// This should match the constants defined in Halite.toml
    pub fn default_hardcoded() -> Self {
        Config {
            bot: BotConfig {
                name: "halite-bot".to_string(),
            },
            timing: TimingConfig {
                turn_time_budget_ms: 2000,
                io_overhead_ms: 500,
            },
            behavior: BehaviorConfig {
                return_fraction: 0.9,
                low_halite_fraction: 0.05,
                end_game_margin_turns: 30,
                book_idle_cell: true,
            },
            search: SearchConfig {
                target_halite: 51,
                max_radius: 32,
            },
            spawn: SpawnConfig {
                last_spawn_turn: 200,
                max_units_two_player: 25,
                max_units_multi_player: 17,
            },
            debug: DebugConfig {
                enabled: false,
                log_file_path: "halite_debug.jsonl".to_string(),
            },
        }
    }

    /// Attempts to load from file, falls back to hardcoded defaults on error
    pub fn load_or_default() -> Self {
        Self::load_default().unwrap_or_else(|e| {
            eprintln!(
                "Warning: Could not load Halite.toml ({}), using hardcoded defaults",
                e
            );
            Self::default_hardcoded()
        })
    }
}
