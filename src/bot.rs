// Per-turn orchestration for the Halite bot
//
// Each turn: build the map from the snapshot, ask every unit's state machine
// what it wants and commit it right away, settle deferred units, then decide
// on a spawn. The whole thing is sequential and deterministic for a given
// snapshot and status table.

use log::{info, warn};
use std::time::Instant;

use crate::behavior::{BehaviorTable, Thresholds, UnitStatus};
use crate::config::Config;
use crate::error::BotError;
use crate::grid::GameMap;
use crate::protocol::GameInit;
use crate::resolver::{ConflictResolver, Intention};
use crate::spawn;
use crate::types::{Command, Direction, GameConstants, Position, TurnSnapshot, UnitId};

/// Commands decided for one turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnPlan {
    /// One move per unit in commit order, followed by a spawn if any
    pub commands: Vec<Command>,
    pub spawned: bool,
    /// Units that got STILL because the time budget ran out before their turn
    pub skipped: usize,
}

/// Halite bot
/// Takes static configuration plus the engine constants, and keeps the
/// per-unit status table across turns
pub struct Bot {
    config: Config,
    constants: GameConstants,
    thresholds: Thresholds,
    behavior: BehaviorTable,
}

impl Bot {
    /// Creates a new Bot instance
    ///
    /// # Arguments
    /// * `config` - Tuning that does not change during the game
    /// * `constants` - Engine rules received during the handshake
    pub fn new(config: Config, constants: GameConstants) -> Self {
        Self::with_statuses(config, constants, BehaviorTable::new())
    }

    /// Creates a Bot that resumes from a known status table (used by replay)
    pub fn with_statuses(config: Config, constants: GameConstants, behavior: BehaviorTable) -> Self {
        let thresholds = Thresholds::new(&config, &constants);
        Bot {
            config,
            constants,
            thresholds,
            behavior,
        }
    }

    /// Name sent to the engine after the init message
    pub fn name(&self) -> &str {
        &self.config.bot.name
    }

    pub fn constants(&self) -> &GameConstants {
        &self.constants
    }

    /// Current status of every unit ever seen, sorted by id
    pub fn statuses(&self) -> Vec<(UnitId, UnitStatus)> {
        self.behavior.entries()
    }

    /// Called once the handshake has been read
    pub fn start(&self, init: &GameInit) {
        info!(
            "GAME START: player {} of {}, map {}x{}, {} turns",
            init.my_id,
            init.shipyards.len(),
            init.width,
            init.height,
            self.constants.max_turns
        );
    }

    /// Called when the engine closes the stream
    pub fn end(&self, last_turn: u32) {
        info!(
            "GAME OVER after turn {} ({} units seen)",
            last_turn,
            self.behavior.len()
        );
    }

    /// Decides one command per owned unit plus an optional spawn
    ///
    /// # Arguments
    /// * `snapshot` - Complete state for this turn
    ///
    /// # Returns
    /// * `TurnPlan` - Commands to send, in commit order
    pub fn play_turn(&mut self, snapshot: &TurnSnapshot) -> Result<TurnPlan, BotError> {
        let start_time = Instant::now();

        let me = snapshot
            .me()
            .ok_or(BotError::MissingPlayer(snapshot.my_id))?;

        let mut map = GameMap::from_snapshot(snapshot);
        let end_game = self.thresholds.is_end_game(snapshot.turn);
        let deposits: Vec<Position> = me
            .deposit_positions()
            .into_iter()
            .map(|p| map.normalize(p))
            .collect();

        // Plan and submit one unit at a time, in snapshot order, so each
        // unit plans around the moves already committed this turn
        let budget = self.config.timing.effective_budget_ms();
        let mut resolver = ConflictResolver::new(me.id);
        let mut skipped = 0;

        for unit in &me.units {
            let elapsed = start_time.elapsed().as_millis() as u64;
            let direction = if elapsed >= budget {
                skipped += 1;
                Direction::Still
            } else {
                self.behavior
                    .intend(&mut map, unit, &deposits, end_game, &self.thresholds)
            };

            resolver.submit(
                &mut map,
                &Intention {
                    unit: unit.clone(),
                    direction,
                },
            );
        }

        if skipped > 0 {
            warn!(
                "Turn {}: time budget of {}ms exhausted, {} units left STILL",
                snapshot.turn, budget, skipped
            );
        }

        let resolved = resolver.finish(&mut map);

        let spawned = spawn::should_spawn(
            &map,
            me,
            snapshot.turn,
            snapshot.players.len(),
            &self.constants,
            &self.config.spawn,
        );

        info!(
            "Turn {}: {} units, {} swaps, {} blocked, spawn: {}, end game: {} ({}ms)",
            snapshot.turn,
            me.units.len(),
            resolved.swaps,
            resolved.blocked,
            spawned,
            end_game,
            start_time.elapsed().as_millis()
        );

        let mut commands = resolved.commands;
        if spawned {
            commands.push(Command::Spawn);
        }

        Ok(TurnPlan {
            commands,
            spawned,
            skipped,
        })
    }
}
