// Per-unit behavior state machine
//
// Decides what each unit *wants* to do this turn. Never commits anything;
// the resolver turns intentions into commands.

use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config::Config;
use crate::grid::GameMap;
use crate::planner;
use crate::search;
use crate::types::{Direction, GameConstants, Position, Unit, UnitId};

/// Persistent mode of a single unit
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitStatus {
    Exploring,
    Returning,
}

/// Halite thresholds resolved once per game from config and engine constants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    /// Cargo at which an exploring unit heads home
    pub return_halite: u32,
    /// Cells below this are not worth mining in place
    pub low_halite: u32,
    /// Minimum halite for a search target
    pub target_halite: u32,
    pub search_radius: u32,
    pub move_cost_ratio: u32,
    pub end_game_margin: u32,
    pub max_turns: u32,
    pub book_idle_cell: bool,
}

impl Thresholds {
    pub fn new(config: &Config, constants: &GameConstants) -> Self {
        let max = constants.max_halite as f64;
        Thresholds {
            return_halite: (max * config.behavior.return_fraction).round() as u32,
            low_halite: (max * config.behavior.low_halite_fraction).round() as u32,
            target_halite: config.search.target_halite,
            search_radius: config.search.max_radius,
            move_cost_ratio: constants.move_cost_ratio,
            end_game_margin: config.behavior.end_game_margin_turns,
            max_turns: constants.max_turns,
            book_idle_cell: config.behavior.book_idle_cell,
        }
    }

    /// Kamikaze mode: too few turns left to go out and come back again
    pub fn is_end_game(&self, turn: u32) -> bool {
        self.max_turns.saturating_sub(turn) < self.end_game_margin
    }
}

/// Unit id -> status. Entries are created on first sighting and never evicted
#[derive(Debug, Clone, Default)]
pub struct BehaviorTable {
    statuses: BTreeMap<UnitId, UnitStatus>,
}

impl BehaviorTable {
    pub fn new() -> Self {
        BehaviorTable::default()
    }

    /// Restores a table from a dump, e.g. when replaying a logged turn
    pub fn from_entries(entries: impl IntoIterator<Item = (UnitId, UnitStatus)>) -> Self {
        BehaviorTable {
            statuses: entries.into_iter().collect(),
        }
    }

    pub fn entries(&self) -> Vec<(UnitId, UnitStatus)> {
        self.statuses.iter().map(|(&id, &s)| (id, s)).collect()
    }

    pub fn status(&self, id: UnitId) -> Option<UnitStatus> {
        self.statuses.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.statuses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }

    /// Advances `unit`'s state machine and returns the direction it would like to move.
    ///
    /// `deposits` must list the shipyard first, then dropoffs.
    pub fn intend(
        &mut self,
        map: &mut GameMap,
        unit: &Unit,
        deposits: &[Position],
        end_game: bool,
        thresholds: &Thresholds,
    ) -> Direction {
        let status = self.statuses.entry(unit.id).or_insert(UnitStatus::Exploring);
        let at_deposit = deposits.contains(&map.normalize(unit.position));

        match *status {
            UnitStatus::Returning if at_deposit => {
                if end_game {
                    // Nothing more can be delivered; stay parked
                    Direction::Still
                } else {
                    *status = UnitStatus::Exploring;
                    debug!("Unit {} delivered, exploring again", unit.id);
                    explore(map, unit, thresholds)
                }
            }
            UnitStatus::Returning => head_home(map, unit, deposits, thresholds),
            UnitStatus::Exploring => {
                if unit.halite >= thresholds.return_halite || end_game {
                    *status = UnitStatus::Returning;
                    debug!(
                        "Unit {} returning with {} halite (end game: {})",
                        unit.id, unit.halite, end_game
                    );
                    head_home(map, unit, deposits, thresholds)
                } else if map.cell_at(unit.position).halite < thresholds.low_halite {
                    explore(map, unit, thresholds)
                } else {
                    if thresholds.book_idle_cell {
                        map.book(unit.position);
                    }
                    Direction::Still
                }
            }
        }
    }
}

fn explore(map: &mut GameMap, unit: &Unit, thresholds: &Thresholds) -> Direction {
    search::next_resource_direction(
        map,
        unit,
        thresholds.target_halite,
        thresholds.search_radius,
        thresholds.move_cost_ratio,
    )
}

fn head_home(
    map: &GameMap,
    unit: &Unit,
    deposits: &[Position],
    thresholds: &Thresholds,
) -> Direction {
    match planner::nearest_deposit(map, unit.position, deposits) {
        Some(home) => planner::next_direction(map, unit, home, thresholds.move_cost_ratio),
        None => Direction::Still,
    }
}
