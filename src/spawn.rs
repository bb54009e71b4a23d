// Ship production decision
//
// Runs after conflict resolution so it sees where our units will be at the
// end of the turn.

use crate::config::SpawnConfig;
use crate::grid::GameMap;
use crate::types::{GameConstants, Player};

/// Decides whether `me` should build a ship this turn
pub fn should_spawn(
    map: &GameMap,
    me: &Player,
    turn: u32,
    num_players: usize,
    constants: &GameConstants,
    config: &SpawnConfig,
) -> bool {
    if turn > config.last_spawn_turn {
        return false;
    }
    if me.halite < constants.ship_cost {
        return false;
    }
    if me.units.len() >= config.max_units(num_players) {
        return false;
    }

    // A new ship would collide with one of ours, or have nowhere to go
    map.is_spawn_cell_free(me.shipyard, me.id) && !map.is_surrounded(me.shipyard)
}
