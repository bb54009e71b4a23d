// Single-step greedy navigation
//
// Only ever picks the next step, never a full path. Re-planned every turn.

use log::debug;

use crate::grid::GameMap;
use crate::types::{Direction, Position, Unit};

/// Halite burned to leave a cell: ceil(halite / ratio). A ratio of zero means moves are free
pub fn move_cost(cell_halite: u32, move_cost_ratio: u32) -> u32 {
    if move_cost_ratio == 0 {
        return 0;
    }
    cell_halite.div_ceil(move_cost_ratio)
}

/// Returns the cardinal step that gets `unit` strictly closer to `destination`,
/// or `Still` when no free neighbor improves on twice the current distance or
/// the unit cannot pay to leave its cell.
///
/// Neighbors are tried in cardinal order and only a strictly better distance
/// replaces the running best, so ties go to the earlier direction.
pub fn next_direction(
    map: &GameMap,
    unit: &Unit,
    destination: Position,
    move_cost_ratio: u32,
) -> Direction {
    let mut best_distance = map.distance(unit.position, destination) * 2;
    let mut best_direction = Direction::Still;

    for dir in Direction::cardinals() {
        let candidate = map.step(unit.position, dir);
        if map.is_occupied(candidate) {
            continue;
        }

        let distance = map.distance(candidate, destination);
        if distance < best_distance {
            best_distance = distance;
            best_direction = dir;
        }
    }

    if best_direction == Direction::Still {
        return Direction::Still;
    }

    let cost = move_cost(map.cell_at(unit.position).halite, move_cost_ratio);
    if cost == 0 || unit.halite > cost {
        best_direction
    } else {
        debug!(
            "Unit {} cannot afford to leave {} (cost {}, carrying {})",
            unit.id, unit.position, cost, unit.halite
        );
        Direction::Still
    }
}

/// Closest deposit point to `from`. Earlier entries win ties, so pass the shipyard first
pub fn nearest_deposit(map: &GameMap, from: Position, deposits: &[Position]) -> Option<Position> {
    deposits
        .iter()
        .copied()
        .min_by_key(|&p| map.distance(from, p))
}
