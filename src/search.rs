// Bounded breadth-first search for halite
//
// Nearest qualifying cell wins, not the richest one within reach. Ties are
// settled by the cardinal order neighbors are expanded in.

use log::debug;
use std::collections::VecDeque;

use crate::grid::GameMap;
use crate::planner;
use crate::types::{Direction, Position, Unit};

/// Outcome of a resource search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchTarget {
    /// Nearest unbooked cell with at least the threshold
    Qualifying(Position),
    /// Nothing met the threshold; richest unbooked cell seen instead
    Fallback(Position),
}

impl SearchTarget {
    pub fn position(&self) -> Position {
        match self {
            SearchTarget::Qualifying(p) | SearchTarget::Fallback(p) => *p,
        }
    }
}

/// Breadth-first expansion from `start` over the toroidal 4-neighborhood.
///
/// Booked cells are still expanded through but never chosen. Cells further
/// than `max_radius` from `start` are ignored. The start cell is never a
/// candidate. Returns `None` when no unbooked cell with any halite is
/// reachable.
pub fn find_target(
    map: &GameMap,
    start: Position,
    threshold: u32,
    max_radius: u32,
) -> Option<SearchTarget> {
    let start = map.normalize(start);

    let mut visited = vec![false; map.cell_count()];
    let mut frontier = VecDeque::new();
    visited[map.index_of(start)] = true;
    frontier.push_back(start);

    let mut fallback: Option<(Position, u32)> = None;

    while let Some(current) = frontier.pop_front() {
        for neighbor in map.neighbors(current) {
            let idx = map.index_of(neighbor);
            if visited[idx] {
                continue;
            }
            visited[idx] = true;

            if map.distance(start, neighbor) > max_radius {
                continue;
            }
            frontier.push_back(neighbor);

            let cell = map.cell_at(neighbor);
            if cell.booked {
                continue;
            }

            if cell.halite >= threshold {
                return Some(SearchTarget::Qualifying(neighbor));
            }

            let richer = match fallback {
                Some((_, best)) => cell.halite > best,
                None => cell.halite > 0,
            };
            if richer {
                fallback = Some((neighbor, cell.halite));
            }
        }
    }

    fallback.map(|(p, _)| SearchTarget::Fallback(p))
}

/// Picks a halite target for `unit`, books it so later units this turn look
/// elsewhere, and returns the first step towards it
pub fn next_resource_direction(
    map: &mut GameMap,
    unit: &Unit,
    threshold: u32,
    max_radius: u32,
    move_cost_ratio: u32,
) -> Direction {
    let target = match find_target(map, unit.position, threshold, max_radius) {
        Some(target) => target,
        None => {
            debug!("Unit {} found no halite within {} cells", unit.id, max_radius);
            return Direction::Still;
        }
    };

    let position = target.position();
    map.book(position);
    debug!("Unit {} booked {:?}", unit.id, target);

    planner::next_direction(map, unit, position, move_cost_ratio)
}
