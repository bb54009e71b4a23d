// Two-phase move conflict resolution
//
// Turns every unit's intended direction into a committed command such that
// no two of our units end the turn on the same cell.
//
// Phase 1 walks units in snapshot order, one unit at a time as each is
// planned, so later units see earlier commitments in the map. Free targets and STILL commit right
// away, enemy-held targets degrade to STILL, and a target held by one of our
// own units either completes a pairwise swap (when that unit is already
// waiting to move onto us) or defers. Phase 2 makes one pass over the
// deferred units against the updated occupancy; whatever is still blocked
// stays put. There is no third pass.

use log::debug;
use std::collections::HashMap;

use crate::grid::{GameMap, Occupant};
use crate::types::{Command, Direction, PlayerId, Position, Unit, UnitId};

/// What a unit wants to do this turn, before conflicts are settled
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Intention {
    pub unit: Unit,
    pub direction: Direction,
}

/// Result of resolving one turn
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedTurn {
    /// One move per unit, in commit order
    pub commands: Vec<Command>,
    /// Number of pairwise exchanges committed
    pub swaps: usize,
    /// Units whose intended move was replaced by STILL
    pub blocked: usize,
}

impl ResolvedTurn {
    /// Committed direction for `unit`, if any
    pub fn direction_of(&self, unit: UnitId) -> Option<Direction> {
        self.commands.iter().find_map(|c| match c {
            Command::Move(id, dir) if *id == unit => Some(*dir),
            _ => None,
        })
    }
}

enum Verdict {
    Commit(Direction),
    Swap {
        partner: UnitId,
        partner_direction: Direction,
    },
    Defer,
}

/// Incremental resolver for one turn.
///
/// `submit` runs phase 1 for a single unit and updates the map at once, so
/// units planned afterwards see this turn's commitments. `finish` runs
/// phase 2 over whatever was deferred.
pub struct ConflictResolver {
    me: PlayerId,
    positions: HashMap<UnitId, Position>,
    /// Intentions of units that could not commit yet
    queued: HashMap<UnitId, Direction>,
    /// Deferral order, so phase 2 is deterministic
    deferred: Vec<UnitId>,
    planned: HashMap<UnitId, Direction>,
    result: ResolvedTurn,
}

/// Resolves `intentions` (in iteration order) against the occupancy recorded
/// in `map`, updating occupancy to reflect the committed moves.
///
/// `map` must already have every unit marked as the occupant of its cell.
pub fn resolve(map: &mut GameMap, me: PlayerId, intentions: &[Intention]) -> ResolvedTurn {
    let mut resolver = ConflictResolver::new(me);
    for intention in intentions {
        resolver.submit(map, intention);
    }
    resolver.finish(map)
}

impl ConflictResolver {
    pub fn new(me: PlayerId) -> Self {
        ConflictResolver {
            me,
            positions: HashMap::new(),
            queued: HashMap::new(),
            deferred: Vec::new(),
            planned: HashMap::new(),
            result: ResolvedTurn::default(),
        }
    }

    /// Phase 1 for one unit: commit, swap with a waiting partner, or defer
    pub fn submit(&mut self, map: &mut GameMap, intention: &Intention) {
        let id = intention.unit.id;
        if self.planned.contains_key(&id) {
            return;
        }
        self.positions.insert(id, map.normalize(intention.unit.position));

        let verdict = self.evaluate(map, id, intention.direction);
        self.settle(map, id, intention.direction, verdict, false);
    }

    /// Phase 2: one pass over deferred units; anything still blocked stays put
    pub fn finish(mut self, map: &mut GameMap) -> ResolvedTurn {
        let deferred = std::mem::take(&mut self.deferred);

        for id in deferred {
            // Already committed as someone's swap partner
            let direction = match self.queued.remove(&id) {
                Some(direction) => direction,
                None => continue,
            };

            let verdict = self.evaluate(map, id, direction);
            self.settle(map, id, direction, verdict, true);
        }

        self.result
    }

    fn settle(
        &mut self,
        map: &mut GameMap,
        id: UnitId,
        direction: Direction,
        verdict: Verdict,
        last_pass: bool,
    ) {
        match verdict {
            Verdict::Commit(dir) => {
                if dir != direction {
                    self.result.blocked += 1;
                }
                self.commit(map, id, dir);
            }
            Verdict::Swap {
                partner,
                partner_direction,
            } => {
                self.queued.remove(&partner);
                self.commit_swap(map, id, direction, partner, partner_direction);
            }
            Verdict::Defer if last_pass => {
                debug!("Unit {} still blocked, holding position", id);
                self.result.blocked += 1;
                self.commit(map, id, Direction::Still);
            }
            Verdict::Defer => {
                debug!("Unit {} queued {}", id, direction.as_str());
                self.queued.insert(id, direction);
                self.deferred.push(id);
            }
        }
    }

    /// Classifies a move against live occupancy and the pending-intention table
    fn evaluate(&self, map: &GameMap, id: UnitId, direction: Direction) -> Verdict {
        if direction == Direction::Still {
            return Verdict::Commit(Direction::Still);
        }

        let position = match self.positions.get(&id) {
            Some(&position) => position,
            None => return Verdict::Commit(Direction::Still),
        };
        let target = map.step(position, direction);

        let occupant = match map.cell_at(target).occupant {
            None => return Verdict::Commit(direction),
            Some(occupant) => occupant,
        };

        if occupant.owner != self.me {
            debug!("Unit {} blocked by enemy unit {} at {}", id, occupant.unit, target);
            return Verdict::Commit(Direction::Still);
        }
        if occupant.unit == id {
            return Verdict::Commit(Direction::Still);
        }

        let partner = occupant.unit;
        let pending = self.queued.get(&partner).copied();
        let partner_position = self.positions.get(&partner).copied();

        match (pending, partner_position) {
            (Some(partner_direction), Some(partner_position))
                if map.step(partner_position, partner_direction) == position =>
            {
                Verdict::Swap {
                    partner,
                    partner_direction,
                }
            }
            _ => Verdict::Defer,
        }
    }

    fn commit(&mut self, map: &mut GameMap, id: UnitId, direction: Direction) {
        let position = match self.positions.get(&id) {
            Some(&position) => position,
            None => return,
        };
        let occupant = Occupant {
            unit: id,
            owner: self.me,
        };

        if direction == Direction::Still {
            map.mark_occupied(position, occupant);
            debug!("Unit {} committed STILL at {}", id, position);
        } else {
            let target = map.step(position, direction);
            map.mark_occupied(target, occupant);
            map.vacate(position, id);
            debug!("Unit {} committed {} to {}", id, direction.as_str(), target);
        }

        self.planned.insert(id, direction);
        self.result.commands.push(Command::Move(id, direction));
    }

    fn commit_swap(
        &mut self,
        map: &mut GameMap,
        id: UnitId,
        direction: Direction,
        partner: UnitId,
        partner_direction: Direction,
    ) {
        debug!("Units {} and {} swap places", id, partner);
        self.commit(map, id, direction);
        self.commit(map, partner, partner_direction);
        self.result.swaps += 1;
    }
}
