// Toroidal game map and per-cell turn state
//
// Every other module reaches grid storage through `cell_at` / `cell_at_mut`,
// which normalize first, so off-map positions cannot be indexed.

use crate::types::{Direction, PlayerId, Position, TurnSnapshot, UnitId};

/// The unit currently standing on (or committed to) a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occupant {
    pub unit: UnitId,
    pub owner: PlayerId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructureKind {
    Shipyard,
    Dropoff,
}

/// Permanent structure on a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Structure {
    pub owner: PlayerId,
    pub kind: StructureKind,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cell {
    pub halite: u32,
    /// Cleared every turn, then rebuilt from the snapshot and this turn's commitments
    pub occupant: Option<Occupant>,
    /// Turn-scoped claim by a resource search so two units never chase the same cell
    pub booked: bool,
    pub structure: Option<Structure>,
}

impl Cell {
    pub fn is_occupied(&self) -> bool {
        self.occupant.is_some()
    }

    pub fn has_structure(&self) -> bool {
        self.structure.is_some()
    }
}

/// Wrap-around grid. Cells are stored row-major
#[derive(Debug, Clone)]
pub struct GameMap {
    pub width: i32,
    pub height: i32,
    cells: Vec<Cell>,
}

impl GameMap {
    /// Creates a map with the given halite and no occupancy, bookings or structures.
    /// Missing halite entries are treated as empty cells
    pub fn new(width: i32, height: i32, halite: &[u32]) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        let cells = (0..(width * height) as usize)
            .map(|i| Cell {
                halite: halite.get(i).copied().unwrap_or(0),
                ..Cell::default()
            })
            .collect();

        GameMap {
            width,
            height,
            cells,
        }
    }

    /// Builds this turn's map: halite from the snapshot, every unit marked as
    /// the occupant of its cell and every shipyard/dropoff as a structure
    pub fn from_snapshot(snapshot: &TurnSnapshot) -> Self {
        let mut map = GameMap::new(snapshot.width, snapshot.height, &snapshot.halite);

        for player in &snapshot.players {
            for unit in &player.units {
                map.mark_occupied(
                    unit.position,
                    Occupant {
                        unit: unit.id,
                        owner: unit.owner,
                    },
                );
            }

            map.cell_at_mut(player.shipyard).structure = Some(Structure {
                owner: player.id,
                kind: StructureKind::Shipyard,
            });
            for dropoff in &player.dropoffs {
                map.cell_at_mut(dropoff.position).structure = Some(Structure {
                    owner: player.id,
                    kind: StructureKind::Dropoff,
                });
            }
        }

        map
    }

    /// Maps any coordinate into `[0, width) x [0, height)`
    pub fn normalize(&self, position: Position) -> Position {
        Position {
            x: position.x.rem_euclid(self.width),
            y: position.y.rem_euclid(self.height),
        }
    }

    /// Toroidal Manhattan distance
    pub fn distance(&self, a: Position, b: Position) -> u32 {
        let a = self.normalize(a);
        let b = self.normalize(b);

        let dx = (a.x - b.x).abs();
        let dy = (a.y - b.y).abs();

        let toroidal_dx = dx.min(self.width - dx);
        let toroidal_dy = dy.min(self.height - dy);

        (toroidal_dx + toroidal_dy) as u32
    }

    /// Row-major index of the normalized position
    pub fn index_of(&self, position: Position) -> usize {
        let p = self.normalize(position);
        (p.y * self.width + p.x) as usize
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn cell_at(&self, position: Position) -> &Cell {
        &self.cells[self.index_of(position)]
    }

    pub fn cell_at_mut(&mut self, position: Position) -> &mut Cell {
        let idx = self.index_of(position);
        &mut self.cells[idx]
    }

    /// Normalized position one step away
    pub fn step(&self, position: Position, dir: Direction) -> Position {
        self.normalize(position.offset(dir))
    }

    /// Normalized 4-neighborhood in cardinal enumeration order
    pub fn neighbors(&self, position: Position) -> [Position; 4] {
        Direction::cardinals().map(|dir| self.step(position, dir))
    }

    pub fn is_occupied(&self, position: Position) -> bool {
        self.cell_at(position).is_occupied()
    }

    pub fn mark_occupied(&mut self, position: Position, occupant: Occupant) {
        self.cell_at_mut(position).occupant = Some(occupant);
    }

    /// Clears occupancy only if `unit` is still the recorded occupant
    pub fn vacate(&mut self, position: Position, unit: UnitId) {
        let cell = self.cell_at_mut(position);
        if cell.occupant.map(|o| o.unit) == Some(unit) {
            cell.occupant = None;
        }
    }

    pub fn book(&mut self, position: Position) {
        self.cell_at_mut(position).booked = true;
    }

    /// True unless one of `me`'s units holds the cell. Enemy units do not
    /// count: spawning onto them is allowed by the engine
    pub fn is_spawn_cell_free(&self, position: Position, me: PlayerId) -> bool {
        match self.cell_at(position).occupant {
            Some(occupant) => occupant.owner != me,
            None => true,
        }
    }

    /// All four neighbors occupied
    pub fn is_surrounded(&self, position: Position) -> bool {
        self.neighbors(position)
            .iter()
            .all(|&p| self.is_occupied(p))
    }
}
