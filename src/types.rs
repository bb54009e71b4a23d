// Halite III game types
// Mirrors what the engine sends each turn plus the commands we send back

use serde::{Deserialize, Serialize};
use std::fmt;

/// Player identifier assigned by the engine
#[derive(Deserialize, Serialize, Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash)]
#[serde(transparent)]
pub struct PlayerId(pub u32);

/// Unit (ship) identifier assigned by the engine, unique for the whole game
#[derive(Deserialize, Serialize, Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash)]
#[serde(transparent)]
pub struct UnitId(pub u32);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 2D coordinate on the map. Not normalized on its own; see `GameMap::normalize`
#[derive(Deserialize, Serialize, Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Position { x, y }
    }

    /// Raw neighbor in the given direction, possibly off the map
    pub fn offset(&self, dir: Direction) -> Position {
        let (dx, dy) = dir.delta();
        Position {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

/// Movement commands. Declaration order is the enumeration order used for
/// tie-breaking everywhere, so do not reorder
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    South,
    East,
    West,
    Still,
}

impl Direction {
    /// The four moving directions in enumeration order
    pub fn cardinals() -> [Direction; 4] {
        [
            Direction::North,
            Direction::South,
            Direction::East,
            Direction::West,
        ]
    }

    /// (dx, dy) step. North is towards y = 0
    pub fn delta(&self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::South => (0, 1),
            Direction::East => (1, 0),
            Direction::West => (-1, 0),
            Direction::Still => (0, 0),
        }
    }

    /// Wire character used by the engine protocol
    pub fn as_char(&self) -> char {
        match self {
            Direction::North => 'n',
            Direction::South => 's',
            Direction::East => 'e',
            Direction::West => 'w',
            Direction::Still => 'o',
        }
    }

    pub fn from_char(c: char) -> Option<Direction> {
        match c {
            'n' => Some(Direction::North),
            's' => Some(Direction::South),
            'e' => Some(Direction::East),
            'w' => Some(Direction::West),
            'o' => Some(Direction::Still),
            _ => None,
        }
    }

    /// Human readable name for logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::North => "NORTH",
            Direction::South => "SOUTH",
            Direction::East => "EAST",
            Direction::West => "WEST",
            Direction::Still => "STILL",
        }
    }
}

/// A ship as seen in the current turn's snapshot
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Unit {
    pub id: UnitId,
    pub owner: PlayerId,
    pub position: Position,
    pub halite: u32,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Dropoff {
    pub id: u32,
    pub position: Position,
}

/// Player state including bank, structures and ships
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub id: PlayerId,
    pub halite: u32,
    pub shipyard: Position,
    pub dropoffs: Vec<Dropoff>,
    /// Ships in the order the engine reported them; planning iterates in this order
    pub units: Vec<Unit>,
}

impl Player {
    /// Shipyard first, then dropoffs in engine order
    pub fn deposit_positions(&self) -> Vec<Position> {
        std::iter::once(self.shipyard)
            .chain(self.dropoffs.iter().map(|d| d.position))
            .collect()
    }
}

/// A single command sent back to the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Move(UnitId, Direction),
    Spawn,
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Move(id, dir) => write!(f, "m {} {}", id, dir.as_char()),
            Command::Spawn => write!(f, "g"),
        }
    }
}

/// Game constants from the first line of the engine handshake.
/// Only the fields the bot uses are kept; the rest of the JSON is ignored
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct GameConstants {
    #[serde(rename = "MAX_HALITE", default = "default_max_halite")]
    pub max_halite: u32,
    #[serde(rename = "NEW_ENTITY_ENERGY_COST", default = "default_ship_cost")]
    pub ship_cost: u32,
    #[serde(rename = "MAX_TURNS", default = "default_max_turns")]
    pub max_turns: u32,
    #[serde(rename = "MOVE_COST_RATIO", default = "default_move_cost_ratio")]
    pub move_cost_ratio: u32,
}

fn default_max_halite() -> u32 {
    1000
}

fn default_ship_cost() -> u32 {
    1000
}

fn default_max_turns() -> u32 {
    400
}

fn default_move_cost_ratio() -> u32 {
    10
}

impl Default for GameConstants {
    fn default() -> Self {
        GameConstants {
            max_halite: default_max_halite(),
            ship_cost: default_ship_cost(),
            max_turns: default_max_turns(),
            move_cost_ratio: default_move_cost_ratio(),
        }
    }
}

/// Complete state for one turn, as assembled by the protocol layer
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct TurnSnapshot {
    pub turn: u32,
    pub my_id: PlayerId,
    pub width: i32,
    pub height: i32,
    /// Row-major halite per cell, `width * height` entries
    pub halite: Vec<u32>,
    pub players: Vec<Player>,
}

impl TurnSnapshot {
    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn me(&self) -> Option<&Player> {
        self.player(self.my_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cardinal_order_is_fixed() {
        assert_eq!(
            Direction::cardinals(),
            [Direction::North, Direction::South, Direction::East, Direction::West]
        );
    }

    #[test]
    fn test_direction_char_round_trip() {
        for dir in [
            Direction::North,
            Direction::South,
            Direction::East,
            Direction::West,
            Direction::Still,
        ] {
            assert_eq!(Direction::from_char(dir.as_char()), Some(dir));
        }
        assert_eq!(Direction::from_char('x'), None);
    }

    #[test]
    fn test_command_wire_format() {
        assert_eq!(Command::Move(UnitId(7), Direction::East).to_string(), "m 7 e");
        assert_eq!(Command::Move(UnitId(0), Direction::Still).to_string(), "m 0 o");
        assert_eq!(Command::Spawn.to_string(), "g");
    }

    #[test]
    fn test_constants_parse_ignores_unknown_fields() {
        let json = r#"{"MAX_HALITE":1000,"NEW_ENTITY_ENERGY_COST":1000,"MAX_TURNS":425,"MOVE_COST_RATIO":10,"EXTRACT_RATIO":4}"#;
        let constants: GameConstants = serde_json::from_str(json).unwrap();
        assert_eq!(constants.max_turns, 425);
        assert_eq!(constants.move_cost_ratio, 10);
    }

    #[test]
    fn test_constants_default_missing_fields() {
        let constants: GameConstants = serde_json::from_str("{}").unwrap();
        assert_eq!(constants, GameConstants::default());
    }

    #[test]
    fn test_deposit_positions_shipyard_first() {
        let player = Player {
            id: PlayerId(0),
            halite: 0,
            shipyard: Position::new(4, 4),
            dropoffs: vec![Dropoff { id: 3, position: Position::new(10, 2) }],
            units: vec![],
        };
        assert_eq!(
            player.deposit_positions(),
            vec![Position::new(4, 4), Position::new(10, 2)]
        );
    }
}
