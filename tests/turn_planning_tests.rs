//! Turn Planning Integration Tests
//!
//! Drives `Bot::play_turn` with hand-built snapshots and checks the command
//! set that would be sent to the engine.

use std::collections::HashSet;

use halite_bot::behavior::UnitStatus;
use halite_bot::bot::Bot;
use halite_bot::config::Config;
use halite_bot::error::BotError;
use halite_bot::protocol::format_commands;
use halite_bot::types::{
    Command, Direction, GameConstants, Player, PlayerId, Position, TurnSnapshot, Unit, UnitId,
};

const WIDTH: i32 = 8;
const HEIGHT: i32 = 8;

fn unit(id: u32, x: i32, y: i32, halite: u32) -> Unit {
    Unit {
        id: UnitId(id),
        owner: PlayerId(0),
        position: Position::new(x, y),
        halite,
    }
}

fn player(id: u32, halite: u32, shipyard: (i32, i32), units: Vec<Unit>) -> Player {
    Player {
        id: PlayerId(id),
        halite,
        shipyard: Position::new(shipyard.0, shipyard.1),
        dropoffs: vec![],
        units,
    }
}

/// 8x8 snapshot with uniform halite, us at shipyard (4,4) and an idle enemy at (0,0)
fn snapshot(turn: u32, halite: u32, bank: u32, units: Vec<Unit>) -> TurnSnapshot {
    TurnSnapshot {
        turn,
        my_id: PlayerId(0),
        width: WIDTH,
        height: HEIGHT,
        halite: vec![halite; (WIDTH * HEIGHT) as usize],
        players: vec![
            player(0, bank, (4, 4), units),
            player(1, 0, (0, 0), vec![]),
        ],
    }
}

fn set_halite(snapshot: &mut TurnSnapshot, x: i32, y: i32, amount: u32) {
    snapshot.halite[(y * WIDTH + x) as usize] = amount;
}

fn bot() -> Bot {
    Bot::new(Config::default_hardcoded(), GameConstants::default())
}

fn move_of(commands: &[Command], id: u32) -> Option<Direction> {
    commands.iter().find_map(|c| match c {
        Command::Move(unit, dir) if unit.0 == id => Some(*dir),
        _ => None,
    })
}

#[test]
fn test_one_command_per_unit() {
    let units = vec![
        unit(0, 4, 4, 0),
        unit(1, 4, 5, 0),
        unit(2, 5, 4, 950),
        unit(3, 1, 6, 20),
        unit(4, 7, 7, 500),
    ];
    let mut snap = snapshot(10, 30, 0, units.clone());
    set_halite(&mut snap, 2, 2, 400);
    set_halite(&mut snap, 6, 1, 300);

    let mut bot = bot();
    let plan = bot.play_turn(&snap).expect("turn should plan");

    let ids: Vec<UnitId> = plan
        .commands
        .iter()
        .filter_map(|c| match c {
            Command::Move(id, _) => Some(*id),
            Command::Spawn => None,
        })
        .collect();
    let unique: HashSet<UnitId> = ids.iter().copied().collect();

    assert_eq!(ids.len(), units.len(), "Every unit gets exactly one move");
    assert_eq!(unique.len(), units.len(), "No unit gets two moves");
    assert!(!plan.spawned, "Empty bank cannot pay for a ship");
    assert_eq!(bot.statuses().len(), units.len());
}

#[test]
fn test_full_unit_turns_home_on_the_same_turn() {
    // Shipyard is two cells north of the unit
    let mut bot = bot();
    let plan = bot
        .play_turn(&snapshot(10, 100, 0, vec![unit(7, 4, 6, 950)]))
        .expect("turn should plan");

    assert_eq!(move_of(&plan.commands, 7), Some(Direction::North));
    assert_eq!(
        bot.statuses(),
        vec![(UnitId(7), UnitStatus::Returning)],
        "Crossing the return threshold switches status immediately"
    );
}

#[test]
fn test_returning_unit_explores_again_after_delivery() {
    let mut bot = bot();
    bot.play_turn(&snapshot(10, 100, 0, vec![unit(7, 4, 5, 950)]))
        .expect("turn should plan");
    assert_eq!(bot.statuses(), vec![(UnitId(7), UnitStatus::Returning)]);

    // Delivered: standing on the shipyard with an empty hold
    let mut snap = snapshot(11, 0, 950, vec![unit(7, 4, 4, 0)]);
    set_halite(&mut snap, 4, 2, 300);
    let plan = bot.play_turn(&snap).expect("turn should plan");

    assert_eq!(bot.statuses(), vec![(UnitId(7), UnitStatus::Exploring)]);
    assert_eq!(move_of(&plan.commands, 7), Some(Direction::North));
}

#[test]
fn test_end_game_sends_everyone_home() {
    // 400 turns, margin 30: turn 380 leaves 20
    let mut bot = bot();
    let plan = bot
        .play_turn(&snapshot(380, 0, 0, vec![unit(3, 4, 6, 0), unit(4, 4, 4, 0)]))
        .expect("turn should plan");

    assert_eq!(move_of(&plan.commands, 3), Some(Direction::North));
    assert_eq!(
        move_of(&plan.commands, 4),
        Some(Direction::Still),
        "A unit already home stays parked"
    );
    assert!(bot
        .statuses()
        .iter()
        .all(|(_, s)| *s == UnitStatus::Returning));
}

#[test]
fn test_follower_steps_into_cell_vacated_this_turn() {
    // Both full and heading for the shipyard at (6,2); unit 0 leads, unit 1 follows
    let snap = TurnSnapshot {
        turn: 10,
        my_id: PlayerId(0),
        width: 10,
        height: 10,
        halite: vec![0; 100],
        players: vec![
            player(0, 0, (6, 2), vec![unit(0, 4, 2, 950), unit(1, 3, 2, 950)]),
            player(1, 0, (0, 8), vec![]),
        ],
    };

    let mut bot = bot();
    let plan = bot.play_turn(&snap).expect("turn should plan");

    assert_eq!(
        plan.commands,
        vec![
            Command::Move(UnitId(0), Direction::East),
            Command::Move(UnitId(1), Direction::East)
        ],
        "The follower should take the cell its leader just left"
    );
}

#[test]
fn test_explorer_mines_in_place_on_rich_cell() {
    let mut bot = bot();
    let plan = bot
        .play_turn(&snapshot(10, 200, 0, vec![unit(1, 2, 2, 0)]))
        .expect("turn should plan");

    assert_eq!(move_of(&plan.commands, 1), Some(Direction::Still));
    assert_eq!(bot.statuses(), vec![(UnitId(1), UnitStatus::Exploring)]);
}

#[test]
fn test_explorers_head_for_different_cells() {
    // Two units side by side on empty cells, one rich cell to the east of both
    let mut snap = snapshot(10, 0, 0, vec![unit(1, 1, 1, 0), unit(2, 1, 2, 0)]);
    set_halite(&mut snap, 2, 1, 500);
    set_halite(&mut snap, 2, 2, 500);

    let mut bot = bot();
    let plan = bot.play_turn(&snap).expect("turn should plan");

    assert_eq!(move_of(&plan.commands, 1), Some(Direction::East));
    assert_eq!(move_of(&plan.commands, 2), Some(Direction::East));
}

#[test]
fn test_zero_budget_leaves_everyone_still() {
    let mut config = Config::default_hardcoded();
    config.timing.turn_time_budget_ms = 0;
    config.timing.io_overhead_ms = 0;
    let mut bot = Bot::new(config, GameConstants::default());

    let units = vec![unit(0, 4, 6, 950), unit(1, 1, 1, 0), unit(2, 6, 6, 0)];
    let plan = bot
        .play_turn(&snapshot(10, 0, 0, units.clone()))
        .expect("turn should plan");

    assert_eq!(plan.skipped, units.len());
    for u in &units {
        assert_eq!(move_of(&plan.commands, u.id.0), Some(Direction::Still));
    }
}

#[test]
fn test_spawns_when_shipyard_is_clear() {
    let mut bot = bot();
    let plan = bot
        .play_turn(&snapshot(1, 0, 5000, vec![]))
        .expect("turn should plan");

    assert!(plan.spawned);
    assert_eq!(plan.commands, vec![Command::Spawn]);
    assert_eq!(format_commands(&plan.commands), "g");
}

#[test]
fn test_no_spawn_when_unit_stays_on_shipyard() {
    // Rich shipyard cell: the unit mines in place and blocks the spawn
    let mut bot = bot();
    let plan = bot
        .play_turn(&snapshot(1, 200, 5000, vec![unit(0, 4, 4, 0)]))
        .expect("turn should plan");

    assert!(!plan.spawned);
    assert_eq!(format_commands(&plan.commands), "m 0 o");
}

#[test]
fn test_no_spawn_after_last_spawn_turn() {
    let mut bot = bot();
    let plan = bot
        .play_turn(&snapshot(201, 0, 5000, vec![]))
        .expect("turn should plan");

    assert!(!plan.spawned);
    assert!(plan.commands.is_empty());
}

#[test]
fn test_missing_player_is_an_error() {
    let mut snap = snapshot(1, 0, 0, vec![]);
    snap.my_id = PlayerId(7);

    let mut bot = bot();
    match bot.play_turn(&snap) {
        Err(BotError::MissingPlayer(id)) => assert_eq!(id, PlayerId(7)),
        other => panic!("expected MissingPlayer, got {:?}", other),
    }
}
