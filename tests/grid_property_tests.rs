//! Toroidal Grid Property Tests
//!
//! Normalization and wrap-around distance must hold for any coordinates,
//! not just the ones the planner happens to produce.

use halite_bot::grid::GameMap;
use halite_bot::types::{Direction, Position};
use proptest::prelude::*;

fn arb_map() -> impl Strategy<Value = GameMap> {
    (1i32..48, 1i32..48).prop_map(|(w, h)| GameMap::new(w, h, &[]))
}

fn arb_position() -> impl Strategy<Value = Position> {
    (-500i32..500, -500i32..500).prop_map(|(x, y)| Position::new(x, y))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_normalize_in_range_and_idempotent(map in arb_map(), p in arb_position()) {
        let n = map.normalize(p);
        prop_assert!(n.x >= 0 && n.x < map.width);
        prop_assert!(n.y >= 0 && n.y < map.height);
        prop_assert_eq!(map.normalize(n), n);
    }

    #[test]
    fn prop_distance_is_a_metric(
        map in arb_map(),
        a in arb_position(),
        b in arb_position(),
        c in arb_position(),
    ) {
        prop_assert_eq!(map.distance(a, a), 0);
        prop_assert_eq!(map.distance(a, b), map.distance(b, a));
        prop_assert!(map.distance(a, c) <= map.distance(a, b) + map.distance(b, c));
        prop_assert!(map.distance(a, b) <= (map.width / 2 + map.height / 2) as u32);
    }

    #[test]
    fn prop_distance_ignores_wrapping(map in arb_map(), a in arb_position(), b in arb_position()) {
        prop_assert_eq!(map.distance(a, b), map.distance(map.normalize(a), map.normalize(b)));
    }

    #[test]
    fn prop_cardinal_step_is_one_move_away(map in arb_map(), p in arb_position()) {
        for dir in Direction::cardinals() {
            let next = map.step(p, dir);
            prop_assert_eq!(map.normalize(next), next);
            // A single-row or single-column map folds a step back onto itself
            prop_assert!(map.distance(p, next) <= 1);
        }
        prop_assert_eq!(map.step(p, Direction::Still), map.normalize(p));
    }
}

#[test]
fn test_distance_wraps_across_edge() {
    let map = GameMap::new(5, 5, &[]);
    assert_eq!(map.distance(Position::new(0, 0), Position::new(4, 0)), 1);
    assert_eq!(map.distance(Position::new(0, 0), Position::new(4, 4)), 2);
    assert_eq!(map.distance(Position::new(0, 0), Position::new(2, 2)), 4);
}

#[test]
fn test_normalize_negative_coordinates() {
    let map = GameMap::new(8, 6, &[]);
    assert_eq!(map.normalize(Position::new(-1, -1)), Position::new(7, 5));
    assert_eq!(map.normalize(Position::new(-9, 13)), Position::new(7, 1));
    assert_eq!(map.normalize(Position::new(16, 6)), Position::new(0, 0));
}
