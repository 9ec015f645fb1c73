//! End-to-end turn scenarios for fireline_core.
//!
//! Each test builds a small map, plays one or more turns through the
//! public `Simulation` API and checks the resulting grid.

use fireline_core::prelude::*;
use fireline_test_utils::fixtures::{fixed, grid_from_ascii, tile, MatchBuilder};

// =============================================================================
// Movement and Range
// =============================================================================

mod movement {
    use super::*;
    use fireline_core::pathfinding::{reachable_tiles, shortest_path};

    /// Three-by-three grass with a range-2 unit in the middle reaches every
    /// other tile: six neighbors at 1, the two far corners of row parity at 2.
    #[test]
    fn test_reachable_from_center_of_three_by_three() {
        let grid = grid_from_ascii(&["...", "...", "..."]);
        let caps = UnitCapabilities::digger();
        let reach = reachable_tiles(&grid, tile(1, 1), fixed(2), &caps);

        let ones: Vec<_> = reach.iter().filter(|n| n.dist == fixed(1)).map(|n| n.tile).collect();
        let twos: Vec<_> = reach.iter().filter(|n| n.dist == fixed(2)).map(|n| n.tile).collect();
        assert_eq!(ones.len(), 6);
        assert_eq!(twos, vec![tile(0, 0), tile(0, 2)]);
        assert!(reach.iter().all(|n| n.tile != tile(1, 1)));
    }

    #[test]
    fn test_water_blocks_route() {
        let grid = grid_from_ascii(&[".W.", "WW.", "..."]);
        let caps = UnitCapabilities::digger();
        assert!(shortest_path(&grid, tile(0, 0), tile(2, 2), &caps).is_none());
    }

    #[test]
    fn test_unit_reachable_query_uses_remaining_budget() {
        let mut sim = MatchBuilder::new(&["C....", ".....", "....."])
            .camp(tile(0, 0))
            .fire(tile(4, 2))
            .spread_chance(0.0)
            .money(100)
            .start();
        let id = sim.purchase_unit(tile(0, 0), UnitKind::Digger).unwrap();

        let reach = sim.reachable_tiles(id).unwrap();
        assert!(reach.iter().all(|n| n.dist <= fixed(4)));
        assert!(reach.iter().any(|n| n.tile == tile(4, 0)));
    }
}

// =============================================================================
// Command Execution
// =============================================================================

mod execution {
    use super::*;
    use fireline_core::compiler;
    use fireline_core::execution::execute;

    #[test]
    fn test_move_then_dig_into_fire_kills_unit() {
        let mut sim = MatchBuilder::new(&["C.....", "......", "......"])
            .camp(tile(0, 0))
            .fire(tile(5, 2))
            .spread_chance(0.0)
            .money(100)
            .start();
        let id = sim.purchase_unit(tile(0, 0), UnitKind::Digger).unwrap();
        sim.submit_command(id, Command::move_to(tile(1, 0))).unwrap();
        sim.submit_command(id, Command::dig(tile(2, 0))).unwrap();
        let steps_before = sim.grid().unit(id).unwrap().steps.clone();

        // Fire reaches the dig site between planning and execution.
        let rules = sim.rules().clone();
        let mut grid = sim.grid().clone();
        grid.ignite(tile(2, 0), 4).unwrap();
        compiler::recompile(&mut grid, id, &rules).unwrap();
        assert_eq!(grid.unit(id).unwrap().steps, steps_before);

        let report = execute(&mut grid, id, &rules).unwrap();
        assert_eq!(report.outcome, ExecutionOutcome::Killed);
        assert_eq!(report.final_tile, tile(1, 0));
        assert!(grid.unit(id).is_err());
        assert_eq!(
            grid.tile(tile(2, 0)).unwrap().tile_type,
            TileType::Grassland,
            "dig must not run after the unit died"
        );
    }

    #[test]
    fn test_digger_cuts_fireline_across_turns() {
        let mut sim = MatchBuilder::new(&["C.......", "........", "........"])
            .camp(tile(0, 0))
            .fire(tile(7, 2))
            .spread_chance(0.0)
            .money(100)
            .start();
        let id = sim.purchase_unit(tile(0, 0), UnitKind::Digger).unwrap();
        for i in 2..=4 {
            sim.submit_command(id, Command::dig(tile(i, 0))).unwrap();
        }

        // Turn 1: walk 2, dig, walk 1 (budget 4).
        sim.resolve_turn().unwrap();
        assert_eq!(sim.grid().tile(tile(2, 0)).unwrap().tile_type, TileType::Fireline);
        assert_eq!(sim.grid().unit(id).unwrap().tile, tile(3, 0));

        // Turn 2: dig, walk 1, dig.
        sim.resolve_turn().unwrap();
        for i in 2..=4 {
            assert_eq!(sim.grid().tile(tile(i, 0)).unwrap().tile_type, TileType::Fireline);
        }
        assert!(sim.grid().unit(id).unwrap().commands.is_empty());
    }

    #[test]
    fn test_truck_extinguishes_fire() {
        let mut sim = MatchBuilder::new(&["C...", "....", "...."])
            .camp(tile(0, 0))
            .fire(tile(2, 0))
            .spread_chance(0.0)
            .money(250)
            .start();
        let id = sim.purchase_unit(tile(0, 0), UnitKind::Truck).unwrap();
        sim.submit_command(id, Command::extinguish(tile(2, 0))).unwrap();

        sim.resolve_turn().unwrap();
        assert_eq!(sim.phase(), TurnPhase::GameOver);
        assert_eq!(sim.grid().tile(tile(2, 0)).unwrap().tile_type, TileType::Burnt);
        assert_eq!(sim.grid().unit(id).unwrap().tile, tile(2, 0));

        let stats = sim.final_stats().unwrap();
        assert_eq!(stats.turns, 1);
        assert_eq!(stats.casualties, 0);
        assert_eq!(stats.money_spent, 250);
    }
}

// =============================================================================
// Fire
// =============================================================================

mod fire {
    use super::*;

    #[test]
    fn test_firebreak_truck_shields_its_tile() {
        let mut sim = MatchBuilder::new(&["C..", "...", "..."])
            .camp(tile(0, 0))
            .fire(tile(1, 0))
            .spread_chance(1.0)
            .money(250)
            .start();
        let truck = sim.purchase_unit(tile(0, 0), UnitKind::Truck).unwrap();

        sim.resolve_turn().unwrap();
        assert!(sim.grid().unit(truck).is_ok());
        assert!(!sim.grid().is_burning(tile(0, 0)));
    }

    #[test]
    fn test_certain_spread_leaves_water_and_firelines() {
        let mut sim = MatchBuilder::new(&["W#.", "B..", "..."])
            .fire(tile(1, 1))
            .spread_chance(1.0)
            .start();
        sim.resolve_turn().unwrap();

        let grid = sim.grid();
        assert!(!grid.is_burning(tile(0, 0)));
        assert!(!grid.is_burning(tile(1, 0)));
        assert!(!grid.is_burning(tile(0, 1)));
        for t in [tile(2, 0), tile(2, 1), tile(1, 2), tile(2, 2)] {
            assert!(grid.is_burning(t), "tile {t} should burn");
        }
    }

    #[test]
    fn test_burning_camp_is_destroyed() {
        let mut sim = MatchBuilder::new(&["CC", ".."])
            .camp(tile(1, 0))
            .fire(tile(0, 0))
            .spread_chance(1.0)
            .start();
        sim.resolve_turn().unwrap();
        assert!(sim.grid().camps().is_empty());
        let events = sim.drain_events();
        assert!(events.contains(&GameEvent::CampDestroyed { tile: tile(1, 0) }));
    }
}

// =============================================================================
// Economy and Game Over
// =============================================================================

mod economy {
    use super::*;

    #[test]
    fn test_income_accumulates_each_turn() {
        let mut sim = MatchBuilder::new(&["CCF", "..W"])
            .fire(tile(2, 0))
            .spread_chance(0.0)
            .start();
        // Burning forest and water yield nothing.
        let per_turn = 3 + 3 + 1 + 1;
        assert_eq!(sim.treasury().income_preview, per_turn);

        sim.resolve_turn().unwrap();
        sim.resolve_turn().unwrap();
        assert_eq!(sim.treasury().balance, 2 * per_turn);
    }

    #[test]
    fn test_final_stats_scale_counters() {
        let mut sim = MatchBuilder::new(&["CF.", "..."])
            .camp(tile(0, 0))
            .fire(tile(1, 0))
            .spread_chance(0.0)
            .money(100)
            .start();
        let id = sim.purchase_unit(tile(0, 0), UnitKind::Digger).unwrap();
        sim.submit_command(id, Command::dig(tile(0, 0))).unwrap();

        while sim.phase() != TurnPhase::GameOver {
            sim.resolve_turn().unwrap();
        }

        let stats = sim.final_stats().unwrap();
        assert_eq!(stats.turns, 4);
        assert_eq!(stats.homes_destroyed, 25);
        assert_eq!(stats.forest_acres_burnt, 40);
        assert_eq!(stats.homes_burnt, 0);
        assert_eq!(stats.money_spent, 100);
    }
}
