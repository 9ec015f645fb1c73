//! Weighted pathfinding over the hex grid.
//!
//! Edge weight from tile A to tile B is the cost of entering B for the
//! moving unit kind ([`Grid::move_weight`]); impassable tiles have no
//! incoming edges. All distances are fixed-point for deterministic
//! results across platforms.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::grid::{Grid, TileCoord};
use crate::index_pq::IndexMinPq;
use crate::math::{fixed_serde, Fixed};
use crate::unit_kind::UnitCapabilities;

/// A tile on a path together with its distance from the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PathNode {
    /// Tile coordinates.
    pub tile: TileCoord,
    /// Cumulative distance from the source tile.
    #[serde(with = "fixed_serde")]
    pub dist: Fixed,
}

/// Find the cheapest path from `src` to `dst` using Dijkstra's algorithm.
///
/// The returned nodes are in travel order, exclude `src` and end at `dst`;
/// each carries the cumulative distance from `src`. Returns `None` if
/// `dst` cannot be reached. A path from a tile to itself is empty.
#[must_use]
pub fn shortest_path(
    grid: &Grid,
    src: TileCoord,
    dst: TileCoord,
    caps: &UnitCapabilities,
) -> Option<Vec<PathNode>> {
    if !grid.in_bounds(src) || !grid.in_bounds(dst) {
        return None;
    }
    if src == dst {
        return Some(Vec::new());
    }

    let src_index = grid.index_of(src);
    let dst_index = grid.index_of(dst);

    let mut dist: Vec<Option<Fixed>> = vec![None; grid.len()];
    let mut came_from: Vec<Option<usize>> = vec![None; grid.len()];
    let mut open = IndexMinPq::with_capacity(grid.len());

    dist[src_index] = Some(Fixed::ZERO);
    open.insert(src_index, Fixed::ZERO);

    while let Some((current, current_dist)) = open.pop_min() {
        if current == dst_index {
            break;
        }

        for neighbor in grid.neighbors(grid.coord_of(current)) {
            let Some(weight) = grid.move_weight(neighbor, caps) else {
                continue;
            };
            let index = grid.index_of(neighbor);
            let tentative = current_dist + weight;
            if dist[index].map_or(true, |d| tentative < d) {
                dist[index] = Some(tentative);
                came_from[index] = Some(current);
                open.insert(index, tentative);
            }
        }
    }

    dist[dst_index]?;

    let mut path = Vec::new();
    let mut current = dst_index;
    while current != src_index {
        path.push(PathNode {
            tile: grid.coord_of(current),
            dist: dist[current]?,
        });
        current = came_from[current]?;
    }
    path.reverse();
    Some(path)
}

/// Find every tile reachable from `start` within `max_dist`.
///
/// Label-correcting search over a FIFO worklist: a tile may be processed
/// more than once as cheaper routes to it are discovered. Positive edge
/// weights make the recorded distances converge to the shortest ones.
///
/// The start tile is excluded. Results are in row-major tile order.
#[must_use]
pub fn reachable_tiles(
    grid: &Grid,
    start: TileCoord,
    max_dist: Fixed,
    caps: &UnitCapabilities,
) -> Vec<PathNode> {
    if !grid.in_bounds(start) {
        return Vec::new();
    }

    let start_index = grid.index_of(start);
    let mut best: Vec<Option<Fixed>> = vec![None; grid.len()];
    let mut queue = VecDeque::new();
    queue.push_back((start_index, Fixed::ZERO));

    while let Some((index, dist)) = queue.pop_front() {
        if dist > max_dist || best[index].is_some_and(|b| b <= dist) {
            continue;
        }
        best[index] = Some(dist);

        for neighbor in grid.neighbors(grid.coord_of(index)) {
            if let Some(weight) = grid.move_weight(neighbor, caps) {
                queue.push_back((grid.index_of(neighbor), dist + weight));
            }
        }
    }

    best.into_iter()
        .enumerate()
        .filter(|&(index, _)| index != start_index)
        .filter_map(|(index, dist)| {
            dist.map(|dist| PathNode {
                tile: grid.coord_of(index),
                dist,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::TileType;

    fn fixed(n: i32) -> Fixed {
        Fixed::from_num(n)
    }

    fn coord(i: u32, j: u32) -> TileCoord {
        TileCoord::new(i, j)
    }

    #[test]
    fn test_straight_line_path() {
        let grid = Grid::uniform(5, 1, TileType::Grassland).unwrap();
        let path = shortest_path(&grid, coord(0, 0), coord(3, 0), &UnitCapabilities::digger())
            .unwrap();

        let tiles: Vec<TileCoord> = path.iter().map(|n| n.tile).collect();
        assert_eq!(tiles, vec![coord(1, 0), coord(2, 0), coord(3, 0)]);
        assert_eq!(path.last().unwrap().dist, fixed(3));
    }

    #[test]
    fn test_path_to_self_is_empty() {
        let grid = Grid::uniform(3, 3, TileType::Grassland).unwrap();
        let path = shortest_path(&grid, coord(1, 1), coord(1, 1), &UnitCapabilities::digger());
        assert_eq!(path, Some(Vec::new()));
    }

    #[test]
    fn test_water_is_unreachable() {
        let mut grid = Grid::uniform(3, 3, TileType::Grassland).unwrap();
        grid.set_tile_type(coord(2, 2), TileType::Water).unwrap();
        let path = shortest_path(&grid, coord(0, 0), coord(2, 2), &UnitCapabilities::digger());
        assert!(path.is_none());
    }

    #[test]
    fn test_forest_costs_double_for_digger() {
        let grid = Grid::new(2, 1, vec![TileType::Grassland, TileType::Forest]).unwrap();
        let path = shortest_path(&grid, coord(0, 0), coord(1, 0), &UnitCapabilities::digger())
            .unwrap();
        assert_eq!(path.len(), 1);
        assert_eq!(path[0].dist, fixed(2));
    }

    #[test]
    fn test_truck_cannot_cross_forest_wall() {
        let grid = Grid::new(
            3,
            1,
            vec![TileType::Grassland, TileType::Forest, TileType::Grassland],
        )
        .unwrap();
        assert!(
            shortest_path(&grid, coord(0, 0), coord(2, 0), &UnitCapabilities::truck()).is_none()
        );
        let digger = shortest_path(&grid, coord(0, 0), coord(2, 0), &UnitCapabilities::digger())
            .unwrap();
        assert_eq!(digger.last().unwrap().dist, fixed(3));
    }

    #[test]
    fn test_reachable_three_by_three() {
        let grid = Grid::uniform(3, 3, TileType::Grassland).unwrap();
        let reach = reachable_tiles(&grid, coord(1, 1), fixed(2), &UnitCapabilities::digger());

        // Odd row: diagonals come from column 2. (0, 0) and (0, 2) are two hops.
        let expected = vec![
            (coord(0, 0), 2),
            (coord(1, 0), 1),
            (coord(2, 0), 1),
            (coord(0, 1), 1),
            (coord(2, 1), 1),
            (coord(0, 2), 2),
            (coord(1, 2), 1),
            (coord(2, 2), 1),
        ];
        let actual: Vec<(TileCoord, Fixed)> = reach.iter().map(|n| (n.tile, n.dist)).collect();
        let expected: Vec<(TileCoord, Fixed)> =
            expected.into_iter().map(|(t, d)| (t, fixed(d))).collect();
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_reachable_respects_budget() {
        let grid = Grid::uniform(3, 3, TileType::Grassland).unwrap();
        let reach = reachable_tiles(&grid, coord(1, 1), fixed(1), &UnitCapabilities::digger());
        assert_eq!(reach.len(), 6);
        assert!(reach.iter().all(|n| n.dist == fixed(1)));
    }

    #[test]
    fn test_reachable_excludes_start_and_water() {
        let mut grid = Grid::uniform(3, 1, TileType::Grassland).unwrap();
        grid.set_tile_type(coord(1, 0), TileType::Water).unwrap();
        let reach = reachable_tiles(&grid, coord(0, 0), fixed(10), &UnitCapabilities::digger());
        assert!(reach.is_empty());
    }

    #[test]
    fn test_reachable_agrees_with_shortest_path() {
        let mut grid = Grid::uniform(6, 6, TileType::Grassland).unwrap();
        for (i, j) in [(2, 1), (2, 2), (3, 3), (1, 4)] {
            grid.set_tile_type(coord(i, j), TileType::Forest).unwrap();
        }
        grid.set_tile_type(coord(4, 2), TileType::Water).unwrap();
        let caps = UnitCapabilities::digger();

        for node in reachable_tiles(&grid, coord(0, 0), fixed(6), &caps) {
            let path = shortest_path(&grid, coord(0, 0), node.tile, &caps).unwrap();
            assert_eq!(path.last().unwrap().dist, node.dist, "tile {}", node.tile);
        }
    }
}
