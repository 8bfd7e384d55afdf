//! Multi-source breadth-first flow field used by the board.

use std::collections::VecDeque;

use tile_defence_core::{Direction, TileContent, TileIndex};

use crate::{tile::Tile, ReachabilityPolicy};

const ALTERNATIVE_ORDER: [Direction; 4] = [
    Direction::North,
    Direction::South,
    Direction::East,
    Direction::West,
];
const REGULAR_ORDER: [Direction; 4] = [
    Direction::West,
    Direction::East,
    Direction::South,
    Direction::North,
];

/// Reusable frontier for flow-field passes.
///
/// Every destination seeds the frontier with distance zero; the search then
/// grows outward one hop at a time so each reached tile points at a neighbor
/// that is strictly closer to some destination.
#[derive(Clone, Debug, Default)]
pub(crate) struct FlowField {
    frontier: VecDeque<TileIndex>,
}

impl FlowField {
    /// Recomputes routing data for every tile.
    ///
    /// Returns `false` when no destination exists, or when the policy demands
    /// connected spawn points and one of them was left unreached.
    pub(crate) fn find_paths(&mut self, tiles: &mut [Tile], policy: ReachabilityPolicy) -> bool {
        self.frontier.clear();

        for (offset, tile) in tiles.iter_mut().enumerate() {
            if tile.content() == TileContent::Destination {
                tile.become_destination();
                self.frontier.push_back(TileIndex::new(offset));
            } else {
                tile.clear_path();
            }
        }

        if self.frontier.is_empty() {
            return false;
        }

        let mut reached = self.frontier.len();
        while let Some(current) = self.frontier.pop_front() {
            let order = if tiles[current.get()].is_alternative() {
                ALTERNATIVE_ORDER
            } else {
                REGULAR_ORDER
            };

            for direction in order {
                if let Some(grown) = grow_path(tiles, current, direction) {
                    reached += 1;
                    self.frontier.push_back(grown);
                }
            }
        }

        log::debug!("flow field reached {reached} of {} tiles", tiles.len());

        match policy {
            ReachabilityPolicy::DestinationsOnly => true,
            ReachabilityPolicy::SpawnPointsConnected => tiles
                .iter()
                .filter(|tile| tile.content() == TileContent::SpawnPoint)
                .all(Tile::has_path),
        }
    }
}

fn grow_path(tiles: &mut [Tile], from: TileIndex, direction: Direction) -> Option<TileIndex> {
    let current = &tiles[from.get()];
    let distance = current.distance()?;
    let neighbor = current.neighbor(direction)?;

    let candidate = &mut tiles[neighbor.get()];
    if candidate.has_path() || candidate.content().blocks_path() {
        return None;
    }

    candidate.receive_path(distance + 1, from, direction.opposite());
    Some(neighbor)
}
