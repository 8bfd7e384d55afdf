#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative board state management for Tile Defence.
//!
//! The [`Board`] owns every [`Tile`], wires their neighbor links once at
//! construction, and recomputes the flow field whenever a toggle changes which
//! tiles block movement or act as destinations. Toggles are speculative: the
//! change is applied, the flow field is recomputed, and a failed pass rolls the
//! change back before recomputing again.

mod navigation;
mod tile;
mod towers;

pub use tile::Tile;

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tile_defence_core::{
    Command, Direction, Event, FlowFieldView, TileContent, TileCoord, TileIndex, ToggleOutcome,
    TowerKind,
};

use navigation::FlowField;
use towers::TowerRegistry;

const DEFAULT_BOARD_WIDTH: u32 = 11;
const DEFAULT_BOARD_HEIGHT: u32 = 11;

/// Decides which flow-field outcomes count as a valid board.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReachabilityPolicy {
    /// Every spawn point must reach a destination.
    #[default]
    SpawnPointsConnected,
    /// Only the presence of at least one destination is required.
    DestinationsOnly,
}

/// Dimensions and validation policy used to construct a [`Board`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    /// Number of tile columns.
    pub width: u32,
    /// Number of tile rows.
    pub height: u32,
    /// Policy applied after every flow-field pass.
    pub reachability: ReachabilityPolicy,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_BOARD_WIDTH,
            height: DEFAULT_BOARD_HEIGHT,
            reachability: ReachabilityPolicy::default(),
        }
    }
}

/// Errors raised while constructing a board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum BoardError {
    /// At least one dimension was zero.
    #[error("board must contain at least one tile, got {width}x{height}")]
    Empty {
        /// Requested number of columns.
        width: u32,
        /// Requested number of rows.
        height: u32,
    },
}

/// Rectangular tile grid and its flow field.
#[derive(Clone, Debug)]
pub struct Board {
    width: u32,
    height: u32,
    tiles: Vec<Tile>,
    spawn_points: Vec<TileIndex>,
    towers: TowerRegistry,
    flow_field: FlowField,
    policy: ReachabilityPolicy,
}

impl Board {
    /// Builds a board from the provided configuration.
    ///
    /// The grid is centred on the origin, one destination is seeded on the
    /// middle tile and, when the grid holds more than one tile, a spawn point
    /// is seeded on the first tile.
    pub fn new(config: &BoardConfig) -> Result<Self, BoardError> {
        let BoardConfig {
            width,
            height,
            reachability,
        } = *config;
        if width == 0 || height == 0 {
            return Err(BoardError::Empty { width, height });
        }

        let offset = Vec2::new((width - 1) as f32 * 0.5, (height - 1) as f32 * 0.5);
        let columns = width as usize;
        let mut tiles: Vec<Tile> = Vec::with_capacity(columns * height as usize);
        for y in 0..height {
            for x in 0..width {
                let position = Vec2::new(x as f32, y as f32) - offset;
                let index = tiles.len();
                let mut tile = Tile::new(TileCoord::new(x, y), position);
                if x > 0 {
                    tile.set_neighbor(Direction::West, TileIndex::new(index - 1));
                    tiles[index - 1].set_neighbor(Direction::East, TileIndex::new(index));
                }
                if y > 0 {
                    tile.set_neighbor(Direction::South, TileIndex::new(index - columns));
                    tiles[index - columns].set_neighbor(Direction::North, TileIndex::new(index));
                }
                tiles.push(tile);
            }
        }

        let mut board = Self {
            width,
            height,
            spawn_points: Vec::new(),
            towers: TowerRegistry::new(),
            flow_field: FlowField::default(),
            policy: reachability,
            tiles,
        };

        let centre = TileIndex::new(board.tiles.len() / 2);
        let _ = board.toggle_destination(centre);
        if board.tiles.len() > 1 {
            let _ = board.toggle_spawn_point(TileIndex::new(0));
        }
        Ok(board)
    }

    /// Builds a board of the given size with the default reachability policy.
    pub fn initialize(width: u32, height: u32) -> Result<Self, BoardError> {
        Self::new(&BoardConfig {
            width,
            height,
            ..BoardConfig::default()
        })
    }

    /// Number of tile columns.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of tile rows.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Policy applied after every flow-field pass.
    #[must_use]
    pub const fn reachability(&self) -> ReachabilityPolicy {
        self.policy
    }

    /// All tiles in row-major order.
    #[must_use]
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Tile stored at the provided index.
    #[must_use]
    pub fn tile(&self, index: TileIndex) -> Option<&Tile> {
        self.tiles.get(index.get())
    }

    /// Converts a grid coordinate into a tile index.
    #[must_use]
    pub fn tile_index(&self, coord: TileCoord) -> Option<TileIndex> {
        if coord.x() >= self.width || coord.y() >= self.height {
            return None;
        }
        let offset = coord.y() as usize * self.width as usize + coord.x() as usize;
        Some(TileIndex::new(offset))
    }

    /// Finds the tile containing a point on the ground plane.
    #[must_use]
    pub fn tile_at(&self, point: Vec2) -> Option<TileIndex> {
        let x = (point.x + self.width as f32 * 0.5).floor();
        let y = (point.y + self.height as f32 * 0.5).floor();
        if !(x >= 0.0 && y >= 0.0) {
            return None;
        }
        self.tile_index(TileCoord::new(x as u32, y as u32))
    }

    /// Finds the tile hit by a ray cast against the ground plane.
    ///
    /// Rays use `y` as the up axis; the ground plane's `z` axis maps onto the
    /// board's north axis.
    #[must_use]
    pub fn tile_at_ray(&self, origin: Vec3, direction: Vec3) -> Option<TileIndex> {
        if direction.y.abs() <= f32::EPSILON {
            return None;
        }
        let distance = -origin.y / direction.y;
        if distance < 0.0 {
            return None;
        }
        let hit = origin + direction * distance;
        self.tile_at(Vec2::new(hit.x, hit.z))
    }

    /// Number of designated spawn points.
    #[must_use]
    pub fn spawn_point_count(&self) -> usize {
        self.spawn_points.len()
    }

    /// Spawn point at the provided position in designation order.
    #[must_use]
    pub fn spawn_point(&self, index: usize) -> Option<TileIndex> {
        self.spawn_points.get(index).copied()
    }

    /// Recomputes the flow field, reporting whether the board is valid.
    pub fn find_paths(&mut self) -> bool {
        self.flow_field.find_paths(&mut self.tiles, self.policy)
    }

    /// Toggles between an empty tile and a wall.
    pub fn toggle_wall(&mut self, index: TileIndex) -> ToggleOutcome {
        match self.content_of(index) {
            Some(TileContent::Wall) => self.replace_content(index, TileContent::Empty),
            Some(TileContent::Empty) => self.replace_content(index, TileContent::Wall),
            _ => ToggleOutcome::Ignored,
        }
    }

    /// Toggles between an empty tile and a destination.
    ///
    /// Clearing the last destination is always reverted.
    pub fn toggle_destination(&mut self, index: TileIndex) -> ToggleOutcome {
        match self.content_of(index) {
            Some(TileContent::Destination) => self.replace_content(index, TileContent::Empty),
            Some(TileContent::Empty) => self.replace_content(index, TileContent::Destination),
            _ => ToggleOutcome::Ignored,
        }
    }

    /// Toggles between an empty tile and a spawn point.
    ///
    /// The last remaining spawn point cannot be cleared.
    pub fn toggle_spawn_point(&mut self, index: TileIndex) -> ToggleOutcome {
        match self.content_of(index) {
            Some(TileContent::SpawnPoint) if self.spawn_points.len() > 1 => {
                self.tiles[index.get()].set_content(TileContent::Empty);
                self.spawn_points.retain(|spawn| *spawn != index);
                ToggleOutcome::Applied
            }
            Some(TileContent::Empty)
                if self.policy == ReachabilityPolicy::SpawnPointsConnected
                    && !self.tiles[index.get()].has_path() =>
            {
                log::info!(
                    "reverted spawn point on sealed tile {:?}",
                    self.tiles[index.get()].coord()
                );
                ToggleOutcome::Reverted
            }
            Some(TileContent::Empty) => {
                self.tiles[index.get()].set_content(TileContent::SpawnPoint);
                self.spawn_points.push(index);
                ToggleOutcome::Applied
            }
            _ => ToggleOutcome::Ignored,
        }
    }

    /// Places a tower on an empty or walled tile, or removes an existing tower.
    pub fn toggle_tower(&mut self, index: TileIndex, kind: TowerKind) -> ToggleOutcome {
        match self.content_of(index) {
            Some(TileContent::Tower(_)) => {
                let outcome = self.replace_content(index, TileContent::Empty);
                if outcome == ToggleOutcome::Applied {
                    let _ = self.towers.remove_at(index);
                }
                outcome
            }
            Some(TileContent::Empty) => {
                let outcome = self.replace_content(index, TileContent::Tower(kind));
                if outcome == ToggleOutcome::Applied {
                    let _ = self.towers.insert(kind, index);
                }
                outcome
            }
            Some(TileContent::Wall) => {
                self.tiles[index.get()].set_content(TileContent::Tower(kind));
                let _ = self.towers.insert(kind, index);
                ToggleOutcome::Applied
            }
            _ => ToggleOutcome::Ignored,
        }
    }

    fn content_of(&self, index: TileIndex) -> Option<TileContent> {
        self.tile(index).map(Tile::content)
    }

    fn replace_content(&mut self, index: TileIndex, content: TileContent) -> ToggleOutcome {
        let previous = self.tiles[index.get()].content();
        self.tiles[index.get()].set_content(content);
        if self.find_paths() {
            return ToggleOutcome::Applied;
        }

        self.tiles[index.get()].set_content(previous);
        let restored = self.find_paths();
        debug_assert!(restored, "previous board configuration must stay valid");
        log::info!(
            "reverted {content:?} on tile {:?}; board kept {previous:?}",
            self.tiles[index.get()].coord()
        );
        ToggleOutcome::Reverted
    }
}

impl FlowFieldView for Board {
    fn next_tile_on_path(&self, tile: TileIndex) -> Option<TileIndex> {
        self.tile(tile).and_then(Tile::next_tile_on_path)
    }

    fn path_direction(&self, tile: TileIndex) -> Option<Direction> {
        self.tile(tile).and_then(Tile::path_direction)
    }

    fn exit_point(&self, tile: TileIndex) -> Option<Vec2> {
        self.tile(tile).map(Tile::exit_point)
    }

    fn tile_position(&self, tile: TileIndex) -> Option<Vec2> {
        self.tile(tile).map(Tile::position)
    }
}

/// Applies the provided command to the board and reports the outcome as events.
pub fn apply(board: &mut Board, command: Command, out_events: &mut Vec<Event>) {
    let coord = match command {
        Command::ToggleWall { tile }
        | Command::ToggleDestination { tile }
        | Command::ToggleSpawnPoint { tile }
        | Command::ToggleTower { tile, .. } => tile,
    };
    let Some(index) = board.tile_index(coord) else {
        log::warn!("ignoring {command:?}: tile lies outside the board");
        return;
    };
    let Some(current) = board.content_of(index) else {
        return;
    };

    let (attempted, outcome) = match command {
        Command::ToggleWall { .. } => (
            flipped(current, TileContent::Wall),
            board.toggle_wall(index),
        ),
        Command::ToggleDestination { .. } => (
            flipped(current, TileContent::Destination),
            board.toggle_destination(index),
        ),
        Command::ToggleSpawnPoint { .. } => (
            flipped(current, TileContent::SpawnPoint),
            board.toggle_spawn_point(index),
        ),
        Command::ToggleTower { kind, .. } => {
            let removed = board.towers.tower_at(index);
            let outcome = board.toggle_tower(index, kind);
            if outcome == ToggleOutcome::Applied {
                match removed {
                    Some(tower) => out_events.push(Event::TowerRemoved { tower, tile: coord }),
                    None => {
                        if let Some(tower) = board.towers.tower_at(index) {
                            out_events.push(Event::TowerPlaced { tower, tile: coord });
                        }
                    }
                }
            }
            (
                if removed.is_some() {
                    TileContent::Empty
                } else {
                    TileContent::Tower(kind)
                },
                outcome,
            )
        }
    };

    match outcome {
        ToggleOutcome::Applied => {
            if let Some(content) = board.content_of(index) {
                out_events.push(Event::TopologyChanged {
                    tile: coord,
                    content,
                });
            }
        }
        ToggleOutcome::Reverted => out_events.push(Event::ToggleReverted {
            tile: coord,
            attempted,
        }),
        ToggleOutcome::Ignored => {}
    }
}

fn flipped(current: TileContent, target: TileContent) -> TileContent {
    if current == target {
        TileContent::Empty
    } else {
        target
    }
}

/// Query functions that provide read-only access to the board state.
pub mod query {
    use tile_defence_core::{TileContent, TileIndex, TowerSnapshot};

    use super::Board;

    /// Captures the towers placed on the board in identifier order.
    #[must_use]
    pub fn tower_view(board: &Board) -> Vec<TowerSnapshot> {
        board
            .towers
            .iter()
            .filter_map(|tower| {
                let tile = board.tile(tower.tile)?;
                Some(TowerSnapshot {
                    id: tower.id,
                    kind: tower.kind,
                    tile: tile.coord(),
                    position: tile.position(),
                })
            })
            .collect()
    }

    /// Enumerates the designated spawn points in designation order.
    #[must_use]
    pub fn spawn_points(board: &Board) -> Vec<TileIndex> {
        board.spawn_points.clone()
    }

    /// Enumerates every destination tile.
    #[must_use]
    pub fn destinations(board: &Board) -> Vec<TileIndex> {
        board
            .tiles
            .iter()
            .enumerate()
            .filter(|(_, tile)| tile.content() == TileContent::Destination)
            .map(|(offset, _)| TileIndex::new(offset))
            .collect()
    }

    /// Follows next-hop pointers from `start`, returning the visited tiles.
    ///
    /// The route includes `start` and ends at the first tile without a next
    /// hop. Walks are capped at the tile count so a corrupted field can never
    /// loop forever.
    #[must_use]
    pub fn route_from(board: &Board, start: TileIndex) -> Vec<TileIndex> {
        let mut route = Vec::new();
        let mut cursor = board.tile(start).map(|_| start);
        while let Some(current) = cursor {
            if route.len() > board.tiles.len() {
                break;
            }
            route.push(current);
            cursor = board.tile(current).and_then(|tile| tile.next_tile_on_path());
        }
        route
    }
}
