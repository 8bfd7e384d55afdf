//! Grid cell storage owned by the board.

use glam::Vec2;
use tile_defence_core::{Direction, TileContent, TileCoord, TileIndex};

const UNREACHED: u32 = u32::MAX;

/// Single cell of the board together with its transient routing data.
///
/// Neighbor links and routing pointers are plain indices into the board's
/// tile array; the board is the only writer.
#[derive(Clone, Debug, PartialEq)]
pub struct Tile {
    coord: TileCoord,
    position: Vec2,
    content: TileContent,
    neighbors: [Option<TileIndex>; 4],
    is_alternative: bool,
    distance: u32,
    next_on_path: Option<TileIndex>,
    path_direction: Option<Direction>,
    exit_point: Vec2,
}

impl Tile {
    pub(crate) fn new(coord: TileCoord, position: Vec2) -> Self {
        Self {
            coord,
            position,
            content: TileContent::Empty,
            neighbors: [None; 4],
            is_alternative: (coord.x() + coord.y()) % 2 == 1,
            distance: UNREACHED,
            next_on_path: None,
            path_direction: None,
            exit_point: position,
        }
    }

    /// Grid coordinate of the tile.
    #[must_use]
    pub const fn coord(&self) -> TileCoord {
        self.coord
    }

    /// World-space centre of the tile on the ground plane.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Content currently placed on the tile.
    #[must_use]
    pub const fn content(&self) -> TileContent {
        self.content
    }

    /// Adjacent tile in the provided direction, `None` at the grid edge.
    #[must_use]
    pub const fn neighbor(&self, direction: Direction) -> Option<TileIndex> {
        self.neighbors[direction.index()]
    }

    /// Checkerboard parity that selects the neighbor visitation order.
    #[must_use]
    pub const fn is_alternative(&self) -> bool {
        self.is_alternative
    }

    /// Hop count to the nearest destination, `None` when unreached.
    #[must_use]
    pub const fn distance(&self) -> Option<u32> {
        if self.distance == UNREACHED {
            None
        } else {
            Some(self.distance)
        }
    }

    /// Reports whether the last flow-field pass reached the tile.
    #[must_use]
    pub const fn has_path(&self) -> bool {
        self.distance != UNREACHED
    }

    /// Neighbor one step closer to a destination.
    #[must_use]
    pub const fn next_tile_on_path(&self) -> Option<TileIndex> {
        self.next_on_path
    }

    /// Direction from this tile toward its next hop.
    #[must_use]
    pub const fn path_direction(&self) -> Option<Direction> {
        self.path_direction
    }

    /// Point on the edge shared with the next hop; the centre for destinations.
    #[must_use]
    pub const fn exit_point(&self) -> Vec2 {
        self.exit_point
    }

    pub(crate) fn set_content(&mut self, content: TileContent) {
        self.content = content;
    }

    pub(crate) fn set_neighbor(&mut self, direction: Direction, neighbor: TileIndex) {
        self.neighbors[direction.index()] = Some(neighbor);
    }

    pub(crate) fn clear_path(&mut self) {
        self.distance = UNREACHED;
        self.next_on_path = None;
        self.path_direction = None;
        self.exit_point = self.position;
    }

    pub(crate) fn become_destination(&mut self) {
        self.distance = 0;
        self.next_on_path = None;
        self.path_direction = None;
        self.exit_point = self.position;
    }

    pub(crate) fn receive_path(&mut self, distance: u32, next: TileIndex, direction: Direction) {
        self.distance = distance;
        self.next_on_path = Some(next);
        self.path_direction = Some(direction);
        self.exit_point = self.position + direction.half_vector();
    }
}
