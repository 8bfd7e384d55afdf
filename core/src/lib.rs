#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Tile Defence engine.
//!
//! This crate defines the value types that connect the authoritative board,
//! the pure systems, and the adapters. Adapters submit [`Command`] values
//! describing topology changes, the board applies them and reports [`Event`]
//! values, and moving units read routing data exclusively through the
//! [`FlowFieldView`] trait so they never touch board internals.

mod pool;

pub use pool::{Handle, Pool, PoolId};

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Cardinal orientations available on the tile grid.
///
/// North points toward increasing `y`, East toward increasing `x`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Travel toward increasing row indices.
    North,
    /// Travel toward increasing column indices.
    East,
    /// Travel toward decreasing row indices.
    South,
    /// Travel toward decreasing column indices.
    West,
}

impl Direction {
    /// All directions in clockwise order starting at North.
    pub const ALL: [Direction; 4] = [Self::North, Self::East, Self::South, Self::West];

    /// Position of the direction in clockwise order, North being zero.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::North => 0,
            Self::East => 1,
            Self::South => 2,
            Self::West => 3,
        }
    }

    /// Rotation angle in degrees, measured clockwise from North.
    #[must_use]
    pub const fn angle(self) -> f32 {
        match self {
            Self::North => 0.0,
            Self::East => 90.0,
            Self::South => 180.0,
            Self::West => 270.0,
        }
    }

    /// Unit vector pointing along the direction on the ground plane.
    #[must_use]
    pub const fn unit_vector(self) -> Vec2 {
        match self {
            Self::North => Vec2::new(0.0, 1.0),
            Self::East => Vec2::new(1.0, 0.0),
            Self::South => Vec2::new(0.0, -1.0),
            Self::West => Vec2::new(-1.0, 0.0),
        }
    }

    /// Offset from a tile centre to the edge shared with the neighbor in this direction.
    #[must_use]
    pub fn half_vector(self) -> Vec2 {
        self.unit_vector() * 0.5
    }

    /// Direction pointing the opposite way.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::East => Self::West,
            Self::South => Self::North,
            Self::West => Self::East,
        }
    }

    /// Classifies the turn required to go from travelling `self` to travelling `next`.
    #[must_use]
    pub const fn direction_change_to(self, next: Direction) -> DirectionChange {
        let delta = (next.index() + 4 - self.index()) % 4;
        match delta {
            0 => DirectionChange::None,
            1 => DirectionChange::TurnRight,
            3 => DirectionChange::TurnLeft,
            _ => DirectionChange::TurnAround,
        }
    }
}

/// Turning relationship between two successive travel directions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DirectionChange {
    /// Both segments share the same direction.
    None,
    /// The second segment is a quarter turn clockwise from the first.
    TurnRight,
    /// The second segment is a quarter turn counter-clockwise from the first.
    TurnLeft,
    /// The second segment reverses the first.
    TurnAround,
}

/// Location of a single tile expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    x: u32,
    y: u32,
}

impl TileCoord {
    /// Creates a new tile coordinate.
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Zero-based column of the tile.
    #[must_use]
    pub const fn x(&self) -> u32 {
        self.x
    }

    /// Zero-based row of the tile.
    #[must_use]
    pub const fn y(&self) -> u32 {
        self.y
    }

    /// Computes the Manhattan distance between two tile coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: TileCoord) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

/// Dense index of a tile inside the board's row-major tile array.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileIndex(usize);

impl TileIndex {
    /// Wraps the provided array offset.
    #[must_use]
    pub const fn new(value: usize) -> Self {
        Self(value)
    }

    /// Retrieves the underlying array offset.
    #[must_use]
    pub const fn get(&self) -> usize {
        self.0
    }
}

/// Types of towers that can occupy a tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TowerKind {
    /// Continuous beam that damages a single target.
    Laser,
}

impl TowerKind {
    /// Targeting radius measured in tiles from the tower centre.
    #[must_use]
    pub const fn targeting_range(self) -> f32 {
        match self {
            Self::Laser => 2.5,
        }
    }

    /// Damage dealt to the held target per second of simulated time.
    #[must_use]
    pub const fn damage_per_second(self) -> f32 {
        match self {
            Self::Laser => 25.0,
        }
    }
}

/// Content placed on a tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileContent {
    /// Open floor.
    Empty,
    /// Flow-field sink that units try to reach.
    Destination,
    /// Impassable obstacle.
    Wall,
    /// Entry point where new units appear.
    SpawnPoint,
    /// Tower structure; impassable.
    Tower(TowerKind),
}

impl TileContent {
    /// Reports whether the content prevents units from entering the tile.
    #[must_use]
    pub const fn blocks_path(self) -> bool {
        matches!(self, Self::Wall | Self::Tower(_))
    }
}

/// Closed range of floating point values used to randomise unit attributes.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FloatRange {
    min: f32,
    max: f32,
}

impl FloatRange {
    /// Creates a range; a maximum below the minimum collapses onto the minimum.
    #[must_use]
    pub fn new(min: f32, max: f32) -> Self {
        Self {
            min,
            max: if max < min { min } else { max },
        }
    }

    /// Creates a range containing a single value.
    #[must_use]
    pub const fn constant(value: f32) -> Self {
        Self {
            min: value,
            max: value,
        }
    }

    /// Lower bound of the range.
    #[must_use]
    pub const fn min(&self) -> f32 {
        self.min
    }

    /// Upper bound of the range.
    #[must_use]
    pub const fn max(&self) -> f32 {
        self.max
    }

    /// Reports whether both bounds are finite and ordered.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min <= self.max
    }

    /// Maps a fraction in `0.0..=1.0` onto the range.
    #[must_use]
    pub fn at(&self, fraction: f32) -> f32 {
        self.min + (self.max - self.min) * fraction
    }
}

/// Unique identifier assigned to a moving unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitId(u32);

impl UnitId {
    /// Creates a new unit identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TowerId(u32);

impl TowerId {
    /// Creates a new tower identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the tower identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Commands that express all permissible board mutations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Toggles a wall on an empty tile, or clears an existing wall.
    ToggleWall {
        /// Tile targeted by the toggle.
        tile: TileCoord,
    },
    /// Toggles a destination on an empty tile, or clears an existing destination.
    ToggleDestination {
        /// Tile targeted by the toggle.
        tile: TileCoord,
    },
    /// Toggles a spawn point on an empty tile, or clears an existing spawn point.
    ToggleSpawnPoint {
        /// Tile targeted by the toggle.
        tile: TileCoord,
    },
    /// Places a tower on an empty or walled tile, or removes an existing tower.
    ToggleTower {
        /// Tile targeted by the toggle.
        tile: TileCoord,
        /// Kind of tower to construct.
        kind: TowerKind,
    },
}

/// Events broadcast by the board and the movement core.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    /// A content change was committed.
    ///
    /// Spawn-point toggles and wall-to-tower upgrades leave routing data untouched.
    TopologyChanged {
        /// Tile whose content changed.
        tile: TileCoord,
        /// Content now occupying the tile.
        content: TileContent,
    },
    /// A topology change failed validation and was rolled back.
    ToggleReverted {
        /// Tile targeted by the rejected change.
        tile: TileCoord,
        /// Content the change attempted to place.
        attempted: TileContent,
    },
    /// A tower was registered on the board.
    TowerPlaced {
        /// Identifier allocated to the tower.
        tower: TowerId,
        /// Tile occupied by the tower.
        tile: TileCoord,
    },
    /// A tower was removed from the board.
    TowerRemoved {
        /// Identifier of the removed tower.
        tower: TowerId,
        /// Tile previously occupied by the tower.
        tile: TileCoord,
    },
    /// A unit entered the board on a spawn point.
    UnitSpawned {
        /// Identifier of the new unit.
        unit: UnitId,
        /// Spawn tile the unit appeared on.
        tile: TileCoord,
    },
    /// A spawn request targeted a tile that currently has no route.
    SpawnRejected {
        /// Spawn tile without a next hop.
        tile: TileCoord,
    },
    /// A unit arrived at a destination and began its outro.
    UnitReachedDestination {
        /// Identifier of the arriving unit.
        unit: UnitId,
    },
    /// A unit's health dropped to zero.
    UnitEliminated {
        /// Identifier of the eliminated unit.
        unit: UnitId,
    },
}

/// Result of a topology toggle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// The change was committed.
    Applied,
    /// The change failed validation and the previous configuration was restored.
    Reverted,
    /// The tile's content does not participate in this toggle.
    Ignored,
}

/// Signal returned by a unit after advancing its state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// The unit remains on the board.
    Alive,
    /// The caller should release the unit back to its pool.
    Removed,
}

/// Programmer-contract violations reported instead of corrupting state.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum ContractViolation {
    /// Damage amounts must be non-negative.
    #[error("negative damage {amount} applied")]
    NegativeDamage {
        /// Offending damage amount.
        amount: f32,
    },
    /// Units may only spawn on tiles that have a next hop.
    #[error("tile {tile:?} has no route toward a destination")]
    NoRoute {
        /// Tile the spawn targeted.
        tile: TileIndex,
    },
    /// A handle was released into a pool that did not issue it.
    #[error("handle issued by pool {found:?} released into pool {expected:?}")]
    ForeignHandle {
        /// Pool receiving the release.
        expected: PoolId,
        /// Pool recorded on the handle.
        found: PoolId,
    },
    /// A handle no longer refers to a live pool entry.
    #[error("handle {handle:?} does not refer to a live entry")]
    StaleHandle {
        /// Offending handle.
        handle: Handle,
    },
}

/// Read-only routing information exposed to moving units.
///
/// Implementations answer `None` for indices outside the board.
pub trait FlowFieldView {
    /// Neighbor one step closer to a destination, or `None` for destinations
    /// and unreachable tiles.
    fn next_tile_on_path(&self, tile: TileIndex) -> Option<TileIndex>;

    /// Direction from the tile toward its next hop.
    fn path_direction(&self, tile: TileIndex) -> Option<Direction>;

    /// Point on the edge shared with the next hop.
    fn exit_point(&self, tile: TileIndex) -> Option<Vec2>;

    /// World-space centre of the tile.
    fn tile_position(&self, tile: TileIndex) -> Option<Vec2>;
}

/// Immutable representation of a unit used by targeting queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UnitSnapshot {
    /// Identifier of the unit.
    pub id: UnitId,
    /// World-space position including the lane offset.
    pub position: Vec2,
    /// Visual scale; widens the effective hit radius.
    pub scale: f32,
    /// Whether towers may select the unit.
    pub targetable: bool,
}

/// Immutable representation of a tower used by targeting queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerSnapshot {
    /// Identifier allocated by the board.
    pub id: TowerId,
    /// Kind of tower.
    pub kind: TowerKind,
    /// Tile occupied by the tower.
    pub tile: TileCoord,
    /// World-space centre of the tower.
    pub position: Vec2,
}
