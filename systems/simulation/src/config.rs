//! TOML-backed configuration for a simulation run.

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tile_defence_core::{FloatRange, TileCoord};
use tile_defence_system_movement::AnimationTimings;
use tile_defence_system_spawning::EnemyProfile;
use tile_defence_world::{BoardConfig, BoardError};

const MIN_BOARD_SIDE: u32 = 2;
const MAX_PATH_OFFSET: f32 = 0.5;

/// Errors raised while loading or validating a [`GameConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration from {path}")]
    Io {
        /// Path that was requested.
        path: String,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The TOML document did not match the configuration schema.
    #[error("failed to parse configuration toml")]
    Parse(#[from] toml::de::Error),
    /// Both board sides must span at least two tiles.
    #[error("board must be at least 2x2, got {width}x{height}")]
    BoardTooSmall {
        /// Requested number of columns.
        width: u32,
        /// Requested number of rows.
        height: u32,
    },
    /// The board could not be constructed.
    #[error(transparent)]
    Board(#[from] BoardError),
    /// A range had non-finite, inverted or non-positive bounds.
    #[error("invalid range for `{field}`: {min}..{max}")]
    InvalidRange {
        /// Name of the offending field.
        field: &'static str,
        /// Configured lower bound.
        min: f32,
        /// Configured upper bound.
        max: f32,
    },
    /// Lane offsets must keep units inside their tile.
    #[error("path offsets must lie strictly inside -0.5..0.5, got {min}..{max}")]
    PathOffset {
        /// Configured lower bound.
        min: f32,
        /// Configured upper bound.
        max: f32,
    },
    /// Durations and rates must be finite and non-negative.
    #[error("`{field}` must be finite and non-negative, got {value}")]
    Negative {
        /// Name of the offending field.
        field: &'static str,
        /// Configured value.
        value: f32,
    },
    /// A layout entry referenced a tile outside the board.
    #[error("layout tile {tile:?} lies outside the board")]
    LayoutOutOfBounds {
        /// Offending coordinate.
        tile: TileCoord,
    },
}

/// Spawn cadence and attribute ranges for new units.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyConfig {
    /// Units spawned per second.
    pub spawn_speed: f32,
    /// Seed for spawn-point selection and attribute sampling.
    pub seed: u64,
    /// Attribute ranges.
    #[serde(flatten)]
    pub profile: EnemyProfile,
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            spawn_speed: 1.0,
            seed: 0,
            profile: EnemyProfile::default(),
        }
    }
}

/// Initial board content applied on top of the seeded destination and spawn point.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Tiles that start as walls.
    pub walls: Vec<TileCoord>,
    /// Additional destinations.
    pub destinations: Vec<TileCoord>,
    /// Additional spawn points.
    pub spawn_points: Vec<TileCoord>,
    /// Tiles that start with a laser tower.
    pub towers: Vec<TileCoord>,
}

impl LayoutConfig {
    fn tiles(&self) -> impl Iterator<Item = TileCoord> + '_ {
        self.walls
            .iter()
            .chain(&self.destinations)
            .chain(&self.spawn_points)
            .chain(&self.towers)
            .copied()
    }
}

/// Complete configuration of a simulation run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Board dimensions and reachability policy.
    pub board: BoardConfig,
    /// Spawning behaviour.
    pub enemies: EnemyConfig,
    /// Durations of the unit lifecycle stages.
    pub animation: AnimationTimings,
    /// Initial board content.
    pub layout: LayoutConfig,
}

impl GameConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates the TOML file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Checks every invariant the simulation relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let BoardConfig { width, height, .. } = self.board;
        if width < MIN_BOARD_SIDE || height < MIN_BOARD_SIDE {
            return Err(ConfigError::BoardTooSmall { width, height });
        }
        if let Some(tile) = self
            .layout
            .tiles()
            .find(|tile| tile.x() >= width || tile.y() >= height)
        {
            return Err(ConfigError::LayoutOutOfBounds { tile });
        }

        let profile = &self.enemies.profile;
        positive_range("enemies.scale", profile.scale)?;
        positive_range("enemies.speed", profile.speed)?;
        positive_range("enemies.health", profile.health)?;
        let offset = profile.path_offset;
        if !offset.is_valid() {
            return Err(ConfigError::InvalidRange {
                field: "enemies.path_offset",
                min: offset.min(),
                max: offset.max(),
            });
        }
        if offset.min() <= -MAX_PATH_OFFSET || offset.max() >= MAX_PATH_OFFSET {
            return Err(ConfigError::PathOffset {
                min: offset.min(),
                max: offset.max(),
            });
        }

        non_negative("enemies.spawn_speed", self.enemies.spawn_speed)?;
        non_negative("animation.intro", self.animation.intro)?;
        non_negative("animation.outro", self.animation.outro)?;
        Ok(())
    }
}

fn positive_range(field: &'static str, range: FloatRange) -> Result<(), ConfigError> {
    if range.is_valid() && range.min() > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidRange {
            field,
            min: range.min(),
            max: range.max(),
        })
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { field, value })
    }
}
