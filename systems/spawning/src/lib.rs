#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic spawning system that admits new units at a steady cadence.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tile_defence_core::FloatRange;
use tile_defence_system_movement::UnitAttributes;

/// Ranges from which every new unit's attributes are drawn.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyProfile {
    /// Visual scale.
    pub scale: FloatRange,
    /// Travel speed in tiles per second.
    pub speed: FloatRange,
    /// Lateral lane displacement.
    pub path_offset: FloatRange,
    /// Starting health.
    pub health: FloatRange,
}

impl Default for EnemyProfile {
    fn default() -> Self {
        Self {
            scale: FloatRange::new(0.5, 1.5),
            speed: FloatRange::new(0.75, 1.25),
            path_offset: FloatRange::new(-0.25, 0.25),
            health: FloatRange::new(10.0, 100.0),
        }
    }
}

/// Samples unit attributes from an [`EnemyProfile`].
#[derive(Clone, Copy, Debug)]
pub struct EnemyFactory {
    profile: EnemyProfile,
}

impl EnemyFactory {
    /// Creates a factory drawing from the provided profile.
    #[must_use]
    pub const fn new(profile: EnemyProfile) -> Self {
        Self { profile }
    }

    /// Draws one set of attributes.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> UnitAttributes {
        UnitAttributes {
            scale: self.profile.scale.at(rng.gen()),
            speed: self.profile.speed.at(rng.gen()),
            path_offset: self.profile.path_offset.at(rng.gen()),
            health: self.profile.health.at(rng.gen()),
        }
    }
}

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    spawn_speed: f32,
    rng_seed: u64,
    profile: EnemyProfile,
}

impl Config {
    /// Creates a configuration from a spawn rate in units per second, a seed
    /// and the attribute profile.
    #[must_use]
    pub const fn new(spawn_speed: f32, rng_seed: u64, profile: EnemyProfile) -> Self {
        Self {
            spawn_speed,
            rng_seed,
            profile,
        }
    }
}

const MAX_SPAWNS_PER_CALL: usize = 1_024;

/// Spawn admitted by the cadence, not yet placed on the board.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpawnRequest {
    /// Position of the chosen spawn point in the board's designation order.
    pub spawn_point: usize,
    /// Attributes of the unit to create.
    pub attributes: UnitAttributes,
}

/// Pure system that turns elapsed time into spawn requests.
#[derive(Debug)]
pub struct Spawning {
    spawn_speed: f32,
    progress: f32,
    rng: ChaCha8Rng,
    factory: EnemyFactory,
}

impl Spawning {
    /// Creates a new spawning system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            spawn_speed: config.spawn_speed,
            progress: 0.0,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
            factory: EnemyFactory::new(config.profile),
        }
    }

    /// Advances the cadence by `elapsed` seconds and emits one request per
    /// whole unit of accumulated spawn progress, at most 1024 per call.
    /// Whole spawns beyond that bound are discarded.
    pub fn handle(&mut self, elapsed: f32, spawn_point_count: usize, out: &mut Vec<SpawnRequest>) {
        if !(self.spawn_speed > 0.0) || !(elapsed > 0.0) {
            return;
        }

        self.progress += self.spawn_speed * elapsed;
        let whole = self.progress.floor();
        self.progress = if whole.is_finite() {
            self.progress - whole
        } else {
            0.0
        };
        if spawn_point_count == 0 {
            log::debug!("dropping {whole} spawns: no spawn points");
            return;
        }

        let count = if whole > MAX_SPAWNS_PER_CALL as f32 {
            log::warn!("capping {whole} pending spawns at {MAX_SPAWNS_PER_CALL}");
            MAX_SPAWNS_PER_CALL
        } else {
            whole as usize
        };
        out.reserve(count);
        for _ in 0..count {
            let spawn_point = self.rng.gen_range(0..spawn_point_count);
            let attributes = self.factory.sample(&mut self.rng);
            out.push(SpawnRequest {
                spawn_point,
                attributes,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_cadence_emits_nothing() {
        let mut spawning = Spawning::new(Config::new(0.0, 1, EnemyProfile::default()));
        let mut out = Vec::new();
        spawning.handle(10.0, 1, &mut out);
        assert!(out.is_empty());
        assert_eq!(spawning.progress, 0.0);
    }

    #[test]
    fn missing_spawn_points_discard_whole_spawns() {
        let mut spawning = Spawning::new(Config::new(1.0, 1, EnemyProfile::default()));
        let mut out = Vec::new();
        spawning.handle(2.5, 0, &mut out);
        assert!(out.is_empty());
        assert!((spawning.progress - 0.5).abs() < 1e-6);
    }

    #[test]
    fn huge_steps_emit_a_bounded_batch() {
        let mut spawning = Spawning::new(Config::new(1.0, 1, EnemyProfile::default()));
        let mut out = Vec::new();
        spawning.handle(3.0e7, 1, &mut out);
        assert_eq!(out.len(), MAX_SPAWNS_PER_CALL);
        assert_eq!(spawning.progress, 0.0);

        out.clear();
        spawning.handle(0.5, 1, &mut out);
        assert!(out.is_empty());
        assert!((spawning.progress - 0.5).abs() < 1e-6);
    }

    #[test]
    fn overflowing_progress_is_reset() {
        let mut spawning = Spawning::new(Config::new(f32::MAX, 1, EnemyProfile::default()));
        let mut out = Vec::new();
        spawning.handle(f32::MAX, 2, &mut out);
        assert_eq!(out.len(), MAX_SPAWNS_PER_CALL);
        assert_eq!(spawning.progress, 0.0);
    }
}
