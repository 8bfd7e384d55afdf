#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Tick-driven orchestration of the board, units, spawning and towers.
//!
//! Every [`Game::tick`] runs the same fixed sequence: spawn admission, unit
//! updates, queued topology commands and finally tower targeting with damage.
//! Everything observable is reported through [`Event`] values collected in a
//! queue that callers drain after each tick.

mod config;

pub use config::{ConfigError, EnemyConfig, GameConfig, LayoutConfig};

use std::collections::{BTreeMap, VecDeque};

use tile_defence_core::{
    Command, Event, Handle, Pool, PoolId, TickOutcome, TileCoord, TowerKind, UnitId,
};
use tile_defence_system_movement::{AnimationTimings, Unit};
use tile_defence_system_spawning::{Config as SpawningConfig, SpawnRequest, Spawning};
use tile_defence_system_tower_targeting::{TowerTarget, TowerTargeting};
use tile_defence_world::{self as world, query, Board};

const UNIT_POOL: PoolId = PoolId::new(0);

/// Authoritative simulation state for a single run.
#[derive(Debug)]
pub struct Game {
    board: Board,
    units: Pool<Unit>,
    spawning: Spawning,
    targeting: TowerTargeting,
    timings: AnimationTimings,
    pending: VecDeque<Command>,
    events: Vec<Event>,
    spawn_requests: Vec<SpawnRequest>,
    targets: Vec<TowerTarget>,
    next_unit_id: u32,
    elapsed: f32,
}

impl Game {
    /// Validates the configuration, builds the board and applies the layout.
    ///
    /// Layout toggles that fail validation are reverted like any other toggle
    /// and surface as [`Event::ToggleReverted`] in the first drained batch.
    pub fn new(config: &GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let board = Board::new(&config.board)?;
        let enemies = config.enemies;

        let mut game = Self {
            board,
            units: Pool::new(UNIT_POOL),
            spawning: Spawning::new(SpawningConfig::new(
                enemies.spawn_speed,
                enemies.seed,
                enemies.profile,
            )),
            targeting: TowerTargeting::new(),
            timings: config.animation,
            pending: VecDeque::new(),
            events: Vec::new(),
            spawn_requests: Vec::new(),
            targets: Vec::new(),
            next_unit_id: 0,
            elapsed: 0.0,
        };

        let layout = &config.layout;
        let commands = layout
            .walls
            .iter()
            .map(|&tile| Command::ToggleWall { tile })
            .chain(
                layout
                    .destinations
                    .iter()
                    .map(|&tile| Command::ToggleDestination { tile }),
            )
            .chain(
                layout
                    .spawn_points
                    .iter()
                    .map(|&tile| Command::ToggleSpawnPoint { tile }),
            )
            .chain(layout.towers.iter().map(|&tile| Command::ToggleTower {
                tile,
                kind: TowerKind::Laser,
            }));
        for command in commands {
            world::apply(&mut game.board, command, &mut game.events);
        }

        log::info!(
            "game ready on a {}x{} board with {} spawn point(s)",
            game.board.width(),
            game.board.height(),
            game.board.spawn_point_count()
        );
        Ok(game)
    }

    /// Queues a topology command for the next tick.
    pub fn submit(&mut self, command: Command) {
        self.pending.push_back(command);
    }

    /// Advances the simulation by `elapsed` seconds.
    pub fn tick(&mut self, elapsed: f32) {
        self.elapsed += elapsed;
        self.admit_spawns(elapsed);
        self.update_units(elapsed);
        while let Some(command) = self.pending.pop_front() {
            world::apply(&mut self.board, command, &mut self.events);
        }
        self.fire_towers(elapsed);
    }

    /// Removes and returns every event emitted since the previous drain.
    pub fn drain_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    /// Board the game runs on.
    #[must_use]
    pub const fn board(&self) -> &Board {
        &self.board
    }

    /// Live units in pool order.
    pub fn units(&self) -> impl Iterator<Item = &Unit> {
        self.units.iter().map(|(_, unit)| unit)
    }

    /// Number of live units.
    #[must_use]
    pub const fn unit_count(&self) -> usize {
        self.units.len()
    }

    /// Tower assignments computed by the most recent tick.
    #[must_use]
    pub fn tower_targets(&self) -> &[TowerTarget] {
        &self.targets
    }

    /// Total simulated time in seconds.
    #[must_use]
    pub const fn elapsed(&self) -> f32 {
        self.elapsed
    }

    fn admit_spawns(&mut self, elapsed: f32) {
        self.spawn_requests.clear();
        self.spawning.handle(
            elapsed,
            self.board.spawn_point_count(),
            &mut self.spawn_requests,
        );

        for request in &self.spawn_requests {
            let Some(tile) = self.board.spawn_point(request.spawn_point) else {
                continue;
            };
            let coord = self
                .board
                .tile(tile)
                .map_or(TileCoord::new(0, 0), |tile| tile.coord());
            let id = UnitId::new(self.next_unit_id);
            match Unit::spawn_on(id, request.attributes, self.timings, &self.board, tile) {
                Ok(unit) => {
                    self.next_unit_id = self.next_unit_id.wrapping_add(1);
                    let _ = self.units.acquire(unit);
                    self.events.push(Event::UnitSpawned {
                        unit: id,
                        tile: coord,
                    });
                }
                Err(_) => self.events.push(Event::SpawnRejected { tile: coord }),
            }
        }
    }

    fn update_units(&mut self, elapsed: f32) {
        for handle in self.units.handles() {
            let Some(unit) = self.units.get_mut(handle) else {
                continue;
            };
            if unit.tick(&self.board, elapsed, &mut self.events) == TickOutcome::Removed {
                if let Err(violation) = self.units.release(handle) {
                    log::warn!("failed to release unit: {violation}");
                }
            }
        }
    }

    fn fire_towers(&mut self, elapsed: f32) {
        let towers = query::tower_view(&self.board);
        let snapshots: Vec<_> = self.units.iter().map(|(_, unit)| unit.snapshot()).collect();
        self.targeting.handle(&towers, &snapshots, &mut self.targets);
        if self.targets.is_empty() {
            return;
        }

        let handles: BTreeMap<UnitId, Handle> = self
            .units
            .iter()
            .map(|(handle, unit)| (unit.id(), handle))
            .collect();
        for target in &self.targets {
            let Some(kind) = towers
                .iter()
                .find(|tower| tower.id == target.tower)
                .map(|tower| tower.kind)
            else {
                continue;
            };
            let Some(unit) = handles
                .get(&target.unit)
                .and_then(|handle| self.units.get_mut(*handle))
            else {
                continue;
            };
            if let Err(violation) = unit.apply_damage(kind.damage_per_second() * elapsed) {
                log::warn!("tower {} misfired: {violation}", target.tower.get());
            }
        }
    }
}
