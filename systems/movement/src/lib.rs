#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Continuous-time movement state machine for units following the flow field.
//!
//! A unit travels segment by segment: a straight run to the exit point of its
//! current tile, a quarter-circle arc around the inner tile corner, or a
//! U-turn around the entry edge. Each segment is parameterised by a progress
//! value in `0.0..1.0` that advances at `progress_factor` per second, where the
//! factor is the unit's speed divided by the segment's path length.

use std::f32::consts::PI;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use tile_defence_core::{
    ContractViolation, Direction, DirectionChange, Event, FlowFieldView, TickOutcome, TileIndex,
    UnitId, UnitSnapshot,
};

const DEFAULT_INTRO_SECONDS: f32 = 1.0;
const DEFAULT_OUTRO_SECONDS: f32 = 1.0;
const MIN_TURN_AROUND_RADIUS: f32 = 0.2;

/// Lifecycle stage of a unit, observed by animation adapters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UnitState {
    /// Spawn-in animation; the unit waits on its spawn tile.
    Intro,
    /// Locomotion along the flow field.
    Moving,
    /// Arrival animation on a destination tile.
    Outro,
    /// Health dropped to zero; the unit is about to be removed.
    Dying,
}

impl UnitState {
    /// Reports whether the lifecycle permits moving from `self` to `next`.
    #[must_use]
    pub const fn can_transition_to(self, next: UnitState) -> bool {
        matches!(
            (self, next),
            (Self::Intro, Self::Moving)
                | (Self::Intro, Self::Dying)
                | (Self::Moving, Self::Moving)
                | (Self::Moving, Self::Outro)
                | (Self::Moving, Self::Dying)
        )
    }

    /// Reports whether no further transition exists.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Outro | Self::Dying)
    }
}

/// Durations of the timed lifecycle stages, in seconds.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationTimings {
    /// Time spent in [`UnitState::Intro`] before locomotion starts.
    pub intro: f32,
    /// Time spent in [`UnitState::Outro`] before the unit is removed.
    pub outro: f32,
}

impl Default for AnimationTimings {
    fn default() -> Self {
        Self {
            intro: DEFAULT_INTRO_SECONDS,
            outro: DEFAULT_OUTRO_SECONDS,
        }
    }
}

/// Per-unit parameters sampled when the unit is created.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UnitAttributes {
    /// Visual scale; also widens the hit radius used by towers.
    pub scale: f32,
    /// Travel speed in tiles per second along the segment path.
    pub speed: f32,
    /// Lateral lane displacement, strictly inside `-0.5..0.5`.
    pub path_offset: f32,
    /// Starting health.
    pub health: f32,
}

/// Single unit walking the flow field.
#[derive(Clone, Debug)]
pub struct Unit {
    id: UnitId,
    attributes: UnitAttributes,
    timings: AnimationTimings,
    health: f32,
    state: UnitState,
    state_elapsed: f32,
    tile_from: TileIndex,
    tile_to: Option<TileIndex>,
    position_from: Vec2,
    position_to: Vec2,
    pivot: Vec2,
    lateral: f32,
    progress: f32,
    progress_factor: f32,
    direction: Direction,
    direction_change: DirectionChange,
    angle_from: f32,
    angle_to: f32,
    angle: f32,
}

impl Unit {
    /// Places a new unit on `tile`, heading for the tile's next hop.
    ///
    /// Tiles without a route are rejected so no unit is ever created without
    /// somewhere to go.
    pub fn spawn_on<V: FlowFieldView>(
        id: UnitId,
        attributes: UnitAttributes,
        timings: AnimationTimings,
        view: &V,
        tile: TileIndex,
    ) -> Result<Self, ContractViolation> {
        let route = view.next_tile_on_path(tile).and_then(|next| {
            Some((
                next,
                view.path_direction(tile)?,
                view.tile_position(tile)?,
                view.exit_point(tile)?,
            ))
        });
        let Some((next, direction, centre, exit)) = route else {
            log::warn!("refusing to spawn unit {} on {tile:?}: no route", id.get());
            return Err(ContractViolation::NoRoute { tile });
        };

        let angle = direction.angle();
        Ok(Self {
            id,
            attributes,
            timings,
            health: attributes.health,
            state: UnitState::Intro,
            state_elapsed: 0.0,
            tile_from: tile,
            tile_to: Some(next),
            position_from: centre,
            position_to: exit,
            pivot: centre,
            lateral: attributes.path_offset,
            progress: 0.0,
            progress_factor: attributes.speed,
            direction,
            direction_change: DirectionChange::None,
            angle_from: angle,
            angle_to: angle,
            angle,
        })
    }

    /// Advances the unit by `elapsed` seconds.
    ///
    /// Returns [`TickOutcome::Removed`] once the unit died or finished its
    /// arrival animation; the caller then releases it.
    pub fn tick<V: FlowFieldView>(
        &mut self,
        view: &V,
        elapsed: f32,
        events: &mut Vec<Event>,
    ) -> TickOutcome {
        match self.state {
            UnitState::Dying => return TickOutcome::Removed,
            UnitState::Outro => {
                self.state_elapsed += elapsed;
                return if self.state_elapsed >= self.timings.outro {
                    TickOutcome::Removed
                } else {
                    TickOutcome::Alive
                };
            }
            UnitState::Intro | UnitState::Moving => {}
        }

        if self.health <= 0.0 {
            self.enter(UnitState::Dying);
            events.push(Event::UnitEliminated { unit: self.id });
            return TickOutcome::Removed;
        }

        let mut elapsed = elapsed;
        if self.state == UnitState::Intro {
            self.state_elapsed += elapsed;
            if self.state_elapsed < self.timings.intro {
                return TickOutcome::Alive;
            }
            elapsed = self.state_elapsed - self.timings.intro;
            self.enter(UnitState::Moving);
        }

        self.state_elapsed += elapsed;
        self.progress += elapsed * self.progress_factor;
        while self.progress >= 1.0 {
            if self.tile_to.is_none() {
                self.pivot = self.position_to;
                self.progress = 1.0;
                self.enter(UnitState::Outro);
                events.push(Event::UnitReachedDestination { unit: self.id });
                return TickOutcome::Alive;
            }
            self.progress = (self.progress - 1.0) / self.progress_factor;
            self.prepare_next_segment(view);
            self.progress *= self.progress_factor;
        }

        self.update_pose();
        TickOutcome::Alive
    }

    /// Subtracts `amount` from the unit's health.
    pub fn apply_damage(&mut self, amount: f32) -> Result<(), ContractViolation> {
        if !(amount >= 0.0) {
            log::warn!("unit {} rejected damage {amount}", self.id.get());
            return Err(ContractViolation::NegativeDamage { amount });
        }
        self.health -= amount;
        Ok(())
    }

    fn enter(&mut self, next: UnitState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal unit transition {:?} -> {next:?}",
            self.state
        );
        self.state = next;
        self.state_elapsed = 0.0;
    }

    fn prepare_next_segment<V: FlowFieldView>(&mut self, view: &V) {
        let Some(current) = self.tile_to else {
            return;
        };
        self.tile_from = current;
        self.position_from = self.position_to;

        let hop = view.next_tile_on_path(current).and_then(|next| {
            Some((
                next,
                view.path_direction(current)?,
                view.exit_point(current)?,
            ))
        });
        let Some((next, direction, exit)) = hop else {
            self.tile_to = None;
            self.prepare_outro(view);
            return;
        };

        self.tile_to = Some(next);
        self.position_to = exit;
        self.direction_change = self.direction.direction_change_to(direction);
        self.direction = direction;
        self.angle_from = self.angle_to;

        let offset = self.attributes.path_offset;
        let speed = self.attributes.speed;
        match self.direction_change {
            DirectionChange::None => {
                self.angle_to = direction.angle();
                self.lateral = offset;
                self.progress_factor = speed;
            }
            DirectionChange::TurnRight => {
                self.angle_to = self.angle_from + 90.0;
                self.lateral = offset - 0.5;
                self.pivot = self.position_from + direction.half_vector();
                self.progress_factor = speed / quarter_turn_length(offset);
            }
            DirectionChange::TurnLeft => {
                self.angle_to = self.angle_from - 90.0;
                self.lateral = offset + 0.5;
                self.pivot = self.position_from + direction.half_vector();
                self.progress_factor = speed / quarter_turn_length(offset);
            }
            DirectionChange::TurnAround => {
                self.angle_to = self.angle_from + if offset < 0.0 { 180.0 } else { -180.0 };
                self.lateral = offset;
                self.pivot = self.position_from;
                self.progress_factor =
                    speed / (PI * offset.abs().max(MIN_TURN_AROUND_RADIUS));
            }
        }
    }

    fn prepare_outro<V: FlowFieldView>(&mut self, view: &V) {
        self.position_to = view
            .tile_position(self.tile_from)
            .unwrap_or(self.position_from);
        self.direction_change = DirectionChange::None;
        self.angle_to = self.direction.angle();
        self.lateral = self.attributes.path_offset;
        self.progress_factor = self.attributes.speed;
    }

    fn update_pose(&mut self) {
        if self.direction_change == DirectionChange::None {
            self.pivot = self.position_from.lerp(self.position_to, self.progress);
            self.angle = self.angle_to;
        } else {
            self.angle = self.angle_from + (self.angle_to - self.angle_from) * self.progress;
        }
    }

    /// Identifier assigned at spawn.
    #[must_use]
    pub const fn id(&self) -> UnitId {
        self.id
    }

    /// Current lifecycle stage.
    #[must_use]
    pub const fn state(&self) -> UnitState {
        self.state
    }

    /// Normalised progress through the current lifecycle stage.
    ///
    /// Timed stages report elapsed time over their duration, locomotion
    /// reports progress through the current segment.
    #[must_use]
    pub fn state_progress(&self) -> f32 {
        let fraction = |elapsed: f32, duration: f32| {
            if duration > 0.0 {
                (elapsed / duration).min(1.0)
            } else {
                1.0
            }
        };
        match self.state {
            UnitState::Intro => fraction(self.state_elapsed, self.timings.intro),
            UnitState::Moving => self.progress.clamp(0.0, 1.0),
            UnitState::Outro => fraction(self.state_elapsed, self.timings.outro),
            UnitState::Dying => 1.0,
        }
    }

    /// World-space position including the lane offset.
    #[must_use]
    pub fn position(&self) -> Vec2 {
        self.pivot + right_of(self.angle) * self.lateral
    }

    /// Facing in degrees, clockwise from North.
    #[must_use]
    pub const fn rotation(&self) -> f32 {
        self.angle
    }

    /// Travel direction of the current segment.
    #[must_use]
    pub const fn direction(&self) -> Direction {
        self.direction
    }

    /// Turn performed by the current segment.
    #[must_use]
    pub const fn direction_change(&self) -> DirectionChange {
        self.direction_change
    }

    /// Progress through the current segment.
    #[must_use]
    pub const fn progress(&self) -> f32 {
        self.progress
    }

    /// Rate at which segment progress grows per second.
    #[must_use]
    pub const fn progress_factor(&self) -> f32 {
        self.progress_factor
    }

    /// Tile the current segment starts on.
    #[must_use]
    pub const fn tile_from(&self) -> TileIndex {
        self.tile_from
    }

    /// Tile the unit is heading for, `None` on the final segment.
    #[must_use]
    pub const fn tile_to(&self) -> Option<TileIndex> {
        self.tile_to
    }

    /// Remaining health.
    #[must_use]
    pub const fn health(&self) -> f32 {
        self.health
    }

    /// Attributes the unit was created with.
    #[must_use]
    pub const fn attributes(&self) -> UnitAttributes {
        self.attributes
    }

    /// Captures the unit for targeting queries.
    #[must_use]
    pub fn snapshot(&self) -> UnitSnapshot {
        UnitSnapshot {
            id: self.id,
            position: self.position(),
            scale: self.attributes.scale,
            targetable: !self.state.is_terminal() && self.health > 0.0,
        }
    }
}

fn quarter_turn_length(path_offset: f32) -> f32 {
    PI * 0.5 * (0.5 - path_offset)
}

fn right_of(angle: f32) -> Vec2 {
    let (sin, cos) = angle.to_radians().sin_cos();
    Vec2::new(cos, -sin)
}
