use std::f32::consts::PI;

use glam::Vec2;
use tile_defence_core::{
    ContractViolation, Direction, DirectionChange, Event, FlowFieldView, TickOutcome, TileCoord,
    TileIndex, UnitId,
};
use tile_defence_system_movement::{AnimationTimings, Unit, UnitAttributes, UnitState};
use tile_defence_world::{Board, Tile};

const EPSILON: f32 = 1e-5;

/// Hand-built flow field for exercising specific turn sequences.
struct ScriptedField {
    tiles: Vec<ScriptedTile>,
}

struct ScriptedTile {
    position: Vec2,
    hop: Option<(usize, Direction)>,
}

impl ScriptedField {
    /// Builds a route starting at the origin that follows `directions` one tile
    /// at a time and ends on a destination.
    fn route(directions: &[Direction]) -> Self {
        let mut tiles = Vec::with_capacity(directions.len() + 1);
        let mut position = Vec2::ZERO;
        for (step, direction) in directions.iter().enumerate() {
            tiles.push(ScriptedTile {
                position,
                hop: Some((step + 1, *direction)),
            });
            position += direction.unit_vector();
        }
        tiles.push(ScriptedTile {
            position,
            hop: None,
        });
        Self { tiles }
    }
}

impl FlowFieldView for ScriptedField {
    fn next_tile_on_path(&self, tile: TileIndex) -> Option<TileIndex> {
        let (next, _) = self.tiles.get(tile.get())?.hop?;
        Some(TileIndex::new(next))
    }

    fn path_direction(&self, tile: TileIndex) -> Option<Direction> {
        self.tiles.get(tile.get())?.hop.map(|(_, direction)| direction)
    }

    fn exit_point(&self, tile: TileIndex) -> Option<Vec2> {
        let tile = self.tiles.get(tile.get())?;
        Some(match tile.hop {
            Some((_, direction)) => tile.position + direction.half_vector(),
            None => tile.position,
        })
    }

    fn tile_position(&self, tile: TileIndex) -> Option<Vec2> {
        self.tiles.get(tile.get()).map(|tile| tile.position)
    }
}

fn attributes(speed: f32, path_offset: f32) -> UnitAttributes {
    UnitAttributes {
        scale: 1.0,
        speed,
        path_offset,
        health: 50.0,
    }
}

fn instant() -> AnimationTimings {
    AnimationTimings {
        intro: 0.0,
        outro: 0.0,
    }
}

fn spawn<V: FlowFieldView>(view: &V, attributes: UnitAttributes) -> Unit {
    Unit::spawn_on(UnitId::new(1), attributes, instant(), view, TileIndex::new(0))
        .expect("spawn tile has a route")
}

fn assert_close(actual: Vec2, expected: Vec2) {
    assert!(
        (actual - expected).length() < EPSILON,
        "expected {expected:?}, got {actual:?}"
    );
}

#[test]
fn straight_segments_pass_their_midpoints() {
    let board = Board::initialize(5, 1).expect("valid board");
    let spawn = board.spawn_point(0).expect("seeded spawn point");
    let mut unit = Unit::spawn_on(UnitId::new(7), attributes(1.0, 0.0), instant(), &board, spawn)
        .expect("spawn tile has a route");
    let mut events = Vec::new();

    assert_eq!(unit.tick(&board, 0.5, &mut events), TickOutcome::Alive);
    assert_close(unit.position(), Vec2::new(-1.75, 0.0));

    assert_eq!(unit.tick(&board, 0.5, &mut events), TickOutcome::Alive);
    assert_eq!(unit.tile_from(), TileIndex::new(1));
    assert_eq!(unit.tile_to(), Some(TileIndex::new(2)));

    assert_eq!(unit.tick(&board, 0.5, &mut events), TickOutcome::Alive);
    assert_close(unit.position(), Vec2::new(-1.0, 0.0));
    assert!((unit.rotation() - 90.0).abs() < EPSILON);
    assert!(events.is_empty());
}

#[test]
fn lane_offset_shifts_unit_to_the_right_of_travel() {
    let field = ScriptedField::route(&[Direction::East, Direction::East]);
    let mut unit = spawn(&field, attributes(1.0, 0.25));
    let mut events = Vec::new();

    let _ = unit.tick(&field, 0.25, &mut events);
    assert_close(unit.position(), Vec2::new(0.125, -0.25));
}

#[test]
fn overflow_carries_into_the_next_segment() {
    let field = ScriptedField::route(&[Direction::North, Direction::North, Direction::North]);
    let mut unit = spawn(&field, attributes(2.0, 0.0));
    let mut events = Vec::new();

    let _ = unit.tick(&field, 0.75, &mut events);
    assert_eq!(unit.tile_from(), TileIndex::new(1));
    assert!((unit.progress() - 0.5).abs() < EPSILON);
    assert_close(unit.position(), Vec2::new(0.0, 1.0));
}

#[test]
fn right_turns_sweep_around_the_inner_corner() {
    let field = ScriptedField::route(&[Direction::North, Direction::East]);
    let mut unit = spawn(&field, attributes(1.0, 0.0));
    let mut events = Vec::new();

    let _ = unit.tick(&field, 1.0, &mut events);
    assert_eq!(unit.direction_change(), DirectionChange::TurnRight);
    assert_eq!(unit.direction(), Direction::East);
    assert_close(unit.position(), Vec2::new(0.0, 0.5));
    assert!((unit.progress_factor() - 4.0 / PI).abs() < EPSILON);

    let _ = unit.tick(&field, PI / 8.0, &mut events);
    let pivot = Vec2::new(0.5, 0.5);
    assert!(((unit.position() - pivot).length() - 0.5).abs() < EPSILON);
    assert!((unit.rotation() - 45.0).abs() < 1e-3);
}

#[test]
fn left_turns_sweep_counter_clockwise() {
    let field = ScriptedField::route(&[Direction::North, Direction::West]);
    let mut unit = spawn(&field, attributes(1.0, 0.0));
    let mut events = Vec::new();

    let _ = unit.tick(&field, 1.0, &mut events);
    assert_eq!(unit.direction_change(), DirectionChange::TurnLeft);
    assert_close(unit.position(), Vec2::new(0.0, 0.5));

    let _ = unit.tick(&field, PI / 8.0, &mut events);
    let pivot = Vec2::new(-0.5, 0.5);
    assert!(((unit.position() - pivot).length() - 0.5).abs() < EPSILON);
    assert!((unit.rotation() + 45.0).abs() < 1e-3);
}

#[test]
fn left_and_right_turns_take_equal_time() {
    let right = ScriptedField::route(&[Direction::North, Direction::East]);
    let left = ScriptedField::route(&[Direction::North, Direction::West]);
    let mut events = Vec::new();

    for offset in [-0.25, 0.0, 0.2] {
        let mut turning_right = spawn(&right, attributes(2.0, offset));
        let mut turning_left = spawn(&left, attributes(2.0, offset));
        let _ = turning_right.tick(&right, 0.5, &mut events);
        let _ = turning_left.tick(&left, 0.5, &mut events);

        assert_eq!(turning_right.direction_change(), DirectionChange::TurnRight);
        assert_eq!(turning_left.direction_change(), DirectionChange::TurnLeft);
        assert!(
            (turning_right.progress_factor() - turning_left.progress_factor()).abs() < EPSILON,
            "factors diverge for offset {offset}"
        );
    }
}

#[test]
fn u_turns_pick_their_side_from_the_lane_offset() {
    let field = ScriptedField::route(&[Direction::North, Direction::South]);
    let mut events = Vec::new();

    let mut left_lane = spawn(&field, attributes(1.0, -0.3));
    let _ = left_lane.tick(&field, 1.0, &mut events);
    assert_eq!(left_lane.direction_change(), DirectionChange::TurnAround);
    assert!((left_lane.progress_factor() - 1.0 / (PI * 0.3)).abs() < EPSILON);
    let _ = left_lane.tick(&field, 0.15 * PI, &mut events);
    assert!((left_lane.rotation() - 90.0).abs() < 1e-3);

    let mut centre_lane = spawn(&field, attributes(1.0, 0.0));
    let _ = centre_lane.tick(&field, 1.0, &mut events);
    assert!((centre_lane.progress_factor() - 1.0 / (PI * 0.2)).abs() < EPSILON);
    let _ = centre_lane.tick(&field, 0.1 * PI, &mut events);
    assert!((centre_lane.rotation() + 90.0).abs() < 1e-3);
}

#[test]
fn arrival_plays_the_outro_before_removal() {
    let board = Board::initialize(3, 1).expect("valid board");
    let spawn = board.spawn_point(0).expect("seeded spawn point");
    let timings = AnimationTimings {
        intro: 0.0,
        outro: 0.5,
    };
    let mut unit = Unit::spawn_on(UnitId::new(3), attributes(1.0, 0.0), timings, &board, spawn)
        .expect("spawn tile has a route");
    let mut events = Vec::new();

    assert_eq!(unit.tick(&board, 1.0, &mut events), TickOutcome::Alive);
    assert_eq!(unit.tile_to(), None);
    assert_eq!(unit.tick(&board, 1.0, &mut events), TickOutcome::Alive);
    assert_eq!(unit.state(), UnitState::Outro);
    assert_eq!(
        events,
        vec![Event::UnitReachedDestination {
            unit: UnitId::new(3)
        }]
    );
    assert_close(unit.position(), Vec2::ZERO);
    assert!(!unit.snapshot().targetable);

    assert_eq!(unit.tick(&board, 0.25, &mut events), TickOutcome::Alive);
    assert!((unit.state_progress() - 0.5).abs() < EPSILON);
    assert_eq!(unit.tick(&board, 0.25, &mut events), TickOutcome::Removed);
}

#[test]
fn intro_holds_the_unit_on_its_spawn_tile() {
    let field = ScriptedField::route(&[Direction::East, Direction::East]);
    let timings = AnimationTimings {
        intro: 0.5,
        outro: 0.0,
    };
    let mut unit = Unit::spawn_on(
        UnitId::new(1),
        attributes(1.0, 0.0),
        timings,
        &field,
        TileIndex::new(0),
    )
    .expect("spawn tile has a route");
    let mut events = Vec::new();

    let _ = unit.tick(&field, 0.25, &mut events);
    assert_eq!(unit.state(), UnitState::Intro);
    assert!((unit.state_progress() - 0.5).abs() < EPSILON);
    assert_close(unit.position(), Vec2::ZERO);

    let _ = unit.tick(&field, 0.5, &mut events);
    assert_eq!(unit.state(), UnitState::Moving);
    assert!((unit.progress() - 0.25).abs() < EPSILON);
}

#[test]
fn lethal_damage_removes_without_moving() {
    let field = ScriptedField::route(&[Direction::East, Direction::East]);
    let mut unit = spawn(&field, attributes(1.0, 0.0));
    let mut events = Vec::new();
    let _ = unit.tick(&field, 0.25, &mut events);
    let before = unit.position();

    unit.apply_damage(50.0).expect("damage is non-negative");
    assert_eq!(unit.tick(&field, 0.25, &mut events), TickOutcome::Removed);
    assert_eq!(unit.state(), UnitState::Dying);
    assert_eq!(unit.position(), before);
    assert_eq!(
        events,
        vec![Event::UnitEliminated {
            unit: UnitId::new(1)
        }]
    );
}

#[test]
fn negative_damage_is_rejected() {
    let field = ScriptedField::route(&[Direction::East]);
    let mut unit = spawn(&field, attributes(1.0, 0.0));

    assert_eq!(
        unit.apply_damage(-1.0),
        Err(ContractViolation::NegativeDamage { amount: -1.0 })
    );
    assert_eq!(unit.health(), 50.0);
}

#[test]
fn spawning_on_a_destination_is_rejected() {
    let board = Board::initialize(3, 3).expect("valid board");
    let centre = board
        .tile_index(TileCoord::new(1, 1))
        .expect("coordinate lies on the board");

    let result = Unit::spawn_on(
        UnitId::new(1),
        attributes(1.0, 0.0),
        instant(),
        &board,
        centre,
    );
    assert_eq!(
        result.err(),
        Some(ContractViolation::NoRoute { tile: centre })
    );
}

#[test]
fn units_cross_a_walled_board_and_stay_inside_it() {
    let mut board = Board::initialize(7, 7).expect("valid board");
    for (x, y) in [(1, 0), (1, 1), (1, 2), (3, 4), (3, 5), (3, 6), (5, 2)] {
        let wall = board
            .tile_index(TileCoord::new(x, y))
            .expect("coordinate lies on the board");
        let _ = board.toggle_wall(wall);
    }
    let spawn = board.spawn_point(0).expect("seeded spawn point");
    let route_length = board
        .tile(spawn)
        .and_then(Tile::distance)
        .expect("spawn point is routed");

    let mut unit = Unit::spawn_on(UnitId::new(9), attributes(1.0, 0.2), instant(), &board, spawn)
        .expect("spawn tile has a route");
    let mut events = Vec::new();
    let mut ticks = 0;
    while unit.state() == UnitState::Moving || unit.state() == UnitState::Intro {
        let _ = unit.tick(&board, 0.05, &mut events);
        let position = unit.position();
        assert!(position.x.abs() <= 3.5 && position.y.abs() <= 3.5);
        ticks += 1;
        assert!(ticks < 20 * 4 * (route_length as usize + 1), "unit never arrived");
    }

    assert_eq!(
        events,
        vec![Event::UnitReachedDestination {
            unit: UnitId::new(9)
        }]
    );
}
