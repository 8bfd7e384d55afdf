#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that keeps every tower locked onto a unit within its range.

use std::collections::BTreeMap;

use glam::Vec2;
use tile_defence_core::{TowerId, TowerSnapshot, UnitId, UnitSnapshot};

const SCALE_RANGE_BONUS: f32 = 0.125;

/// Assignment of a tower to the unit it fires at this tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerTarget {
    /// Tower that holds the target.
    pub tower: TowerId,
    /// Unit being targeted.
    pub unit: UnitId,
    /// World-space centre of the tower.
    pub tower_position: Vec2,
    /// World-space position of the unit.
    pub unit_position: Vec2,
}

/// Tower targeting system that remembers each tower's held target.
#[derive(Debug, Default)]
pub struct TowerTargeting {
    held: BTreeMap<TowerId, UnitId>,
}

impl TowerTargeting {
    /// Creates a targeting system without any held targets.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-validates held targets and acquires new ones.
    ///
    /// A held target survives while it is still present, targetable and
    /// within range; otherwise the nearest eligible unit is chosen, ties going
    /// to the lower unit identifier. The output buffer is cleared first.
    pub fn handle(
        &mut self,
        towers: &[TowerSnapshot],
        units: &[UnitSnapshot],
        out: &mut Vec<TowerTarget>,
    ) {
        out.clear();
        self.held
            .retain(|tower, _| towers.iter().any(|snapshot| snapshot.id == *tower));

        for tower in towers {
            let range = tower.kind.targeting_range();
            let tracked = self
                .held
                .get(&tower.id)
                .and_then(|held| units.iter().find(|unit| unit.id == *held))
                .filter(|unit| in_range(tower.position, range, unit));

            let Some(unit) = tracked.or_else(|| nearest(tower.position, range, units)) else {
                let _ = self.held.remove(&tower.id);
                continue;
            };

            let _ = self.held.insert(tower.id, unit.id);
            out.push(TowerTarget {
                tower: tower.id,
                unit: unit.id,
                tower_position: tower.position,
                unit_position: unit.position,
            });
        }
    }

    /// Unit currently held by `tower`, if any.
    #[must_use]
    pub fn target_of(&self, tower: TowerId) -> Option<UnitId> {
        self.held.get(&tower).copied()
    }
}

fn in_range(origin: Vec2, range: f32, unit: &UnitSnapshot) -> bool {
    let reach = range + SCALE_RANGE_BONUS * unit.scale;
    unit.targetable && origin.distance_squared(unit.position) < reach * reach
}

fn nearest(origin: Vec2, range: f32, units: &[UnitSnapshot]) -> Option<&UnitSnapshot> {
    units
        .iter()
        .filter(|unit| in_range(origin, range, unit))
        .min_by(|a, b| {
            let da = origin.distance_squared(a.position);
            let db = origin.distance_squared(b.position);
            da.total_cmp(&db).then(a.id.cmp(&b.id))
        })
}
