//! Authoritative tower bookkeeping for the board.

use std::collections::BTreeMap;

use tile_defence_core::{TileIndex, TowerId, TowerKind};

/// Tower stored inside the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct TowerState {
    /// Identifier allocated by the board.
    pub(crate) id: TowerId,
    /// Kind of tower that was constructed.
    pub(crate) kind: TowerKind,
    /// Tile occupied by the tower.
    pub(crate) tile: TileIndex,
}

/// Registry that stores towers and manages identifier allocation.
#[derive(Clone, Debug)]
pub(crate) struct TowerRegistry {
    entries: BTreeMap<TowerId, TowerState>,
    next_tower_id: TowerId,
}

impl TowerRegistry {
    /// Creates an empty tower registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_tower_id: TowerId::new(0),
        }
    }

    pub(crate) fn insert(&mut self, kind: TowerKind, tile: TileIndex) -> TowerId {
        let id = self.next_tower_id;
        self.next_tower_id = TowerId::new(id.get().wrapping_add(1));
        let _ = self.entries.insert(id, TowerState { id, kind, tile });
        id
    }

    pub(crate) fn remove_at(&mut self, tile: TileIndex) -> Option<TowerId> {
        let id = self.tower_at(tile)?;
        let _ = self.entries.remove(&id);
        Some(id)
    }

    pub(crate) fn tower_at(&self, tile: TileIndex) -> Option<TowerId> {
        self.entries
            .values()
            .find(|tower| tower.tile == tile)
            .map(|tower| tower.id)
    }

    /// Towers in identifier order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &TowerState> {
        self.entries.values()
    }
}
