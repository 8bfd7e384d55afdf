use std::fmt;

use tile_defence_core::Event;

/// Running tally of the events observed during a run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Summary {
    spawned: usize,
    rejected: usize,
    arrived: usize,
    eliminated: usize,
    topology_changes: usize,
    reverted: usize,
}

impl Summary {
    pub(crate) fn record(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::UnitSpawned { .. } => self.spawned += 1,
                Event::SpawnRejected { .. } => self.rejected += 1,
                Event::UnitReachedDestination { .. } => self.arrived += 1,
                Event::UnitEliminated { .. } => self.eliminated += 1,
                Event::TopologyChanged { .. } => self.topology_changes += 1,
                Event::ToggleReverted { tile, attempted } => {
                    log::info!("toggle to {attempted:?} on {tile:?} was reverted");
                    self.reverted += 1;
                }
                Event::TowerPlaced { .. } | Event::TowerRemoved { .. } => {}
            }
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "units spawned:      {}", self.spawned)?;
        writeln!(f, "spawns rejected:    {}", self.rejected)?;
        writeln!(f, "units arrived:      {}", self.arrived)?;
        writeln!(f, "units eliminated:   {}", self.eliminated)?;
        writeln!(f, "topology changes:   {}", self.topology_changes)?;
        write!(f, "toggles reverted:   {}", self.reverted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tile_defence_core::{TileContent, TileCoord, UnitId};

    #[test]
    fn counts_each_event_kind() {
        let mut summary = Summary::default();
        summary.record(&[
            Event::UnitSpawned {
                unit: UnitId::new(0),
                tile: TileCoord::new(0, 0),
            },
            Event::UnitEliminated {
                unit: UnitId::new(0),
            },
            Event::ToggleReverted {
                tile: TileCoord::new(1, 1),
                attempted: TileContent::Wall,
            },
        ]);

        assert_eq!(summary.spawned, 1);
        assert_eq!(summary.eliminated, 1);
        assert_eq!(summary.reverted, 1);
        assert_eq!(summary.arrived, 0);
        assert!(summary.to_string().contains("units eliminated:   1"));
    }
}
