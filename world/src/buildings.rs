//! Authoritative building state management utilities.

use std::sync::Arc;

use city_builder_core::{BuildingId, BuildingSnapshot, BuildingSpec, CellCoord, CellRect};

/// A building placed in the city.
#[derive(Clone, Debug)]
pub(crate) struct Building {
    /// Identifier allocated by the registry.
    pub(crate) id: BuildingId,
    /// Catalog entry the building was constructed from.
    pub(crate) spec: Arc<BuildingSpec>,
    /// Upper-left cell of the footprint.
    pub(crate) origin: CellCoord,
    /// Whether the building contributed during the latest recomputation.
    pub(crate) operational: bool,
}

impl Building {
    pub(crate) fn region(&self) -> CellRect {
        self.spec.footprint_at(self.origin)
    }

    pub(crate) fn snapshot(&self) -> BuildingSnapshot {
        BuildingSnapshot {
            id: self.id,
            kind: self.spec.id.clone(),
            region: self.region(),
            operational: self.operational,
        }
    }
}

/// Buildings in placement order plus identifier allocation.
#[derive(Clone, Debug)]
pub(crate) struct BuildingRegistry {
    entries: Vec<Building>,
    next_building_id: BuildingId,
}

impl BuildingRegistry {
    /// Creates an empty registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_building_id: BuildingId::new(0),
        }
    }

    /// Appends a building under a freshly allocated identifier.
    pub(crate) fn insert(
        &mut self,
        spec: Arc<BuildingSpec>,
        origin: CellCoord,
        operational: bool,
    ) -> &Building {
        let id = self.next_building_id;
        self.next_building_id = BuildingId::new(id.get().wrapping_add(1));
        let index = self.entries.len();
        self.entries.push(Building {
            id,
            spec,
            origin,
            operational,
        });
        &self.entries[index]
    }

    /// Position of the first building, in placement order, whose footprint covers `cell`.
    pub(crate) fn position_covering(&self, cell: CellCoord) -> Option<usize> {
        self.entries
            .iter()
            .position(|building| building.region().contains(cell))
    }

    pub(crate) fn remove(&mut self, position: usize) -> Building {
        self.entries.remove(position)
    }

    pub(crate) fn get(&self, id: BuildingId) -> Option<&Building> {
        self.entries.iter().find(|building| building.id == id)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Building> {
        self.entries.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Building> {
        self.entries.iter_mut()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
