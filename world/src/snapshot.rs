//! Serialisable capture of the persistent part of a city.
//!
//! Only stock resources, the held rank and the building list are captured.
//! Operational flags and every derived statistic are recomputed on load.

use std::sync::Arc;

use city_builder_catalog::Catalog;
use city_builder_core::{BuildingTypeId, CellCoord, RankLevel, SimulationConfig};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{query, City};

/// Building entry captured within a city snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildingRecord {
    /// Catalog identifier of the building.
    #[serde(rename = "type")]
    pub kind: BuildingTypeId,
    /// Column of the upper-left footprint cell.
    pub position_x: u32,
    /// Row of the upper-left footprint cell.
    pub position_y: u32,
    /// Operational flag at the time of capture; informational only.
    #[serde(default = "operational_by_default")]
    pub is_operational: bool,
}

impl BuildingRecord {
    /// Upper-left cell anchoring the footprint.
    #[must_use]
    pub const fn origin(&self) -> CellCoord {
        CellCoord::new(self.position_x, self.position_y)
    }
}

const fn operational_by_default() -> bool {
    true
}

/// Persistent state of a city.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CitySnapshot {
    /// Buildings in placement order.
    pub buildings: Vec<BuildingRecord>,
    /// Treasury balance.
    pub credits: i64,
    /// Current residents.
    pub population: u64,
    /// Ore stockpile.
    pub ore: u64,
    /// Highest rank reached.
    pub current_rank_level: RankLevel,
}

/// Why a stored building entry was not restored.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SkipReason {
    /// The entry could not be decoded at all.
    #[error("building entry {position} is malformed: {message}")]
    MalformedEntry {
        /// Index of the entry in the stored list.
        position: usize,
        /// Decoder diagnostic.
        message: String,
    },
    /// The entry names a type missing from the catalog.
    #[error("unknown building type {kind}")]
    UnknownBuildingType {
        /// Identifier that failed to resolve.
        kind: BuildingTypeId,
    },
    /// The entry's footprint does not fit the grid.
    #[error("{kind} at {origin} is out of bounds")]
    OutOfBounds {
        /// Catalog identifier of the entry.
        kind: BuildingTypeId,
        /// Stored anchor cell.
        origin: CellCoord,
    },
    /// The entry's footprint overlaps an entry restored earlier.
    #[error("{kind} at {origin} overlaps an earlier building at {cell}")]
    Overlap {
        /// Catalog identifier of the entry.
        kind: BuildingTypeId,
        /// Stored anchor cell.
        origin: CellCoord,
        /// First contested cell.
        cell: CellCoord,
    },
}

/// Restored city together with the entries that were dropped.
#[derive(Debug)]
pub struct LoadReport {
    /// City rebuilt from the snapshot.
    pub city: City,
    /// Entries that could not be restored, in stored order.
    pub skipped: Vec<SkipReason>,
}

impl City {
    /// Captures the persistent state of the city.
    #[must_use]
    pub fn to_snapshot(&self) -> CitySnapshot {
        let resources = query::resources(self);
        CitySnapshot {
            buildings: self
                .buildings
                .iter()
                .map(|building| BuildingRecord {
                    kind: building.spec.id.clone(),
                    position_x: building.origin.column(),
                    position_y: building.origin.row(),
                    is_operational: building.operational,
                })
                .collect(),
            credits: resources.credits,
            population: resources.population,
            ore: resources.ore,
            current_rank_level: self.stats.rank,
        }
    }

    /// Rebuilds a city from a snapshot.
    ///
    /// Entries are restored in stored order. Entries that cannot be restored
    /// are skipped and reported. The stored rank is clamped to the ladder and
    /// the derived fields are refreshed without accruing stocks.
    #[must_use]
    pub fn from_snapshot(
        config: SimulationConfig,
        catalog: Arc<Catalog>,
        snapshot: CitySnapshot,
    ) -> LoadReport {
        let mut city = City::empty(config, catalog);
        city.credits = snapshot.credits;
        city.population = snapshot.population;
        city.ore = snapshot.ore;
        city.stats.rank = city.catalog.ranks().clamp(snapshot.current_rank_level);

        let mut skipped = Vec::new();
        for record in snapshot.buildings {
            if let Err(reason) = city.restore(&record) {
                warn!(%reason, "skipping stored building");
                skipped.push(reason);
            }
        }

        city.refresh();
        LoadReport { city, skipped }
    }

    fn restore(&mut self, record: &BuildingRecord) -> Result<(), SkipReason> {
        let origin = record.origin();
        let spec = self
            .catalog
            .spec_for(&record.kind)
            .map(Arc::clone)
            .map_err(|_| SkipReason::UnknownBuildingType {
                kind: record.kind.clone(),
            })?;

        let region = spec.footprint_at(origin);
        if !self.occupancy.contains(region) {
            return Err(SkipReason::OutOfBounds {
                kind: record.kind.clone(),
                origin,
            });
        }
        if let Some(cell) = self.occupancy.first_occupied(region) {
            return Err(SkipReason::Overlap {
                kind: record.kind.clone(),
                origin,
                cell,
            });
        }

        let id = self.buildings.insert(spec, origin, record.is_operational).id;
        self.occupancy.occupy(region, id);
        Ok(())
    }
}
