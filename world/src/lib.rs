#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative city state management for the city builder.
//!
//! A [`City`] owns the building collection, the occupancy grid and the
//! resource stocks. Every mutation runs to completion before returning and
//! leaves the derived statistics consistent with the building set: failed
//! placements and removals change nothing, successful ones run a full
//! simulation step before they return.

use std::sync::Arc;

use city_builder_catalog::Catalog;
use city_builder_core::{
    BuildingId, BuildingSnapshot, BuildingTypeId, CellCoord, CityStats, Command, Event,
    PlacementError, RankLevel, RemovalError, SimulationConfig,
};
use city_builder_system_economy::{self as economy, Valuation};
use city_builder_system_power::{self as power, PowerLoad};
use tracing::{debug, info, warn};

mod buildings;
mod grid;
pub mod persist;
pub mod snapshot;

use buildings::BuildingRegistry;
use grid::OccupancyGrid;

/// Outcome of a successful placement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlacementSuccess {
    /// The placed building, as it stands after the follow-up tick.
    pub building: BuildingSnapshot,
    /// Confirmation suitable for display.
    pub message: String,
}

/// Outcome of a successful removal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemovalSuccess {
    /// The building that was demolished.
    pub building: BuildingSnapshot,
    /// Credits returned to the treasury.
    pub refund: i64,
    /// Confirmation suitable for display.
    pub message: String,
}

/// Whether a recomputation accrues stocks or only refreshes derived fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Accrual {
    Accrue,
    DerivedOnly,
}

/// Represents the authoritative city state.
#[derive(Clone, Debug)]
pub struct City {
    config: SimulationConfig,
    catalog: Arc<Catalog>,
    buildings: BuildingRegistry,
    occupancy: OccupancyGrid,
    credits: i64,
    population: u64,
    ore: u64,
    stats: CityStats,
    tick_index: u64,
}

impl City {
    /// Creates a city with default settings backed by the standard catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(SimulationConfig::default())
    }

    /// Creates a city with the provided settings backed by the standard catalog.
    #[must_use]
    pub fn with_config(config: SimulationConfig) -> Self {
        Self::with_catalog(config, Catalog::standard())
    }

    /// Creates a city backed by an explicit catalog.
    ///
    /// This is the scoped override point: only this city observes `catalog`.
    #[must_use]
    pub fn with_catalog(config: SimulationConfig, catalog: Arc<Catalog>) -> Self {
        let mut city = Self::empty(config, catalog);
        city.refresh();
        city
    }

    /// Unpopulated city with initial stocks and stale derived fields.
    fn empty(config: SimulationConfig, catalog: Arc<Catalog>) -> Self {
        let occupancy = OccupancyGrid::new(config.grid_columns, config.grid_rows);
        let stats = CityStats {
            total_power_generation: config.base_power,
            total_power_consumption: 0,
            net_power: config.base_power,
            max_population_capacity: 0,
            city_value: 0,
            rank: RankLevel::BASE,
            rank_name: catalog.ranks().name(RankLevel::BASE).to_owned(),
        };
        Self {
            credits: config.initial_credits,
            population: config.initial_population,
            ore: config.initial_ore,
            buildings: BuildingRegistry::new(),
            occupancy,
            stats,
            tick_index: 0,
            catalog,
            config,
        }
    }

    /// Places a building of type `kind` anchored at `origin`.
    ///
    /// Checks run in order and the first failure wins: the type must exist,
    /// the treasury must cover the cost, the footprint must fit the grid and
    /// every footprint cell must be free. On success the cost is deducted and
    /// a full tick runs before returning.
    pub fn place_building(
        &mut self,
        kind: &BuildingTypeId,
        origin: CellCoord,
    ) -> Result<PlacementSuccess, PlacementError> {
        let spec = Arc::clone(self.catalog.spec_for(kind).map_err(|_| {
            PlacementError::UnknownBuildingType { kind: kind.clone() }
        })?);

        let cost = i64::from(spec.cost);
        if self.credits < cost {
            return Err(PlacementError::InsufficientCredits {
                required: cost,
                available: self.credits,
            });
        }

        let region = spec.footprint_at(origin);
        if !self.occupancy.contains(region) {
            return Err(PlacementError::OutOfBounds);
        }
        if let Some(cell) = self.occupancy.first_occupied(region) {
            return Err(PlacementError::CellOccupied { cell });
        }

        self.credits -= cost;
        let message = format!("{} placed.", spec.name);
        let placed = self.buildings.insert(spec, origin, true);
        let mut building = placed.snapshot();
        self.occupancy.occupy(region, building.id);
        debug!(%kind, %origin, building = building.id.get(), "building placed");

        self.tick();
        building.operational = self
            .buildings
            .get(building.id)
            .is_some_and(|placed| placed.operational);
        Ok(PlacementSuccess { building, message })
    }

    /// Demolishes the building covering `cell` and refunds half its cost.
    pub fn remove_building(&mut self, cell: CellCoord) -> Result<RemovalSuccess, RemovalError> {
        let Some(position) = self.buildings.position_covering(cell) else {
            return Err(RemovalError::NoBuildingAtPosition { cell });
        };

        let removed = self.buildings.remove(position);
        self.occupancy.vacate(removed.region());
        let refund = i64::from(removed.spec.refund());
        self.credits = self.credits.saturating_add(refund);
        debug!(kind = %removed.spec.id, %cell, refund, "building removed");

        self.tick();
        Ok(RemovalSuccess {
            message: format!("{} removed. {refund} credits refunded.", removed.spec.name),
            building: removed.snapshot(),
            refund,
        })
    }

    /// Advances the simulation by one step.
    ///
    /// Each call accrues ore, grows population and collects income, so
    /// repeated calls are safe but not idempotent.
    pub fn tick(&mut self) {
        self.tick_index = self.tick_index.saturating_add(1);
        self.recompute(Accrual::Accrue);
    }

    /// Recomputes power, capacity, value and rank without accruing stocks.
    ///
    /// Runs on construction and after loading so the derived fields match
    /// the building set without advancing the simulation.
    pub fn refresh(&mut self) {
        self.recompute(Accrual::DerivedOnly);
    }

    fn recompute(&mut self, accrual: Accrual) {
        let loads: Vec<PowerLoad> = self
            .buildings
            .iter()
            .map(|building| {
                PowerLoad::new(
                    building.spec.power_generation,
                    building.spec.power_consumption,
                )
            })
            .collect();
        let allocation = power::allocate(self.config.base_power, &loads);

        let mut building_value = 0i64;
        let mut capacity = 0u64;
        let mut ore_produced = 0u64;
        for (building, operational) in self
            .buildings
            .iter_mut()
            .zip(allocation.operational().iter().copied())
        {
            building.operational = operational;
            building_value = building_value.saturating_add(i64::from(building.spec.value));
            if operational {
                capacity = capacity.saturating_add(u64::from(building.spec.population_capacity));
                ore_produced = ore_produced.saturating_add(u64::from(building.spec.ore_production));
            }
        }

        let net_power = allocation.net();
        if accrual == Accrual::Accrue && allocation.offline().next().is_some() {
            warn!(
                offline = allocation.offline().count(),
                net_power, "power shortage, buildings switched off"
            );
        }
        if accrual == Accrual::Accrue {
            self.ore = self.ore.saturating_add(ore_produced);
            if net_power >= 0 {
                self.population = economy::grow_population(self.population, capacity);
                self.credits = self
                    .credits
                    .saturating_add(economy::income(self.population));
            }
        }

        let city_value = Valuation {
            building_value,
            credits: self.credits,
            population: self.population,
            ore: self.ore,
        }
        .city_value();

        let ranks = self.catalog.ranks();
        let previous = self.stats.rank;
        let rank = ranks.ratchet(previous, city_value);
        if rank > previous {
            info!(
                from = %previous,
                to = %rank,
                name = ranks.name(rank),
                city_value,
                "city rank advanced"
            );
        }

        self.stats = CityStats {
            total_power_generation: allocation.total_generation(),
            total_power_consumption: allocation.total_consumption(),
            net_power,
            max_population_capacity: capacity,
            city_value,
            rank,
            rank_name: ranks.name(rank).to_owned(),
        };
        debug!(
            tick = self.tick_index,
            net_power,
            population = self.population,
            credits = self.credits,
            ore = self.ore,
            city_value,
            "city recomputed"
        );
    }

    fn offline_buildings(&self) -> Vec<BuildingId> {
        self.buildings
            .iter()
            .filter(|building| !building.operational)
            .map(|building| building.id)
            .collect()
    }
}

impl Default for City {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the city, reporting the outcome as events.
///
/// Commands that run a simulation step are followed by
/// [`Event::PowerShortage`] when buildings are offline and by
/// [`Event::RankAdvanced`] when the rank rose.
pub fn apply(city: &mut City, command: Command, out_events: &mut Vec<Event>) {
    let rank_before = city.stats.rank;
    let stepped = match command {
        Command::PlaceBuilding { kind, origin } => match city.place_building(&kind, origin) {
            Ok(success) => {
                out_events.push(Event::BuildingPlaced {
                    building: success.building.id,
                    kind,
                    region: success.building.region,
                });
                true
            }
            Err(reason) => {
                debug!(%kind, %origin, %reason, "placement rejected");
                out_events.push(Event::PlacementRejected {
                    kind,
                    origin,
                    reason,
                });
                false
            }
        },
        Command::RemoveBuilding { cell } => match city.remove_building(cell) {
            Ok(success) => {
                out_events.push(Event::BuildingRemoved {
                    building: success.building.id,
                    kind: success.building.kind,
                    region: success.building.region,
                    refund: success.refund,
                });
                true
            }
            Err(reason) => {
                debug!(%cell, %reason, "removal rejected");
                out_events.push(Event::RemovalRejected { cell, reason });
                false
            }
        },
        Command::Tick => {
            city.tick();
            out_events.push(Event::TimeAdvanced {
                tick: city.tick_index,
            });
            true
        }
    };

    if !stepped {
        return;
    }

    let offline = city.offline_buildings();
    if !offline.is_empty() {
        out_events.push(Event::PowerShortage { offline });
    }
    if city.stats.rank > rank_before {
        out_events.push(Event::RankAdvanced {
            from: rank_before,
            to: city.stats.rank,
        });
    }
}

/// Query functions that provide read-only access to the city state.
pub mod query {
    use city_builder_catalog::Catalog;
    use city_builder_core::{
        BuildingId, BuildingSnapshot, BuildingSpec, CellCoord, CityStats, OccupancyView,
        Resources, SimulationConfig,
    };

    use super::City;

    /// Current stock resources.
    #[must_use]
    pub fn resources(city: &City) -> Resources {
        Resources {
            credits: city.credits,
            population: city.population,
            ore: city.ore,
        }
    }

    /// Derived statistics from the latest recomputation.
    #[must_use]
    pub fn stats(city: &City) -> &CityStats {
        &city.stats
    }

    /// Snapshots of every building in placement order.
    #[must_use]
    pub fn buildings(city: &City) -> Vec<BuildingSnapshot> {
        city.buildings.iter().map(|building| building.snapshot()).collect()
    }

    /// Number of buildings in the city.
    #[must_use]
    pub fn building_count(city: &City) -> usize {
        city.buildings.len()
    }

    /// Snapshot of the building covering `cell`, if any.
    #[must_use]
    pub fn building_at(city: &City, cell: CellCoord) -> Option<BuildingSnapshot> {
        let id = city.occupancy.occupant(cell)?;
        city.buildings.get(id).map(|building| building.snapshot())
    }

    /// Catalog entry of the building identified by `id`.
    #[must_use]
    pub fn building_spec(city: &City, id: BuildingId) -> Option<&BuildingSpec> {
        city.buildings.get(id).map(|building| building.spec.as_ref())
    }

    /// Read-only view of the occupancy grid.
    #[must_use]
    pub fn occupancy_view(city: &City) -> OccupancyView<'_> {
        city.occupancy.view()
    }

    /// Grid dimensions as `(columns, rows)`.
    #[must_use]
    pub fn grid_dimensions(city: &City) -> (u32, u32) {
        city.occupancy.dimensions()
    }

    /// Catalog backing the city.
    #[must_use]
    pub fn catalog(city: &City) -> &Catalog {
        &city.catalog
    }

    /// Display name of the rank currently held.
    #[must_use]
    pub fn rank_name(city: &City) -> &str {
        &city.stats.rank_name
    }

    /// Buildings unlocked at the city's current rank, in menu order.
    #[must_use]
    pub fn available_buildings(city: &City) -> Vec<&BuildingSpec> {
        city.catalog.available_at(city.stats.rank)
    }

    /// Settings the city was created with.
    #[must_use]
    pub fn config(city: &City) -> &SimulationConfig {
        &city.config
    }

    /// Number of full simulation steps run by this city instance.
    #[must_use]
    pub fn tick_count(city: &City) -> u64 {
        city.tick_index
    }
}
