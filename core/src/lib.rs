#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the city builder engine.
//!
//! This crate defines the vocabulary that connects adapters, the catalog,
//! the authoritative city, and the pure simulation systems. Adapters submit
//! [`Command`] values describing desired mutations, the world executes them
//! through its `apply` entry point, and then reports [`Event`] values
//! describing what actually happened. Validation failures travel as
//! [`PlacementError`] and [`RemovalError`] values rather than panics.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Commands that express all permissible city mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Requests construction of a building anchored at the provided origin cell.
    PlaceBuilding {
        /// Catalog identifier of the building to construct.
        kind: BuildingTypeId,
        /// Upper-left cell that defines the building's footprint.
        origin: CellCoord,
    },
    /// Requests demolition of whichever building covers the provided cell.
    RemoveBuilding {
        /// Any cell inside the footprint of the building to remove.
        cell: CellCoord,
    },
    /// Advances the simulation by a single step.
    Tick,
}

/// Events reported by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that a building was placed into the city.
    BuildingPlaced {
        /// Identifier allocated to the building by the city.
        building: BuildingId,
        /// Catalog identifier of the placed building.
        kind: BuildingTypeId,
        /// Region of cells occupied by the building.
        region: CellRect,
    },
    /// Confirms that a building was demolished.
    BuildingRemoved {
        /// Identifier of the removed building.
        building: BuildingId,
        /// Catalog identifier of the removed building.
        kind: BuildingTypeId,
        /// Region of cells previously occupied by the building.
        region: CellRect,
        /// Credits returned to the treasury.
        refund: i64,
    },
    /// Reports that a placement request was rejected.
    PlacementRejected {
        /// Catalog identifier provided in the request.
        kind: BuildingTypeId,
        /// Origin cell provided in the request.
        origin: CellCoord,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// Reports that a removal request was rejected.
    RemovalRejected {
        /// Cell provided in the request.
        cell: CellCoord,
        /// Specific reason the removal failed.
        reason: RemovalError,
    },
    /// Indicates that the simulation advanced by one step.
    TimeAdvanced {
        /// Number of steps simulated so far, including this one.
        tick: u64,
    },
    /// Reports the buildings switched off by the latest power allocation.
    PowerShortage {
        /// Buildings left non-operational, in placement order.
        offline: Vec<BuildingId>,
    },
    /// Announces that the city reached a higher rank.
    RankAdvanced {
        /// Rank held before the recomputation.
        from: RankLevel,
        /// Rank held afterwards.
        to: RankLevel,
    },
}

/// Catalog identifier of a building type, such as `SOLAR_PANEL`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BuildingTypeId(String);

impl BuildingTypeId {
    /// Creates a new building type identifier.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrows the textual identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BuildingTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for BuildingTypeId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Unique identifier assigned to a placed building.
///
/// Identifiers are handles into the city's building collection. They are
/// never reused within a city and are not persisted in snapshots.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BuildingId(u32);

impl BuildingId {
    /// Creates a new building identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Position of a rank tier within the rank ladder.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RankLevel(u8);

impl RankLevel {
    /// The rank every new city starts from.
    pub const BASE: Self = Self(0);

    /// Creates a rank level wrapper.
    #[must_use]
    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    /// Retrieves the underlying level.
    #[must_use]
    pub const fn get(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for RankLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.column, self.row)
    }
}

/// Axis-aligned rectangle expressed in cell coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRect {
    origin: CellCoord,
    size: CellRectSize,
}

impl CellRect {
    /// Constructs a rectangle from an origin cell and size.
    #[must_use]
    pub const fn from_origin_and_size(origin: CellCoord, size: CellRectSize) -> Self {
        Self { origin, size }
    }

    /// Upper-left cell that anchors the rectangle.
    #[must_use]
    pub const fn origin(&self) -> CellCoord {
        self.origin
    }

    /// Dimensions of the rectangle measured in whole cells.
    #[must_use]
    pub const fn size(&self) -> CellRectSize {
        self.size
    }

    /// Reports whether the rectangle covers the provided cell.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        let column_offset = cell.column().checked_sub(self.origin.column());
        let row_offset = cell.row().checked_sub(self.origin.row());
        match (column_offset, row_offset) {
            (Some(column), Some(row)) => column < self.size.width() && row < self.size.height(),
            _ => false,
        }
    }

    /// Reports whether the rectangle lies inside a grid of the given dimensions.
    ///
    /// Coordinates that would overflow while computing the far corner count as
    /// outside the grid.
    #[must_use]
    pub fn fits_within(&self, columns: u32, rows: u32) -> bool {
        let right = self.origin.column().checked_add(self.size.width());
        let bottom = self.origin.row().checked_add(self.size.height());
        match (right, bottom) {
            (Some(right), Some(bottom)) => right <= columns && bottom <= rows,
            _ => false,
        }
    }

    /// Iterates over every cell of the rectangle in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = CellCoord> {
        let origin = self.origin;
        let size = self.size;
        (0..size.height()).flat_map(move |row| {
            (0..size.width()).filter_map(move |column| {
                Some(CellCoord::new(
                    origin.column().checked_add(column)?,
                    origin.row().checked_add(row)?,
                ))
            })
        })
    }
}

/// Size of a [`CellRect`] measured in whole cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRectSize {
    width: u32,
    height: u32,
}

impl CellRectSize {
    /// Creates a new size descriptor with explicit dimensions.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width of the rectangle in cells.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height of the rectangle in cells.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }
}

/// Static description of a building type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuildingSpec {
    /// Catalog identifier.
    pub id: BuildingTypeId,
    /// Human-readable name shown to players.
    pub name: String,
    /// Credits deducted when the building is placed.
    pub cost: u32,
    /// Footprint measured in grid cells.
    pub size: CellRectSize,
    /// Power contributed while operational.
    pub power_generation: u32,
    /// Power drawn while operational.
    pub power_consumption: u32,
    /// Residents housed while operational.
    pub population_capacity: u32,
    /// Ore added to the stock on every tick while operational.
    pub ore_production: u32,
    /// Minimum rank required before the building is offered.
    pub unlock_rank: RankLevel,
    /// Structural value counted towards the city valuation.
    pub value: u32,
    /// Single character used by text map displays.
    pub glyph: char,
}

impl BuildingSpec {
    /// Credits returned when the building is demolished: half the cost, rounded down.
    #[must_use]
    pub const fn refund(&self) -> u32 {
        self.cost / 2
    }

    /// Footprint the building would occupy when anchored at `origin`.
    #[must_use]
    pub const fn footprint_at(&self, origin: CellCoord) -> CellRect {
        CellRect::from_origin_and_size(origin, self.size)
    }
}

/// A named tier of the rank ladder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RankTier {
    /// Position of the tier in the ladder.
    pub level: RankLevel,
    /// Display name of the tier.
    pub name: String,
    /// City value required to reach the tier.
    pub value_needed: i64,
}

/// Reasons a placement request may be rejected.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, thiserror::Error)]
pub enum PlacementError {
    /// The identifier does not name a catalog entry.
    #[error("Unknown building type: {kind}")]
    UnknownBuildingType {
        /// Identifier that failed to resolve.
        kind: BuildingTypeId,
    },
    /// The treasury cannot cover the building's cost.
    #[error("Not enough credits. ({available} available, {required} required)")]
    InsufficientCredits {
        /// Cost of the requested building.
        required: i64,
        /// Credits held when the request was made.
        available: i64,
    },
    /// The requested footprint extends beyond the grid.
    #[error("Building out of bounds.")]
    OutOfBounds,
    /// The requested footprint overlaps an existing building.
    #[error("Space already occupied at {cell}.")]
    CellOccupied {
        /// First occupied cell found in the footprint.
        cell: CellCoord,
    },
}

/// Reasons a removal request may be rejected.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, thiserror::Error)]
pub enum RemovalError {
    /// No building covers the requested cell.
    #[error("No building at that position {cell}.")]
    NoBuildingAtPosition {
        /// Cell provided in the request.
        cell: CellCoord,
    },
}

/// Tunable settings for a simulation session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Number of cell columns in the building grid.
    pub grid_columns: u32,
    /// Number of cell rows in the building grid.
    pub grid_rows: u32,
    /// Credits available to a new city.
    pub initial_credits: i64,
    /// Power generated by the city before any building contributes.
    pub base_power: i64,
    /// Residents of a new city.
    pub initial_population: u64,
    /// Ore stock of a new city.
    pub initial_ore: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            grid_columns: 25,
            grid_rows: 15,
            initial_credits: 10_000,
            base_power: 100,
            initial_population: 0,
            initial_ore: 500,
        }
    }
}

/// Immutable representation of a placed building used for queries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuildingSnapshot {
    /// Identifier allocated to the building by the city.
    pub id: BuildingId,
    /// Catalog identifier of the building.
    pub kind: BuildingTypeId,
    /// Region of cells occupied by the building.
    pub region: CellRect,
    /// Whether the building contributed during the latest recomputation.
    pub operational: bool,
}

/// Stock resources held by the city.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Resources {
    /// Treasury balance.
    pub credits: i64,
    /// Current residents.
    pub population: u64,
    /// Ore stockpile.
    pub ore: u64,
}

/// Derived statistics recomputed after every mutation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CityStats {
    /// Base power plus generation of operational buildings.
    pub total_power_generation: i64,
    /// Consumption of operational buildings.
    pub total_power_consumption: i64,
    /// Generation minus consumption.
    pub net_power: i64,
    /// Residents the operational buildings can house.
    pub max_population_capacity: u64,
    /// Scalar valuation used for rank thresholds.
    pub city_value: i64,
    /// Rank currently held.
    pub rank: RankLevel,
    /// Display name of the rank currently held.
    pub rank_name: String,
}

/// Read-only view into the dense occupancy grid.
#[derive(Clone, Copy, Debug)]
pub struct OccupancyView<'a> {
    cells: &'a [Option<BuildingId>],
    columns: u32,
    rows: u32,
}

impl<'a> OccupancyView<'a> {
    /// Captures a new occupancy view backed by the provided row-major cell slice.
    #[must_use]
    pub fn new(cells: &'a [Option<BuildingId>], columns: u32, rows: u32) -> Self {
        Self {
            cells,
            columns,
            rows,
        }
    }

    /// Returns the building occupying the provided cell, if any.
    #[must_use]
    pub fn occupant(&self, cell: CellCoord) -> Option<BuildingId> {
        self.index(cell)
            .and_then(|index| self.cells.get(index).copied().flatten())
    }

    /// Reports whether the cell lies inside the grid and is unoccupied.
    #[must_use]
    pub fn is_free(&self, cell: CellCoord) -> bool {
        self.index(cell)
            .is_some_and(|index| matches!(self.cells.get(index), Some(None)))
    }

    /// Returns an iterator over all cells in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = Option<BuildingId>> + 'a {
        self.cells.iter().copied()
    }

    /// Provides the dimensions of the underlying occupancy grid.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() < self.columns && cell.row() < self.rows {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn habitat() -> BuildingSpec {
        BuildingSpec {
            id: BuildingTypeId::new("HABITAT_SMALL"),
            name: "Small Habitat".to_owned(),
            cost: 1001,
            size: CellRectSize::new(2, 2),
            power_generation: 0,
            power_consumption: 10,
            population_capacity: 50,
            ore_production: 0,
            unlock_rank: RankLevel::BASE,
            value: 800,
            glyph: 'H',
        }
    }

    #[test]
    fn rect_contains_only_footprint_cells() {
        let rect = CellRect::from_origin_and_size(CellCoord::new(1, 1), CellRectSize::new(2, 2));
        assert!(rect.contains(CellCoord::new(1, 1)));
        assert!(rect.contains(CellCoord::new(2, 2)));
        assert!(!rect.contains(CellCoord::new(3, 1)));
        assert!(!rect.contains(CellCoord::new(0, 1)));
        assert!(!rect.contains(CellCoord::new(1, 3)));
    }

    #[test]
    fn rect_cells_enumerate_row_major() {
        let rect = CellRect::from_origin_and_size(CellCoord::new(4, 7), CellRectSize::new(2, 2));
        let cells: Vec<CellCoord> = rect.cells().collect();
        assert_eq!(
            cells,
            vec![
                CellCoord::new(4, 7),
                CellCoord::new(5, 7),
                CellCoord::new(4, 8),
                CellCoord::new(5, 8),
            ]
        );
    }

    #[test]
    fn rect_bounds_check_treats_overflow_as_outside() {
        let size = CellRectSize::new(2, 2);
        let inside = CellRect::from_origin_and_size(CellCoord::new(23, 13), size);
        let edge = CellRect::from_origin_and_size(CellCoord::new(24, 13), size);
        let overflow = CellRect::from_origin_and_size(CellCoord::new(u32::MAX, 0), size);

        assert!(inside.fits_within(25, 15));
        assert!(!edge.fits_within(25, 15));
        assert!(!overflow.fits_within(u32::MAX, 15));
    }

    #[test]
    fn refund_rounds_down() {
        assert_eq!(habitat().refund(), 500);
    }

    #[test]
    fn placement_errors_render_player_messages() {
        assert_eq!(PlacementError::OutOfBounds.to_string(), "Building out of bounds.");
        let unknown = PlacementError::UnknownBuildingType {
            kind: BuildingTypeId::new("CASTLE"),
        };
        assert_eq!(unknown.to_string(), "Unknown building type: CASTLE");
        let removal = RemovalError::NoBuildingAtPosition {
            cell: CellCoord::new(5, 5),
        };
        assert_eq!(removal.to_string(), "No building at that position (5, 5).");
    }

    #[test]
    fn building_type_id_serializes_as_plain_string() {
        let json = serde_json::to_string(&BuildingTypeId::new("SOLAR_PANEL")).expect("serialize");
        assert_eq!(json, "\"SOLAR_PANEL\"");
    }

    #[test]
    fn config_fills_missing_keys_with_defaults() {
        let config: SimulationConfig =
            toml::from_str("initial_credits = 250\ngrid_rows = 4\n").expect("parse config");
        assert_eq!(config.initial_credits, 250);
        assert_eq!(config.grid_rows, 4);
        assert_eq!(config.grid_columns, 25);
        assert_eq!(config.base_power, 100);
        assert_eq!(config.initial_ore, 500);
    }

    #[test]
    fn occupancy_view_reports_occupants_and_bounds() {
        let cells = [None, Some(BuildingId::new(3)), None, None];
        let view = OccupancyView::new(&cells, 2, 2);
        assert_eq!(view.occupant(CellCoord::new(1, 0)), Some(BuildingId::new(3)));
        assert!(view.is_free(CellCoord::new(0, 1)));
        assert!(!view.is_free(CellCoord::new(1, 0)));
        assert!(!view.is_free(CellCoord::new(2, 0)));
        assert_eq!(view.dimensions(), (2, 2));
    }
}
