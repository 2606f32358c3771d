//! Dense cell-to-building occupancy index.

use city_builder_core::{BuildingId, CellCoord, CellRect, OccupancyView};

/// Row-major grid recording which building, if any, covers each cell.
///
/// The grid never owns buildings; it stores handles that resolve through
/// the building registry.
#[derive(Clone, Debug)]
pub(crate) struct OccupancyGrid {
    columns: u32,
    rows: u32,
    cells: Vec<Option<BuildingId>>,
}

impl OccupancyGrid {
    pub(crate) fn new(columns: u32, rows: u32) -> Self {
        let capacity_u64 = u64::from(columns) * u64::from(rows);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        Self {
            columns,
            rows,
            cells: vec![None; capacity],
        }
    }

    pub(crate) const fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    pub(crate) fn contains(&self, region: CellRect) -> bool {
        region.fits_within(self.columns, self.rows)
    }

    pub(crate) fn occupant(&self, cell: CellCoord) -> Option<BuildingId> {
        self.index(cell)
            .and_then(|index| self.cells.get(index).copied().flatten())
    }

    /// First occupied cell of `region` in row-major order.
    pub(crate) fn first_occupied(&self, region: CellRect) -> Option<CellCoord> {
        region.cells().find(|cell| self.occupant(*cell).is_some())
    }

    pub(crate) fn occupy(&mut self, region: CellRect, building: BuildingId) {
        self.fill(region, Some(building));
    }

    pub(crate) fn vacate(&mut self, region: CellRect) {
        self.fill(region, None);
    }

    pub(crate) fn view(&self) -> OccupancyView<'_> {
        OccupancyView::new(&self.cells, self.columns, self.rows)
    }

    fn fill(&mut self, region: CellRect, value: Option<BuildingId>) {
        for cell in region.cells() {
            if let Some(index) = self.index(cell) {
                if let Some(slot) = self.cells.get_mut(index) {
                    *slot = value;
                }
            }
        }
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
