//! Sequential ids for drainage-network cells and headwater cells

use pixeltc_core::raster::D8Neighbors;
use pixeltc_core::{Cell, Raster};

use super::basin::Basin;

/// Network and headwater numbering of a basin.
///
/// Ids are 1-based and assigned in row-major order; `0` in the id rasters
/// marks cells that are not numbered.
#[derive(Debug, Clone)]
pub struct NetworkIndex {
    /// Network id per cell
    pub network_ids: Raster<u32>,
    /// Headwater id per cell
    pub headwater_ids: Raster<u32>,
    network_cells: Vec<Cell>,
    headwater_cells: Vec<Cell>,
}

impl NetworkIndex {
    pub fn network_count(&self) -> usize {
        self.network_cells.len()
    }

    pub fn headwater_count(&self) -> usize {
        self.headwater_cells.len()
    }

    /// Cell of network id `id`
    pub fn network_cell(&self, id: u32) -> Option<Cell> {
        id.checked_sub(1)
            .and_then(|i| self.network_cells.get(i as usize))
            .copied()
    }

    /// Cell of headwater id `id`
    pub fn headwater_cell(&self, id: u32) -> Option<Cell> {
        id.checked_sub(1)
            .and_then(|i| self.headwater_cells.get(i as usize))
            .copied()
    }

    /// Network cells in id order
    pub fn network_cells(&self) -> &[Cell] {
        &self.network_cells
    }

    /// Headwater cells in id order
    pub fn headwater_cells(&self) -> &[Cell] {
        &self.headwater_cells
    }
}

/// A non-network basin cell is a headwater when no basin neighbour drains into it.
pub fn is_headwater(basin: &Basin, cell: Cell) -> bool {
    if !basin.in_basin(cell) || basin.on_network(cell) {
        return false;
    }
    let flow = basin.flow();
    !D8Neighbors::new(cell.0, cell.1, basin.rows(), basin.cols())
        .any(|(_, r, c)| basin.in_basin((r, c)) && flow.drains_into(r, c, cell))
}

/// Number network cells and headwaters in row-major order.
pub fn enumerate_network(basin: &Basin) -> NetworkIndex {
    let mut network_ids: Raster<u32> = basin.field(0);
    let mut headwater_ids: Raster<u32> = basin.field(0);
    let mut network_cells = Vec::new();
    let mut headwater_cells = Vec::new();

    for cell in basin.cells() {
        if basin.on_network(cell) {
            network_cells.push(cell);
            network_ids.data_mut()[cell] = network_cells.len() as u32;
        } else if is_headwater(basin, cell) {
            headwater_cells.push(cell);
            headwater_ids.data_mut()[cell] = headwater_cells.len() as u32;
        }
    }

    NetworkIndex {
        network_ids,
        headwater_ids,
        network_cells,
        headwater_cells,
    }
}
