//! Validated, read-only view of a basin's layers

use pixeltc_core::{Cell, FlowDirectionGrid, GridSpec, Raster, Result};
use tracing::debug;

use super::accumulation::basin_accumulation;
use super::config::RunOptions;
use super::inputs::BasinInputs;

/// Basin layers after dimension checks and direction decoding.
#[derive(Debug, Clone)]
pub struct Basin {
    grid: GridSpec,
    flow: FlowDirectionGrid,
    mask: Raster<u8>,
    network: Raster<u8>,
    dem: Raster<f64>,
    land_use: Raster<i32>,
    river_class: Raster<i32>,
    accumulation: Raster<f64>,
}

impl Basin {
    /// Check dimensions, decode flow directions and derive accumulation if missing.
    pub fn from_inputs(inputs: BasinInputs, options: &RunOptions) -> Result<Self> {
        let grid = inputs.check_dimensions()?;
        let flow = FlowDirectionGrid::decode(
            &inputs.flow_direction,
            &inputs.basin,
            &options.direction_codes,
            options.clamp_border_directions,
        )?;
        let accumulation = match inputs.flow_accumulation {
            Some(acc) => acc,
            None => {
                debug!("deriving flow accumulation from flow directions");
                basin_accumulation(&flow, &inputs.basin)
            }
        };
        Ok(Self {
            grid,
            flow,
            mask: inputs.basin,
            network: inputs.network,
            dem: inputs.dem,
            land_use: inputs.land_use,
            river_class: inputs.river_class,
            accumulation,
        })
    }

    pub fn grid(&self) -> &GridSpec {
        &self.grid
    }

    pub fn rows(&self) -> usize {
        self.grid.rows
    }

    pub fn cols(&self) -> usize {
        self.grid.cols
    }

    pub fn flow(&self) -> &FlowDirectionGrid {
        &self.flow
    }

    pub fn in_basin(&self, cell: Cell) -> bool {
        self.mask.data().get(cell) == Some(&1)
    }

    /// Network cell inside the basin
    pub fn on_network(&self, cell: Cell) -> bool {
        self.in_basin(cell) && self.network.data()[cell] == 1
    }

    pub fn elevation(&self, cell: Cell) -> f64 {
        self.dem.data()[cell]
    }

    pub fn land_use(&self, cell: Cell) -> i32 {
        self.land_use.data()[cell]
    }

    pub fn river_class(&self, cell: Cell) -> i32 {
        self.river_class.data()[cell]
    }

    pub fn accumulation(&self) -> &Raster<f64> {
        &self.accumulation
    }

    pub fn mask(&self) -> &Raster<u8> {
        &self.mask
    }

    /// Basin cells in row-major order
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.mask
            .data()
            .indexed_iter()
            .filter(|&(_, &v)| v == 1)
            .map(|(cell, _)| cell)
    }

    /// Empty field on this grid, filled with `value`
    pub fn field<T: pixeltc_core::RasterElement>(&self, value: T) -> Raster<T> {
        let mut out = self.mask.with_same_meta::<T>();
        out.data_mut().fill(value);
        out
    }

    /// `NaN`-filled `f64` field with `NaN` declared as no-data
    pub fn nan_field(&self) -> Raster<f64> {
        let mut out = self.field(f64::NAN);
        out.set_nodata(Some(f64::NAN));
        out
    }
}
