//! Shared grid geometry and raster metadata descriptions

use serde::{Deserialize, Serialize};

use crate::crs::CRS;
use crate::error::{Error, Result};
use crate::raster::{GeoTransform, Raster, RasterElement};

/// Relative tolerance when comparing cell sizes across layers
const CELL_SIZE_TOLERANCE: f64 = 1e-9;

/// Geometry shared by every layer of a run: dimensions, georeferencing and CRS.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridSpec {
    pub rows: usize,
    pub cols: usize,
    pub transform: GeoTransform,
    pub crs: Option<CRS>,
}

impl GridSpec {
    /// Geometry of an existing raster
    pub fn of<T: RasterElement>(raster: &Raster<T>) -> Self {
        Self {
            rows: raster.rows(),
            cols: raster.cols(),
            transform: *raster.transform(),
            crs: raster.crs().cloned(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows * self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn cell_width(&self) -> f64 {
        self.transform.cell_width()
    }

    pub fn cell_height(&self) -> f64 {
        self.transform.cell_height()
    }

    /// Ensure `raster` has this grid's dimensions and cell size.
    pub fn check<T: RasterElement>(&self, layer: &'static str, raster: &Raster<T>) -> Result<()> {
        let (ar, ac) = raster.shape();
        if ar != self.rows || ac != self.cols {
            return Err(Error::DimensionMismatch {
                layer,
                er: self.rows,
                ec: self.cols,
                ar,
                ac,
            });
        }
        let expected = (self.cell_width(), self.cell_height());
        let actual = (raster.transform().cell_width(), raster.transform().cell_height());
        if !close(expected.0, actual.0) || !close(expected.1, actual.1) {
            return Err(Error::CellSizeMismatch {
                layer,
                expected,
                actual,
            });
        }
        Ok(())
    }
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= CELL_SIZE_TOLERANCE * a.abs().max(b.abs()).max(1.0)
}

/// Summary of an output raster handed to downstream consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RasterMeta {
    pub name: String,
    pub units: String,
    pub rows: usize,
    pub cols: usize,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub valid_count: usize,
    pub transform: GeoTransform,
    pub crs: Option<String>,
}

impl RasterMeta {
    pub fn describe<T: RasterElement>(name: &str, units: &str, raster: &Raster<T>) -> Self {
        let stats = raster.statistics();
        Self {
            name: name.to_string(),
            units: units.to_string(),
            rows: raster.rows(),
            cols: raster.cols(),
            min: stats.min.and_then(|v| v.to_f64()),
            max: stats.max.and_then(|v| v.to_f64()),
            valid_count: stats.valid_count,
            transform: *raster.transform(),
            crs: raster.crs().map(CRS::identifier),
        }
    }
}
