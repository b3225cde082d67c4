//! Input layers of a basin and their value checks

use pixeltc_core::{Error, GridSpec, Raster, Result};

/// Raster layers describing one delineated basin.
///
/// All layers must share the basin mask's dimensions and cell size.
#[derive(Debug, Clone)]
pub struct BasinInputs {
    /// 1 inside the watershed, 0 outside
    pub basin: Raster<u8>,
    /// Raw D8 codes, decoded through the run's direction-code table
    pub flow_direction: Raster<i32>,
    /// Elevation (m)
    pub dem: Raster<f64>,
    /// Land-use class per cell
    pub land_use: Raster<i32>,
    /// 1 on the drainage network, 0 elsewhere
    pub network: Raster<u8>,
    /// River class on network cells
    pub river_class: Raster<i32>,
    /// Accumulated flow in cells; derived from the directions when absent
    pub flow_accumulation: Option<Raster<f64>>,
}

impl BasinInputs {
    /// Geometry of the run, taken from the basin mask and checked against every layer.
    pub fn check_dimensions(&self) -> Result<GridSpec> {
        let grid = GridSpec::of(&self.basin);
        grid.check("flow_direction", &self.flow_direction)?;
        grid.check("dem", &self.dem)?;
        grid.check("land_use", &self.land_use)?;
        grid.check("network", &self.network)?;
        grid.check("river_class", &self.river_class)?;
        if let Some(acc) = &self.flow_accumulation {
            grid.check("flow_accumulation", acc)?;
        }
        Ok(grid)
    }

    /// Out-of-domain cell values: non-binary masks, negative elevations and
    /// non-positive classes inside the basin.
    pub fn check_values(&self) -> Result<()> {
        check_binary("basin", &self.basin)?;
        check_binary("network", &self.network)?;

        let in_basin = |cell: (usize, usize)| self.basin.data()[cell] == 1;
        for (cell, &z) in self.dem.data().indexed_iter() {
            if in_basin(cell) && !(z >= 0.0) {
                return Err(invalid("dem", cell, z, "elevation must be finite and non-negative"));
            }
        }
        for (cell, &class) in self.land_use.data().indexed_iter() {
            if in_basin(cell) && class <= 0 {
                return Err(invalid("land_use", cell, class, "class must be a positive integer"));
            }
        }
        for (cell, &class) in self.river_class.data().indexed_iter() {
            if in_basin(cell) && self.network.data()[cell] == 1 && class <= 0 {
                return Err(invalid(
                    "river_class",
                    cell,
                    class,
                    "network cells need a positive river class",
                ));
            }
        }
        Ok(())
    }
}

fn check_binary(layer: &'static str, mask: &Raster<u8>) -> Result<()> {
    match mask.data().indexed_iter().find(|&(_, &v)| v > 1) {
        Some((cell, &v)) => Err(invalid(layer, cell, v, "mask values must be 0 or 1")),
        None => Ok(()),
    }
}

fn invalid<T: ToString>(
    layer: &'static str,
    (row, col): (usize, usize),
    value: T,
    reason: &'static str,
) -> Error {
    Error::InvalidValue {
        layer,
        row,
        col,
        value: value.to_string(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traveltime::fixtures::valley_inputs;
    use pixeltc_core::GeoTransform;

    #[test]
    fn test_valley_is_consistent() {
        let inputs = valley_inputs();
        let grid = inputs.check_dimensions().unwrap();
        assert_eq!((grid.rows, grid.cols), (7, 7));
        inputs.check_values().unwrap();
    }

    #[test]
    fn test_dimension_mismatch_names_layer() {
        let mut inputs = valley_inputs();
        inputs.land_use = Raster::new(7, 6);
        assert!(matches!(
            inputs.check_dimensions(),
            Err(Error::DimensionMismatch { layer: "land_use", .. })
        ));
    }

    #[test]
    fn test_cell_size_mismatch() {
        let mut inputs = valley_inputs();
        inputs.dem.set_transform(GeoTransform::new(0.0, 0.0, 90.0, -90.0));
        assert!(matches!(
            inputs.check_dimensions(),
            Err(Error::CellSizeMismatch { layer: "dem", .. })
        ));
    }

    #[test]
    fn test_non_binary_mask() {
        let mut inputs = valley_inputs();
        inputs.network.set(0, 0, 2).unwrap();
        assert!(matches!(
            inputs.check_values(),
            Err(Error::InvalidValue { layer: "network", row: 0, col: 0, .. })
        ));
    }

    #[test]
    fn test_negative_elevation_only_matters_in_basin() {
        let mut inputs = valley_inputs();
        inputs.dem.set(0, 0, -3.0).unwrap();
        inputs.check_values().unwrap();
        inputs.dem.set(2, 2, -3.0).unwrap();
        assert!(matches!(
            inputs.check_values(),
            Err(Error::InvalidValue { layer: "dem", row: 2, col: 2, .. })
        ));
    }

    #[test]
    fn test_zero_land_use_in_basin() {
        let mut inputs = valley_inputs();
        inputs.land_use.set(4, 4, 0).unwrap();
        assert!(matches!(
            inputs.check_values(),
            Err(Error::InvalidValue { layer: "land_use", .. })
        ));
    }
}
