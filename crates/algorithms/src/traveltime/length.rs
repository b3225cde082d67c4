//! Accumulated lengths along flow paths
//!
//! - `lac`: longest distance travelled to reach a cell from any network cell upstream
//! - `lfoz`: distance from a network cell to the basin mouth
//! - `dist`: distance from a cell to the first network cell downstream
//! - `pixeldren`: network id of that first network cell

use std::ops::ControlFlow;

use pixeltc_core::Raster;
use tracing::warn;

use crate::maybe_rayon::*;

use super::basin::Basin;
use super::geodesic::StepMetric;
use super::network::NetworkIndex;
use super::walker::{PathWalker, StopAt, WalkEnd};

#[derive(Debug, Clone)]
pub struct LengthFields {
    /// Accumulated length (m)
    pub lac: Raster<f64>,
    /// Distance to the basin mouth (m), on network cells
    pub lfoz: Raster<f64>,
    /// Distance to the network (m)
    pub dist: Raster<f64>,
    /// Network id reached, 0 when none
    pub pixeldren: Raster<u32>,
    /// Basin cells whose path never reaches the network
    pub unreached: usize,
}

pub fn accumulate_lengths(
    basin: &Basin,
    metric: &StepMetric,
    network: &NetworkIndex,
) -> LengthFields {
    let (lac, lfoz) = lengths_along_network(basin, metric, network);
    let (dist, pixeldren, unreached) = distance_to_network(basin, metric, network);
    if unreached > 0 {
        warn!(cells = unreached, "basin cells do not drain into the network");
    }
    LengthFields {
        lac,
        lfoz,
        dist,
        pixeldren,
        unreached,
    }
}

fn lengths_along_network(
    basin: &Basin,
    metric: &StepMetric,
    network: &NetworkIndex,
) -> (Raster<f64>, Raster<f64>) {
    let walker = PathWalker::new(basin, metric, StopAt::BasinExit);
    let mut lac = basin.nan_field();
    let mut lfoz = basin.nan_field();

    for &start in network.network_cells() {
        let lac_data = lac.data_mut();
        lac_data[start] = lac_data[start].max(0.0);
        let outcome = walker.walk(start, |step| {
            let cell = &mut lac_data[step.to];
            // NaN.max(x) is x
            *cell = cell.max(step.distance);
            ControlFlow::Continue(())
        });
        lfoz.data_mut()[start] = outcome.distance;
    }
    (lac, lfoz)
}

fn distance_to_network(
    basin: &Basin,
    metric: &StepMetric,
    network: &NetworkIndex,
) -> (Raster<f64>, Raster<u32>, usize) {
    let (rows, cols) = (basin.rows(), basin.cols());
    let walker = PathWalker::new(basin, metric, StopAt::Network);
    let ids = network.network_ids.data();

    // None for basin cells whose path never reaches the network
    let per_cell: Vec<Option<(f64, u32)>> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = Vec::with_capacity(cols);
            for col in 0..cols {
                let cell = (row, col);
                let value = if !basin.in_basin(cell) {
                    Some((f64::NAN, 0))
                } else if basin.on_network(cell) {
                    Some((0.0, ids[cell]))
                } else {
                    let out = walker.run(cell);
                    (out.end == WalkEnd::ReachedNetwork).then(|| (out.distance, ids[out.last]))
                };
                row_data.push(value);
            }
            row_data
        })
        .collect();

    let mut dist = basin.nan_field();
    let mut pixeldren = basin.field(0u32);
    let mut unreached = 0;
    for (i, value) in per_cell.into_iter().enumerate() {
        let cell = (i / cols, i % cols);
        match value {
            Some((d, id)) => {
                dist.data_mut()[cell] = d;
                pixeldren.data_mut()[cell] = id;
            }
            None => unreached += 1,
        }
    }
    (dist, pixeldren, unreached)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traveltime::config::{DistanceMode, RunOptions};
    use crate::traveltime::fixtures::{valley_basin, valley_inputs};
    use crate::traveltime::network::enumerate_network;
    use approx::assert_relative_eq;

    fn valley_lengths() -> LengthFields {
        let basin = valley_basin();
        let metric = StepMetric::new(basin.grid(), DistanceMode::Planar);
        let network = enumerate_network(&basin);
        accumulate_lengths(&basin, &metric, &network)
    }

    #[test]
    fn test_accumulated_length_on_network() {
        let f = valley_lengths();
        for row in 1..=5 {
            assert_relative_eq!(f.lac.get(row, 3).unwrap(), 30.0 * (row - 1) as f64);
            assert_relative_eq!(f.lfoz.get(row, 3).unwrap(), 30.0 * (5 - row) as f64);
        }
        assert!(f.lac.get(2, 1).unwrap().is_nan());
        assert!(f.lfoz.get(2, 1).unwrap().is_nan());
    }

    #[test]
    fn test_distance_to_network() {
        let f = valley_lengths();
        assert_eq!(f.unreached, 0);
        for row in 1..=5 {
            assert_relative_eq!(f.dist.get(row, 1).unwrap(), 60.0);
            assert_relative_eq!(f.dist.get(row, 2).unwrap(), 30.0);
            assert_relative_eq!(f.dist.get(row, 3).unwrap(), 0.0);
            assert_relative_eq!(f.dist.get(row, 4).unwrap(), 30.0);
            assert_relative_eq!(f.dist.get(row, 5).unwrap(), 60.0);
            for col in 1..=5 {
                assert_eq!(f.pixeldren.get(row, col).unwrap(), row as u32);
            }
        }
        assert!(f.dist.get(0, 0).unwrap().is_nan());
        assert_eq!(f.pixeldren.get(0, 0).unwrap(), 0);
    }

    #[test]
    fn test_unreached_cells_are_nan() {
        let mut inputs = valley_inputs();
        // (3,2) becomes a sink, cutting off itself and (3,1)
        inputs.flow_direction.set(3, 2, 0).unwrap();
        let basin = Basin::from_inputs(inputs, &RunOptions::default()).unwrap();
        let metric = StepMetric::new(basin.grid(), DistanceMode::Planar);
        let network = enumerate_network(&basin);
        let f = accumulate_lengths(&basin, &metric, &network);

        assert_eq!(f.unreached, 2);
        assert!(f.dist.get(3, 1).unwrap().is_nan());
        assert_eq!(f.pixeldren.get(3, 2).unwrap(), 0);
    }
}
