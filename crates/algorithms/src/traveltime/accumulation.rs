//! Flow accumulation inside a basin
//!
//! Counts, for every basin cell, the basin cells draining through it
//! (itself included), following the decoded D8 directions.

use ndarray::Array2;
use pixeltc_core::{Algorithm, Error, FlowDirectionGrid, Raster, Result};

/// Basin-restricted flow accumulation
#[derive(Debug, Clone, Default)]
pub struct BasinAccumulation;

impl Algorithm for BasinAccumulation {
    type Input = (FlowDirectionGrid, Raster<u8>);
    type Output = Raster<f64>;
    type Params = ();
    type Error = Error;

    fn name(&self) -> &'static str {
        "Basin Flow Accumulation"
    }

    fn description(&self) -> &'static str {
        "Count basin cells draining through each cell along D8 directions"
    }

    fn execute(&self, input: Self::Input, _params: Self::Params) -> Result<Self::Output> {
        let (flow, basin) = input;
        Ok(basin_accumulation(&flow, &basin))
    }
}

/// Accumulated flow in cells; `NaN` outside the basin.
///
/// Every basin cell starts at 1 and passes its total to the downstream cell
/// when that cell is also in the basin. Cells caught in a direction cycle
/// never complete and keep a partial count.
pub fn basin_accumulation(flow: &FlowDirectionGrid, basin: &Raster<u8>) -> Raster<f64> {
    let (rows, cols) = flow.shape();
    let inside = |cell: (usize, usize)| basin.data()[cell] == 1;
    let downstream = |cell: (usize, usize)| {
        flow.downstream(cell.0, cell.1)
            .filter(|&next| inside(next))
    };

    // Step 1: in-degree from basin donors
    let mut in_degree = Array2::<u32>::zeros((rows, cols));
    let mut accumulation = Array2::<f64>::from_elem((rows, cols), f64::NAN);
    for row in 0..rows {
        for col in 0..cols {
            if !inside((row, col)) {
                continue;
            }
            accumulation[(row, col)] = 1.0;
            if let Some(next) = downstream((row, col)) {
                in_degree[next] += 1;
            }
        }
    }

    // Step 2: topological propagation from cells nobody drains into
    let mut queue: Vec<(usize, usize)> = Vec::new();
    for row in 0..rows {
        for col in 0..cols {
            if inside((row, col)) && in_degree[(row, col)] == 0 {
                queue.push((row, col));
            }
        }
    }

    while let Some(cell) = queue.pop() {
        let Some(next) = downstream(cell) else {
            continue;
        };
        accumulation[next] += accumulation[cell];
        in_degree[next] -= 1;
        if in_degree[next] == 0 {
            queue.push(next);
        }
    }

    let mut output: Raster<f64> = basin.with_same_meta();
    *output.data_mut() = accumulation;
    output.set_nodata(Some(f64::NAN));
    output
}
