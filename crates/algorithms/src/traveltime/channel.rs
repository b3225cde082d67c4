//! Channel travel time with Manning's equation
//!
//! From every network cell the path is followed to the basin boundary and
//! split into reaches of constant river class. A reach ends on the first
//! network cell of the next class; the last reach ends on the last basin
//! cell. Cells off the network extend the current reach.

use std::ops::ControlFlow;

use pixeltc_core::{ConfigError, Raster, Result};

use crate::maybe_rayon::*;

use super::basin::Basin;
use super::geodesic::StepMetric;
use super::network::NetworkIndex;
use super::tables::RiverClassTable;
use super::walker::{PathWalker, StopAt};

#[derive(Debug, Clone)]
pub struct ChannelFields {
    /// Travel time from the network cell to the basin boundary (min)
    pub tempo_rio: Raster<f64>,
}

/// Flow velocity (m/s): R^(2/3)·S^(1/2)/n, with S taken as tabulated for the
/// river class
pub fn manning_velocity(hydraulic_radius: f64, slope: f64, manning: f64) -> f64 {
    hydraulic_radius.powf(2.0 / 3.0) * slope.sqrt() / manning
}

/// Travel time (min) over `length` metres of a river class; zero for a zero-length reach
pub fn reach_time(length: f64, class: i32, rivers: &RiverClassTable) -> Result<f64> {
    if length <= 0.0 {
        return Ok(0.0);
    }
    let river = rivers
        .get(class)
        .ok_or(ConfigError::MissingRiverClasses {
            classes: vec![class],
        })?;
    let velocity = manning_velocity(river.hydraulic_radius, river.slope, river.manning);
    Ok(length / velocity / 60.0)
}

pub fn channel_times(
    basin: &Basin,
    metric: &StepMetric,
    network: &NetworkIndex,
    rivers: &RiverClassTable,
) -> Result<ChannelFields> {
    let walker = PathWalker::new(basin, metric, StopAt::BasinExit);

    let times: Vec<f64> = network
        .network_cells()
        .into_par_iter()
        .map(|&start| {
            let mut class = basin.river_class(start);
            let mut reach_start = 0.0;
            let mut total = 0.0;
            let mut failure = None;
            let outcome = walker.walk(start, |step| {
                let next_class = basin.river_class(step.to);
                if step.to_network && next_class != class {
                    match reach_time(step.distance - reach_start, class, rivers) {
                        Ok(t) => total += t,
                        Err(e) => {
                            failure = Some(e);
                            return ControlFlow::Break(());
                        }
                    }
                    class = next_class;
                    reach_start = step.distance;
                }
                ControlFlow::Continue(())
            });
            if let Some(e) = failure {
                return Err(e);
            }
            Ok(total + reach_time(outcome.distance - reach_start, class, rivers)?)
        })
        .collect::<Result<Vec<_>>>()?;

    let mut tempo_rio = basin.nan_field();
    for (&cell, time) in network.network_cells().iter().zip(times) {
        tempo_rio.data_mut()[cell] = time;
    }
    Ok(ChannelFields { tempo_rio })
}
