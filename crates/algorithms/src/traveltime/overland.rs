//! Overland travel time with the SCS-lag formula
//!
//! Ts = 5.474·(n·L)^0.8 / (P24^0.5·(S/1000)^0.4)
//!
//! with n the Manning roughness of the land use, L the flow length (m),
//! P24 the 24-hour design rainfall (mm) and S the slope (m/km), clamped to
//! [`MIN_SLOPE`, `MAX_SLOPE`] before use.

use std::ops::ControlFlow;

use pixeltc_core::{Cell, ConfigError, Raster, Result};

use crate::maybe_rayon::*;

use super::basin::Basin;
use super::config::{PixelTimeMode, RunConfig, SlopeMode};
use super::geodesic::StepMetric;
use super::segments::SegmentFields;
use super::tables::ManningTable;
use super::walker::{PathWalker, StopAt};

/// Lower slope bound (m/km)
pub const MIN_SLOPE: f64 = 10.0;
/// Upper slope bound (m/km)
pub const MAX_SLOPE: f64 = 600.0;

/// SCS-lag overland time for one flow length
pub fn scs_lag(manning: f64, length: f64, p24: f64, slope_m_per_km: f64) -> f64 {
    let slope = slope_m_per_km.clamp(MIN_SLOPE, MAX_SLOPE);
    5.474 * (manning * length).powf(0.8) / (p24.sqrt() * (slope / 1000.0).powf(0.4))
}

#[derive(Debug, Clone)]
pub struct OverlandFields {
    /// Ts of every segment, aligned with [`SegmentFields::segments`]
    pub segment_times: Vec<f64>,
    /// Total overland time per headwater path, in headwater id order
    pub tscabe: Vec<f64>,
    /// `tscabe` written at the headwater cells
    pub tscabe2d: Raster<f64>,
    /// Overland time to the network from the other owned cells
    pub tsnaocabe2d: Raster<f64>,
    /// `tscabe2d` at headwaters, `tsnaocabe2d` elsewhere
    pub tstodos2d: Raster<f64>,
    /// Pixel-by-pixel accumulation, present with [`SlopeMode::PerPixel`]
    pub per_pixel: Option<PerPixelFields>,
}

#[derive(Debug, Clone)]
pub struct PerPixelFields {
    /// Slope to the downstream neighbour (m/km)
    pub decliv_jus: Raster<f64>,
    /// Time to cross the pixel (min)
    pub ts_pix: Raster<f64>,
    /// Time from the pixel to the network (min)
    pub ts_pix_acum: Raster<f64>,
}

pub fn overland_times(
    basin: &Basin,
    metric: &StepMetric,
    segments: &SegmentFields,
    config: &RunConfig,
) -> Result<OverlandFields> {
    let slope_mode = config.options.slope;
    let roughness = |class: i32| lookup(&config.manning, class);

    let segment_times = segments
        .segments
        .iter()
        .map(|s| -> Result<f64> {
            let n = roughness(s.land_use)?;
            Ok(scs_lag(n, s.length, config.p24, s.slope_for(slope_mode)))
        })
        .collect::<Result<Vec<_>>>()?;

    let tscabe: Vec<f64> = segments
        .paths
        .iter()
        .map(|p| segment_times[p.first_segment..p.first_segment + p.segment_count].iter().sum())
        .collect();

    let mut tscabe2d = basin.nan_field();
    for (path, &time) in segments.paths.iter().zip(&tscabe) {
        tscabe2d.data_mut()[path.cell] = time;
    }

    let mut tsnaocabe2d = basin.nan_field();
    for ((row, col), &segment_id) in segments.trepix.data().indexed_iter() {
        let Some(segment) = segments.segment(segment_id) else {
            continue;
        };
        let cell = (row, col);
        let index = segment.id as usize - 1;
        let remaining = segments.disttre.data()[cell];
        let own = match config.options.pixel_time {
            PixelTimeMode::Proportional if segment.length > 0.0 => {
                segment_times[index] * remaining / segment.length
            }
            PixelTimeMode::Proportional => 0.0,
            PixelTimeMode::Recomputed if remaining > 0.0 => scs_lag(
                roughness(segment.land_use)?,
                remaining,
                config.p24,
                segment.slope_for(slope_mode),
            ),
            PixelTimeMode::Recomputed => 0.0,
        };
        let below: f64 = segments
            .downstream_of(segment)
            .iter()
            .map(|s| segment_times[s.id as usize - 1])
            .sum();
        tsnaocabe2d.data_mut()[cell] = own + below;
    }

    let mut tstodos2d = tsnaocabe2d.clone();
    for path in &segments.paths {
        tstodos2d.data_mut()[path.cell] = tscabe2d.data()[path.cell];
    }

    let per_pixel = match slope_mode {
        SlopeMode::PerPixel => Some(per_pixel_times(basin, metric, config)?),
        _ => None,
    };

    Ok(OverlandFields {
        segment_times,
        tscabe,
        tscabe2d,
        tsnaocabe2d,
        tstodos2d,
        per_pixel,
    })
}

/// Per-pixel slopes and times, accumulated along each path to the network.
fn per_pixel_times(
    basin: &Basin,
    metric: &StepMetric,
    config: &RunConfig,
) -> Result<PerPixelFields> {
    let (rows, cols) = (basin.rows(), basin.cols());
    let flow = basin.flow();

    let mut decliv_jus = basin.nan_field();
    let mut ts_pix = basin.nan_field();
    for cell in basin.cells() {
        if basin.on_network(cell) {
            continue;
        }
        let step = flow.direction(cell.0, cell.1).and_then(|dir| {
            let next = dir.step(cell.0, cell.1, rows, cols)?;
            basin.in_basin(next).then(|| (next, metric.length(cell, dir)))
        });
        let (slope, time) = match step {
            Some((next, length)) => {
                let slope = (basin.elevation(cell) - basin.elevation(next)) / (length / 1000.0);
                let n = lookup(&config.manning, basin.land_use(cell))?;
                (slope, scs_lag(n, length, config.p24, slope))
            }
            None => (0.0, 0.0),
        };
        decliv_jus.data_mut()[cell] = slope;
        ts_pix.data_mut()[cell] = time;
    }

    let walker = PathWalker::new(basin, metric, StopAt::Network);
    let ts = ts_pix.data();
    let accumulated: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            (0..cols)
                .map(|col| {
                    let cell: Cell = (row, col);
                    if !basin.in_basin(cell) || basin.on_network(cell) {
                        return f64::NAN;
                    }
                    let mut total = ts[cell];
                    walker.walk(cell, |step| {
                        if !step.to_network {
                            total += ts[step.to];
                        }
                        ControlFlow::Continue(())
                    });
                    total
                })
                .collect::<Vec<_>>()
        })
        .collect();

    let mut ts_pix_acum = basin.nan_field();
    ts_pix_acum
        .data_mut()
        .iter_mut()
        .zip(accumulated)
        .for_each(|(out, v)| *out = v);

    Ok(PerPixelFields {
        decliv_jus,
        ts_pix,
        ts_pix_acum,
    })
}

fn lookup(table: &ManningTable, class: i32) -> Result<f64> {
    table.get(class).ok_or_else(|| {
        ConfigError::MissingManningClasses {
            classes: vec![class],
        }
        .into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traveltime::config::DistanceMode;
    use crate::traveltime::fixtures::{valley_basin, valley_config};
    use crate::traveltime::network::enumerate_network;
    use crate::traveltime::segments::decompose_segments;
    use approx::assert_relative_eq;

    fn run(
        slope: SlopeMode,
        pixel_time: PixelTimeMode,
    ) -> (SegmentFields, OverlandFields, RunConfig) {
        let basin = valley_basin();
        let mut config = valley_config(&basin);
        config.options.slope = slope;
        config.options.pixel_time = pixel_time;
        let metric = StepMetric::new(basin.grid(), DistanceMode::Planar);
        let network = enumerate_network(&basin);
        let segments = decompose_segments(&basin, &metric, &network);
        let overland = overland_times(&basin, &metric, &segments, &config).unwrap();
        (segments, overland, config)
    }

    #[test]
    fn test_slope_is_clamped() {
        assert_eq!(scs_lag(0.1, 50.0, 80.0, 2.0), scs_lag(0.1, 50.0, 80.0, 10.0));
        assert_eq!(scs_lag(0.1, 50.0, 80.0, -40.0), scs_lag(0.1, 50.0, 80.0, 10.0));
        assert_eq!(scs_lag(0.1, 50.0, 80.0, 900.0), scs_lag(0.1, 50.0, 80.0, 600.0));
        assert!(scs_lag(0.1, 50.0, 80.0, 100.0) > scs_lag(0.1, 50.0, 80.0, 200.0));
    }

    #[test]
    fn test_scs_lag_value() {
        // n·L = 10, P24 = 100, S = 100 m/km
        let expected = 5.474 * 10f64.powf(0.8) / (10.0 * 0.1f64.powf(0.4));
        assert_relative_eq!(scs_lag(0.2, 50.0, 100.0, 100.0), expected, max_relative = 1e-12);
    }

    #[test]
    fn test_headwater_totals() {
        let (segments, f, config) = run(SlopeMode::EndPoints, PixelTimeMode::Proportional);
        let slope = 5000.0 / 30.0;
        let west = scs_lag(0.4, 30.0, config.p24, slope) + scs_lag(0.15, 30.0, config.p24, slope);
        let east = scs_lag(0.4, 60.0, config.p24, slope);

        assert_relative_eq!(f.tscabe[0], west, max_relative = 1e-12);
        assert_relative_eq!(f.tscabe[1], east, max_relative = 1e-12);
        assert_relative_eq!(f.tscabe2d.get(1, 1).unwrap(), west, max_relative = 1e-12);
        assert_relative_eq!(f.tstodos2d.get(1, 5).unwrap(), east, max_relative = 1e-12);
        assert_eq!(f.segment_times.len(), segments.segments.len());
        assert!(f.per_pixel.is_none());
    }

    #[test]
    fn test_inner_pixel_time() {
        let (_, f, config) = run(SlopeMode::EndPoints, PixelTimeMode::Proportional);
        let slope = 5000.0 / 30.0;
        let east = scs_lag(0.4, 60.0, config.p24, slope);
        // (1,4) is halfway along the east segment
        assert_relative_eq!(f.tsnaocabe2d.get(1, 4).unwrap(), east / 2.0, max_relative = 1e-12);
        // (1,2) only has its own segment left
        let lower = scs_lag(0.15, 30.0, config.p24, slope);
        assert_relative_eq!(f.tstodos2d.get(1, 2).unwrap(), lower, max_relative = 1e-12);
        assert!(f.tstodos2d.get(1, 3).unwrap().is_nan());
    }

    #[test]
    fn test_recomputed_pixel_time() {
        let (_, f, config) = run(SlopeMode::EndPoints, PixelTimeMode::Recomputed);
        let expected = scs_lag(0.4, 30.0, config.p24, 5000.0 / 30.0);
        assert_relative_eq!(f.tsnaocabe2d.get(1, 4).unwrap(), expected, max_relative = 1e-12);
    }

    #[test]
    fn test_per_pixel_accumulation() {
        let (_, f, config) = run(SlopeMode::PerPixel, PixelTimeMode::Proportional);
        let pp = f.per_pixel.unwrap();
        let slope = 5000.0 / 30.0;
        assert_relative_eq!(pp.decliv_jus.get(2, 5).unwrap(), slope, max_relative = 1e-12);
        let ts = scs_lag(0.4, 30.0, config.p24, slope);
        assert_relative_eq!(pp.ts_pix.get(2, 5).unwrap(), ts, max_relative = 1e-12);
        assert_relative_eq!(pp.ts_pix_acum.get(2, 4).unwrap(), ts, max_relative = 1e-12);
        assert_relative_eq!(pp.ts_pix_acum.get(2, 5).unwrap(), 2.0 * ts, max_relative = 1e-12);
        assert!(pp.ts_pix_acum.get(2, 3).unwrap().is_nan());
    }
}
