//! End-to-end time-of-concentration run

use pixeltc_core::{Algorithm, Cell, Error, GridSpec, Raster, RasterMeta, Result};
use tracing::{debug, info, warn};

use super::basin::Basin;
use super::channel::{channel_times, ChannelFields};
use super::config::{DistanceMode, RunConfig, TravelTimeParams};
use super::geodesic::StepMetric;
use super::inputs::BasinInputs;
use super::length::{accumulate_lengths, LengthFields};
use super::network::{enumerate_network, NetworkIndex};
use super::overland::{overland_times, OverlandFields};
use super::segments::{decompose_segments, SegmentFields};
use super::total::{total_time, TotalTime};
use super::validate::{validate_connectivity, ConnectivityReport};

/// Pixel-based time of concentration
#[derive(Debug, Clone, Default)]
pub struct TimeOfConcentration;

impl Algorithm for TimeOfConcentration {
    type Input = BasinInputs;
    type Output = TravelTimeResult;
    type Params = TravelTimeParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Time of Concentration"
    }

    fn description(&self) -> &'static str {
        "Overland (SCS-lag) and channel (Manning) travel time from every basin cell to the outlet"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        time_of_concentration(input, params)
    }
}

/// Every field derived during a run
#[derive(Debug, Clone)]
pub struct TravelTimeResult {
    pub config: RunConfig,
    pub connectivity: ConnectivityReport,
    /// Flow accumulation used by the run, given or derived (cells)
    pub accumulation: Raster<f64>,
    pub network: NetworkIndex,
    pub lengths: LengthFields,
    pub segments: SegmentFields,
    pub channel: ChannelFields,
    pub overland: OverlandFields,
    pub total: TotalTime,
}

impl TravelTimeResult {
    /// Largest travel time to the outlet (min)
    pub fn time_of_concentration(&self) -> f64 {
        self.total.time_of_concentration
    }

    pub fn outlet(&self) -> Cell {
        self.connectivity.outlet
    }

    pub fn grid(&self) -> &GridSpec {
        &self.config.grid
    }

    /// Metadata of every output raster, in production order
    pub fn output_fields(&self) -> Vec<RasterMeta> {
        let mut fields = vec![
            RasterMeta::describe("accumulation", "cells", &self.accumulation),
            RasterMeta::describe("network_id", "id", &self.network.network_ids),
            RasterMeta::describe("headwater_id", "id", &self.network.headwater_ids),
            RasterMeta::describe("lac", "m", &self.lengths.lac),
            RasterMeta::describe("lfoz", "m", &self.lengths.lfoz),
            RasterMeta::describe("dist", "m", &self.lengths.dist),
            RasterMeta::describe("pixeldren", "id", &self.lengths.pixeldren),
            RasterMeta::describe("trepix", "id", &self.segments.trepix),
            RasterMeta::describe("cabepix", "id", &self.segments.cabepix),
            RasterMeta::describe("disttre", "m", &self.segments.disttre),
            RasterMeta::describe("declivpix", "m/km", &self.segments.declivpix),
            RasterMeta::describe("tempo_rio", "min", &self.channel.tempo_rio),
            RasterMeta::describe("tscabe2d", "min", &self.overland.tscabe2d),
            RasterMeta::describe("tsnaocabe2d", "min", &self.overland.tsnaocabe2d),
            RasterMeta::describe("tstodos2d", "min", &self.overland.tstodos2d),
        ];
        if let Some(pp) = &self.overland.per_pixel {
            fields.push(RasterMeta::describe("declivpixjus", "m/km", &pp.decliv_jus));
            fields.push(RasterMeta::describe("tspix", "min", &pp.ts_pix));
            fields.push(RasterMeta::describe("tspixacum", "min", &pp.ts_pix_acum));
        }
        fields.push(RasterMeta::describe("tempo_tot", "min", &self.total.tempo_tot));
        fields
    }
}

/// Validate the inputs and run every stage.
///
/// Fails before any time is computed when a layer, table or the flow graph
/// is inconsistent.
pub fn time_of_concentration(
    inputs: BasinInputs,
    params: TravelTimeParams,
) -> Result<TravelTimeResult> {
    let grid = inputs.check_dimensions()?;
    let config = RunConfig::new(grid, params)?;
    inputs.check_values()?;
    config.manning.check_coverage(&inputs.land_use, &inputs.basin)?;
    config
        .rivers
        .check_coverage(&inputs.river_class, &inputs.network, &inputs.basin)?;

    let options = &config.options;
    if options.distance == DistanceMode::Planar
        && config.grid.crs.as_ref().map_or(false, |crs| crs.is_geographic())
    {
        warn!("planar distances on a geographic grid; consider geodesic distances");
    }
    debug!(
        rows = config.grid.rows,
        cols = config.grid.cols,
        distance = ?options.distance,
        slope = ?options.slope,
        pixel_time = ?options.pixel_time,
        "run configured"
    );

    let basin = Basin::from_inputs(inputs, options)?;
    let metric = StepMetric::new(basin.grid(), options.distance);

    let connectivity = validate_connectivity(&basin, &metric)?;
    info!(
        outlet = ?connectivity.outlet,
        cells = connectivity.converged_cells,
        "flow directions converge to the outlet"
    );

    let network = enumerate_network(&basin);
    info!(
        network_cells = network.network_count(),
        headwaters = network.headwater_count(),
        "network enumerated"
    );

    let lengths = accumulate_lengths(&basin, &metric, &network);
    info!(unreached = lengths.unreached, "flow lengths accumulated");

    let segments = decompose_segments(&basin, &metric, &network);
    info!(
        segments = segments.segments.len(),
        inflow_paths = segments.inflow_paths.len(),
        "flow paths segmented"
    );

    let channel = channel_times(&basin, &metric, &network, &config.rivers)?;
    info!("channel times computed");

    let overland = overland_times(&basin, &metric, &segments, &config)?;
    info!(per_pixel = overland.per_pixel.is_some(), "overland times computed");

    let total = total_time(&basin, &network, &lengths, &channel, &overland);
    info!(
        minutes = total.time_of_concentration,
        cell = ?total.critical_cell,
        "time of concentration"
    );

    Ok(TravelTimeResult {
        accumulation: basin.accumulation().clone(),
        config,
        connectivity,
        network,
        lengths,
        segments,
        channel,
        overland,
        total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traveltime::config::SlopeMode;
    use crate::traveltime::fixtures::{valley_inputs, valley_params};
    use pixeltc_core::{ConfigError, CRS};

    #[test]
    fn test_valley_run() {
        let result = time_of_concentration(valley_inputs(), valley_params()).unwrap();
        assert_eq!(result.outlet(), (5, 3));
        assert_eq!(result.network.headwater_count(), 10);
        assert_eq!(result.total.critical_cell, Some((1, 5)));
        assert!(result.time_of_concentration() > 0.0);
        assert_eq!(result.accumulation.get(5, 3).unwrap(), 25.0);
    }

    #[test]
    fn test_algorithm_trait() {
        let algo = TimeOfConcentration;
        assert_eq!(algo.name(), "Time of Concentration");
        let direct = time_of_concentration(valley_inputs(), valley_params()).unwrap();
        let via_trait = algo.execute(valley_inputs(), valley_params()).unwrap();
        assert_eq!(direct.time_of_concentration(), via_trait.time_of_concentration());
    }

    #[test]
    fn test_default_params_are_rejected() {
        // default P24 is zero
        assert!(matches!(
            TimeOfConcentration.execute_default(valley_inputs()),
            Err(Error::InvalidParameter { name: "p24", .. })
        ));
    }

    #[test]
    fn test_output_fields() {
        let result = time_of_concentration(valley_inputs(), valley_params()).unwrap();
        let fields = result.output_fields();
        assert_eq!(fields.len(), 16);
        let tot = fields.iter().find(|f| f.name == "tempo_tot").unwrap();
        assert_eq!((tot.rows, tot.cols), (7, 7));
        assert_eq!(tot.units, "min");
        assert_eq!(tot.valid_count, 25);
        assert_eq!(tot.max, Some(result.time_of_concentration()));
        assert_eq!(tot.transform.cell_width(), 30.0);

        let mut params = valley_params();
        params.options.slope = SlopeMode::PerPixel;
        let result = time_of_concentration(valley_inputs(), params).unwrap();
        assert_eq!(result.output_fields().len(), 19);
    }

    #[test]
    fn test_crs_is_carried_to_outputs() {
        let mut inputs = valley_inputs();
        inputs.basin.set_crs(Some(CRS::from_epsg(31983)));
        let result = time_of_concentration(inputs, valley_params()).unwrap();
        let dist = result
            .output_fields()
            .into_iter()
            .find(|f| f.name == "dist")
            .unwrap();
        assert_eq!(dist.crs.as_deref(), Some("EPSG:31983"));
    }

    #[test]
    fn test_missing_manning_class_stops_run() {
        let mut inputs = valley_inputs();
        inputs.land_use.set(3, 2, 7).unwrap();
        match time_of_concentration(inputs, valley_params()) {
            Err(Error::Configuration(ConfigError::MissingManningClasses { classes })) => {
                assert_eq!(classes, vec![7]);
            }
            other => panic!("expected missing class, got {other:?}"),
        }
    }

    #[test]
    fn test_layer_mismatch_stops_run() {
        let mut inputs = valley_inputs();
        inputs.dem = Raster::new(7, 6);
        assert!(matches!(
            time_of_concentration(inputs, valley_params()),
            Err(Error::DimensionMismatch { layer: "dem", .. })
        ));
    }
}
