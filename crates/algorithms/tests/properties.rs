//! Property tests over random grids.

mod common;

use approx::relative_eq;
use common::layer;
use pixeltc_algorithms::traveltime::{
    accumulate_lengths, decompose_segments, enumerate_network, is_headwater, scs_lag, Basin,
    BasinInputs, DistanceMode, PathWalker, RunOptions, StepMetric, StopAt, WalkEnd, MAX_SLOPE,
    MIN_SLOPE,
};
use pixeltc_core::raster::D8Neighbors;
use pixeltc_core::{Direction, DirectionCodes};
use proptest::prelude::*;

const SIZE: usize = 8;

fn inputs(directions: Vec<i32>, network: Vec<bool>, dem: Vec<f64>) -> BasinInputs {
    BasinInputs {
        basin: layer(SIZE, |_, _| 1u8),
        flow_direction: layer(SIZE, |r, c| directions[r * SIZE + c]),
        dem: layer(SIZE, |r, c| dem[r * SIZE + c]),
        land_use: layer(SIZE, |r, c| 1 + ((r + c) % 3) as i32),
        network: layer(SIZE, |r, c| u8::from(network[r * SIZE + c])),
        river_class: layer(SIZE, |r, c| i32::from(network[r * SIZE + c])),
        flow_accumulation: None,
    }
}

fn basin(inputs: BasinInputs) -> Basin {
    let options = RunOptions {
        clamp_border_directions: false,
        ..Default::default()
    };
    Basin::from_inputs(inputs, &options).unwrap()
}

/// Steepest-descent D8 codes; cells without a lower neighbour are sinks.
fn steepest_descent(dem: &[f64]) -> Vec<i32> {
    let codes = DirectionCodes::mgb_iph();
    (0..SIZE * SIZE)
        .map(|i| {
            let (row, col) = (i / SIZE, i % SIZE);
            let z = dem[i];
            D8Neighbors::new(row, col, SIZE, SIZE)
                .map(|(dir, r, c)| {
                    let run = if dir.is_diagonal() { std::f64::consts::SQRT_2 } else { 1.0 };
                    (dir, (z - dem[r * SIZE + c]) / run)
                })
                .filter(|&(_, drop)| drop > 0.0)
                .max_by(|a, b| a.1.total_cmp(&b.1))
                .map_or(0, |(dir, _)| codes.code(dir))
        })
        .collect()
}

fn any_code() -> impl Strategy<Value = i32> {
    let mut codes: Vec<i32> = Direction::ALL
        .iter()
        .map(|&d| DirectionCodes::mgb_iph().code(d))
        .collect();
    codes.push(0);
    prop::sample::select(codes)
}

fn terrain() -> impl Strategy<Value = (Vec<f64>, Vec<bool>)> {
    (
        prop::collection::vec(0.0..500.0f64, SIZE * SIZE),
        prop::collection::vec(prop::bool::weighted(0.2), SIZE * SIZE),
    )
}

proptest! {
    #[test]
    fn walks_terminate_within_grid_size(
        directions in prop::collection::vec(any_code(), SIZE * SIZE),
        network in prop::collection::vec(prop::bool::weighted(0.2), SIZE * SIZE),
    ) {
        let basin = basin(inputs(directions, network, vec![100.0; SIZE * SIZE]));
        let metric = StepMetric::new(basin.grid(), DistanceMode::Planar);
        for stop in [StopAt::Network, StopAt::BasinExit] {
            let walker = PathWalker::new(&basin, &metric, stop);
            for cell in basin.cells() {
                let outcome = walker.run(cell);
                prop_assert!(outcome.steps < SIZE * SIZE);
                prop_assert_ne!(outcome.end, WalkEnd::StepLimitExceeded);
            }
        }
    }

    #[test]
    fn headwaters_have_no_inflow((dem, network) in terrain()) {
        let basin = basin(inputs(steepest_descent(&dem), network, dem));
        let index = enumerate_network(&basin);
        let flow = basin.flow();

        let expected = basin
            .cells()
            .filter(|&cell| {
                !basin.on_network(cell)
                    && !D8Neighbors::new(cell.0, cell.1, SIZE, SIZE)
                        .any(|(_, r, c)| flow.drains_into(r, c, cell))
            })
            .count();
        prop_assert_eq!(index.headwater_count(), expected);
        for &cell in index.headwater_cells() {
            prop_assert!(is_headwater(&basin, cell));
        }

        let again = enumerate_network(&basin);
        prop_assert_eq!(again.headwater_cells(), index.headwater_cells());
        prop_assert_eq!(again.network_cells(), index.network_cells());
    }

    #[test]
    fn accumulated_length_grows_downstream((dem, network) in terrain()) {
        let basin = basin(inputs(steepest_descent(&dem), network, dem));
        let metric = StepMetric::new(basin.grid(), DistanceMode::Planar);
        let index = enumerate_network(&basin);
        let lengths = accumulate_lengths(&basin, &metric, &index);
        let lac = lengths.lac.data();

        for cell in basin.cells() {
            if lac[cell].is_nan() {
                continue;
            }
            if let Some(next) = basin.flow().downstream(cell.0, cell.1) {
                prop_assert!(lac[next] >= lac[cell]);
            }
        }
    }

    #[test]
    fn segments_add_up_to_distance((dem, network) in terrain()) {
        let basin = basin(inputs(steepest_descent(&dem), network, dem));
        let metric = StepMetric::new(basin.grid(), DistanceMode::Planar);
        let index = enumerate_network(&basin);
        let lengths = accumulate_lengths(&basin, &metric, &index);
        let segments = decompose_segments(&basin, &metric, &index);

        let paths = segments.paths.iter().chain(&segments.inflow_paths);
        for path in paths.filter(|p| p.reached_network) {
            let total: f64 = segments.segments[path.first_segment..][..path.segment_count]
                .iter()
                .map(|s| s.length)
                .sum();
            let dist = lengths.dist.data()[path.cell];
            prop_assert!(relative_eq!(total, dist, max_relative = 1e-6));
        }
    }

    #[test]
    fn every_cell_off_the_network_has_a_segment((dem, network) in terrain()) {
        let basin = basin(inputs(steepest_descent(&dem), network, dem));
        let metric = StepMetric::new(basin.grid(), DistanceMode::Planar);
        let segments = decompose_segments(&basin, &metric, &enumerate_network(&basin));
        for cell in basin.cells().filter(|&cell| !basin.on_network(cell)) {
            prop_assert_ne!(segments.trepix.data()[cell], 0);
        }
    }

    #[test]
    fn overland_slope_is_clamped(
        slope in -1000.0..2000.0f64,
        n in 0.01..0.8f64,
        length in 1.0..500.0f64,
    ) {
        let clamped = slope.clamp(MIN_SLOPE, MAX_SLOPE);
        prop_assert_eq!(scs_lag(n, length, 80.0, slope), scs_lag(n, length, 80.0, clamped));
    }
}
