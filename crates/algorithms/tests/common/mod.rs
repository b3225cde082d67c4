//! Synthetic basins shared by the integration tests.

#![allow(dead_code)]

use pixeltc_algorithms::traveltime::{
    BasinInputs, ManningTable, RiverClass, RiverClassTable, RunOptions, TravelTimeParams,
};
use pixeltc_core::{Direction, DirectionCodes, GeoTransform, Raster, RasterElement};

pub const CELL: f64 = 30.0;

/// `size`×`size` raster with 30 m cells, filled by `f(row, col)`
pub fn layer<T: RasterElement>(size: usize, f: impl FnMut(usize, usize) -> T) -> Raster<T> {
    let mut raster = Raster::from_fn(size, size, f);
    raster.set_transform(GeoTransform::new(0.0, size as f64 * CELL, CELL, -CELL));
    raster
}

fn code(dir: Direction) -> i32 {
    DirectionCodes::mgb_iph().code(dir)
}

/// V-shaped valley: the basin is the grid minus a one-cell frame, hillslopes
/// drain towards a channel in the middle column, which drains south.
///
/// Land use is 1 west of the channel, 2 east of it and 3 on it. River class
/// is 1 on the upper half of the channel and 2 below.
pub fn valley_inputs(size: usize) -> BasinInputs {
    let mid = size / 2;
    let inside = move |r: usize, c: usize| (1..size - 1).contains(&r) && (1..size - 1).contains(&c);
    BasinInputs {
        basin: layer(size, |r, c| u8::from(inside(r, c))),
        flow_direction: layer(size, |r, c| {
            if !inside(r, c) {
                0
            } else if c < mid {
                code(Direction::East)
            } else if c > mid {
                code(Direction::West)
            } else {
                code(Direction::South)
            }
        }),
        dem: layer(size, |r, c| {
            10.0 * (size - r) as f64 + 5.0 * (c as f64 - mid as f64).abs()
        }),
        land_use: layer(size, |_, c| match c {
            _ if c < mid => 1,
            _ if c > mid => 2,
            _ => 3,
        }),
        network: layer(size, |r, c| u8::from(inside(r, c) && c == mid)),
        river_class: layer(size, |r, c| match (inside(r, c) && c == mid, r <= size / 2) {
            (false, _) => 0,
            (true, true) => 1,
            (true, false) => 2,
        }),
        flow_accumulation: None,
    }
}

/// Every cell of a 3×3 basin drains into the centre, the only network cell.
pub fn centre_inputs() -> BasinInputs {
    let toward_centre = |r: usize, c: usize| match (r, c) {
        (0, 0) => code(Direction::SouthEast),
        (0, 1) => code(Direction::South),
        (0, 2) => code(Direction::SouthWest),
        (1, 0) => code(Direction::East),
        (1, 2) => code(Direction::West),
        (2, 0) => code(Direction::NorthEast),
        (2, 1) => code(Direction::North),
        (2, 2) => code(Direction::NorthWest),
        _ => 0,
    };
    BasinInputs {
        basin: layer(3, |_, _| 1u8),
        flow_direction: layer(3, toward_centre),
        dem: layer(3, |r, c| if (r, c) == (1, 1) { 10.0 } else { 20.0 }),
        land_use: layer(3, |_, _| 1),
        network: layer(3, |r, c| u8::from((r, c) == (1, 1))),
        river_class: layer(3, |r, c| i32::from((r, c) == (1, 1))),
        flow_accumulation: None,
    }
}

pub fn manning() -> ManningTable {
    "class n\n1 0.4\n2 0.15\n3 0.03\n".parse().unwrap()
}

pub fn rivers() -> RiverClassTable {
    RiverClassTable::from_entries([
        (
            1,
            RiverClass {
                slope: 2.0,
                manning: 0.035,
                hydraulic_radius: 1.0,
            },
        ),
        (
            2,
            RiverClass {
                slope: 1.0,
                manning: 0.03,
                hydraulic_radius: 1.5,
            },
        ),
    ])
    .unwrap()
}

pub fn params(options: RunOptions) -> TravelTimeParams {
    TravelTimeParams {
        manning: manning(),
        rivers: rivers(),
        p24: 100.0,
        options,
    }
}

/// Options that keep the border cells' own directions
pub fn unclamped() -> RunOptions {
    RunOptions {
        clamp_border_directions: false,
        ..Default::default()
    }
}
