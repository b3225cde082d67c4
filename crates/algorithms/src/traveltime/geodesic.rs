//! Step lengths between neighbouring cells
//!
//! Planar grids use the cell width and height directly. Geographic grids
//! (degrees) are measured on the WGS84 ellipsoid from the corners of the
//! cell the step leaves:
//!
//! - N = a / sqrt(1 - e² sin²φ), φ the cell's mid latitude
//! - dx = N·cos φ·Δλ, dy = N·Δφ
//! - diagonal = sqrt(dx² + dy²)

use pixeltc_core::{Cell, Direction, GridSpec};

use super::config::DistanceMode;

/// WGS84 semi-major axis (km)
const SEMI_MAJOR_KM: f64 = 6378.137;
/// WGS84 semi-minor axis (km)
const SEMI_MINOR_KM: f64 = 6356.752;

/// Length of one D8 step, in metres.
#[derive(Debug, Clone, Copy)]
pub enum StepMetric {
    Planar { width: f64, height: f64 },
    Geodesic(GeodesicGrid),
}

impl StepMetric {
    pub fn new(grid: &GridSpec, mode: DistanceMode) -> Self {
        match mode {
            DistanceMode::Planar => StepMetric::Planar {
                width: grid.cell_width(),
                height: grid.cell_height(),
            },
            DistanceMode::Geodesic => StepMetric::Geodesic(GeodesicGrid::new(grid)),
        }
    }

    /// Length of the step leaving `from` in direction `dir`
    pub fn length(&self, from: Cell, dir: Direction) -> f64 {
        let (dx, dy) = match self {
            StepMetric::Planar { width, height } => (*width, *height),
            StepMetric::Geodesic(geo) => geo.cell_extent(from.0),
        };
        if dir.is_diagonal() {
            dx.hypot(dy)
        } else if dir.is_east_west() {
            dx
        } else {
            dy
        }
    }
}

/// Row geometry of a north-up longitude/latitude grid.
#[derive(Debug, Clone, Copy)]
pub struct GeodesicGrid {
    origin_lat: f64,
    d_lon: f64,
    d_lat: f64,
}

impl GeodesicGrid {
    pub fn new(grid: &GridSpec) -> Self {
        Self {
            origin_lat: grid.transform.origin_y,
            d_lon: grid.transform.pixel_width.abs(),
            d_lat: grid.transform.pixel_height,
        }
    }

    /// East-west and north-south extent (m) of a cell in `row`.
    pub fn cell_extent(&self, row: usize) -> (f64, f64) {
        let top = self.origin_lat + row as f64 * self.d_lat;
        let bottom = top + self.d_lat;
        let phi = ((top + bottom) / 2.0).to_radians();

        let f = (SEMI_MAJOR_KM - SEMI_MINOR_KM) / SEMI_MAJOR_KM;
        let e2 = 2.0 * f - f * f;
        let rn = SEMI_MAJOR_KM / (1.0 - e2 * phi.sin().powi(2)).sqrt();
        let r_parallel = rn * phi.cos();

        let dx = r_parallel * self.d_lon.to_radians();
        let dy = rn * self.d_lat.abs().to_radians();
        (dx * 1000.0, dy * 1000.0)
    }
}
