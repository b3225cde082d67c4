//! Raster data structures and the D8 flow model

mod element;
mod flow;
mod geotransform;
mod grid;
mod grid_spec;
mod neighborhood;

pub use element::RasterElement;
pub use flow::{DirectionCodes, FlowDirectionGrid};
pub use geotransform::GeoTransform;
pub use grid::{Raster, RasterStatistics};
pub use grid_spec::{GridSpec, RasterMeta};
pub use neighborhood::{D8Neighbors, Direction};
