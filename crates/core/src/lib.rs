//! # PixelTC Core
//!
//! Core types and traits for pixel-based watershed travel-time analysis.
//!
//! This crate provides:
//! - `Raster<T>`: Generic raster grid type
//! - `GeoTransform`, `GridSpec`: georeferencing and shared grid geometry
//! - `Direction`, `DirectionCodes`, `FlowDirectionGrid`: the D8 flow model
//! - `CRS`: spatial-reference tags
//! - `Error` / `ConfigError` and the `Algorithm` trait

pub mod crs;
pub mod error;
pub mod raster;

pub use crs::CRS;
pub use error::{Cell, ConfigError, DivergenceCause, Error, Result};
pub use raster::{
    Direction, DirectionCodes, FlowDirectionGrid, GeoTransform, GridSpec, Raster, RasterElement,
    RasterMeta,
};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::crs::CRS;
    pub use crate::error::{ConfigError, Error, Result};
    pub use crate::raster::{
        Direction, DirectionCodes, FlowDirectionGrid, GeoTransform, GridSpec, Raster,
        RasterElement,
    };
    pub use crate::Algorithm;
}

/// Core trait for algorithms that turn typed raster inputs into typed outputs.
pub trait Algorithm {
    type Input;
    type Output;
    /// Parameters controlling algorithm behavior
    type Params: Default;
    type Error: std::error::Error;

    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    fn execute(
        &self,
        input: Self::Input,
        params: Self::Params,
    ) -> std::result::Result<Self::Output, Self::Error>;

    /// Execute with default parameters
    fn execute_default(
        &self,
        input: Self::Input,
    ) -> std::result::Result<Self::Output, Self::Error> {
        self.execute(input, Self::Params::default())
    }
}
