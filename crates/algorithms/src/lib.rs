//! # PixelTC Algorithms
//!
//! Watershed travel-time analysis on D8 flow-direction grids.
//!
//! ## Modules
//!
//! - **traveltime**: connectivity validation, flow lengths, land-use segments,
//!   channel (Manning) and overland (SCS-lag) times, time of concentration

pub mod traveltime;

mod maybe_rayon;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::traveltime::{
        time_of_concentration, validate_connectivity, write_headwater_summary,
        write_slope_report, BasinInputs, DistanceMode, ManningTable, PixelTimeMode,
        RiverClass, RiverClassTable, RunOptions, SlopeMode, TimeOfConcentration,
        TravelTimeParams, TravelTimeResult,
    };
    pub use pixeltc_core::prelude::*;
}
