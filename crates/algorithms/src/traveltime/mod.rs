//! Pixel-based time of concentration for a delineated watershed
//!
//! Stages, in run order:
//! - Connectivity validation: outlet, convergence, network connectivity
//! - Network enumeration: network cells and headwaters
//! - Flow lengths: Lac, Lfoz and distance to the network
//! - Segment decomposition: headwater paths cut at land-use changes
//! - Channel time: Manning's equation per river-class reach
//! - Overland time: SCS-lag per segment or per pixel
//! - Total time and the time of concentration
//!
//! [`time_of_concentration`] runs every stage and returns the fields of each.

mod accumulation;
mod basin;
mod channel;
mod config;
mod engine;
mod geodesic;
mod inputs;
mod length;
mod network;
mod overland;
mod report;
mod segments;
mod tables;
mod total;
mod validate;
mod walker;

pub use accumulation::{basin_accumulation, BasinAccumulation};
pub use basin::Basin;
pub use channel::{channel_times, manning_velocity, reach_time, ChannelFields};
pub use config::{DistanceMode, PixelTimeMode, RunConfig, RunOptions, SlopeMode, TravelTimeParams};
pub use engine::{time_of_concentration, TimeOfConcentration, TravelTimeResult};
pub use geodesic::{GeodesicGrid, StepMetric};
pub use inputs::BasinInputs;
pub use length::{accumulate_lengths, LengthFields};
pub use network::{enumerate_network, is_headwater, NetworkIndex};
pub use overland::{overland_times, scs_lag, OverlandFields, PerPixelFields, MAX_SLOPE, MIN_SLOPE};
pub use report::{write_headwater_summary, write_slope_report};
pub use segments::{decompose_segments, HeadwaterPath, Segment, SegmentFields};
pub use tables::{ManningTable, RiverClass, RiverClassTable};
pub use total::{total_time, TotalTime};
pub use validate::{
    check_convergence, check_monotonic_accumulation, check_network_connectivity, find_outlet,
    validate_connectivity, CellState, ConnectivityReport,
};
pub use walker::{PathWalker, Step, StopAt, WalkEnd, WalkOutcome};
