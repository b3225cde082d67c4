//! Total travel time to the outlet and time of concentration

use pixeltc_core::{Cell, Raster};

use super::basin::Basin;
use super::channel::ChannelFields;
use super::length::LengthFields;
use super::network::NetworkIndex;
use super::overland::OverlandFields;

#[derive(Debug, Clone)]
pub struct TotalTime {
    /// Travel time from each basin cell to the outlet (min)
    pub tempo_tot: Raster<f64>,
    /// Time of concentration: the largest `tempo_tot` in the basin (min)
    pub time_of_concentration: f64,
    /// Cell where the time of concentration is reached
    pub critical_cell: Option<Cell>,
}

/// Combine overland and channel times.
///
/// Network cells take their channel time. Other cells add the overland time
/// to the network (pixel accumulation when available) to the channel time of
/// the network cell they reach. Cells that never reach the network stay `NaN`.
pub fn total_time(
    basin: &Basin,
    network: &NetworkIndex,
    lengths: &LengthFields,
    channel: &ChannelFields,
    overland: &OverlandFields,
) -> TotalTime {
    let overland_field = match &overland.per_pixel {
        Some(pp) => &pp.ts_pix_acum,
        None => &overland.tstodos2d,
    };
    let tempo_rio = channel.tempo_rio.data();

    let mut tempo_tot = basin.nan_field();
    let mut best: Option<(Cell, f64)> = None;
    for cell in basin.cells() {
        let time = if basin.on_network(cell) {
            tempo_rio[cell]
        } else {
            match network.network_cell(lengths.pixeldren.data()[cell]) {
                Some(reached) => overland_field.data()[cell] + tempo_rio[reached],
                None => f64::NAN,
            }
        };
        tempo_tot.data_mut()[cell] = time;
        if !time.is_nan() && best.map_or(true, |(_, t)| time > t) {
            best = Some((cell, time));
        }
    }

    TotalTime {
        tempo_tot,
        time_of_concentration: best.map_or(f64::NAN, |(_, t)| t),
        critical_cell: best.map(|(cell, _)| cell),
    }
}
