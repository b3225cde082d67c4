//! Headwater paths split into land-use segments
//!
//! Each headwater path is walked down to the network and cut wherever the
//! land-use class changes. A segment ends on the first cell of the next
//! segment, or on the network cell that closes the path, so segment lengths
//! along a path add up to the headwater's distance to the network.
//!
//! Per-pixel fields belong to the first headwater (lowest id) whose path
//! crosses the pixel. Later paths over the same pixels still add their
//! segments to the table.
//!
//! Cells fed only by network cells lie on no headwater path. Once the
//! headwaters are done, every cell still unowned starts a path of its own
//! (row-major order) so that every non-network basin cell gets a segment.

use std::ops::ControlFlow;

use pixeltc_core::{Cell, Raster};
use tracing::debug;

use super::basin::Basin;
use super::config::SlopeMode;
use super::geodesic::StepMetric;
use super::network::NetworkIndex;
use super::walker::{PathWalker, StopAt, WalkEnd};

/// One land-use segment of a headwater path
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Segment {
    /// Global id, 1-based in creation order
    pub id: u32,
    /// Headwater id of the path, `0` on paths started below the network
    pub headwater: u32,
    /// Position along the path, 1-based
    pub ordinal: u32,
    pub land_use: i32,
    pub start: Cell,
    /// First cell after the segment
    pub end: Cell,
    /// Length (m)
    pub length: f64,
    pub z_start: f64,
    pub z_end: f64,
    /// Drop between the end points over the length (m/km)
    pub slope: f64,
    /// Arithmetic mean of the pixel slopes (m/km)
    pub slope_mean: f64,
    /// Pixel slopes weighted by remaining distance (m/km)
    pub slope_weighted: f64,
}

impl Segment {
    /// Slope used for travel time under `mode`
    pub fn slope_for(&self, mode: SlopeMode) -> f64 {
        match mode {
            SlopeMode::EndPoints | SlopeMode::PerPixel => self.slope,
            SlopeMode::ArithmeticMean => self.slope_mean,
            SlopeMode::DistanceWeighted => self.slope_weighted,
        }
    }
}

/// Segments produced by one walk to the network
#[derive(Debug, Clone, PartialEq)]
pub struct HeadwaterPath {
    pub headwater: u32,
    pub cell: Cell,
    /// Index of the first segment in [`SegmentFields::segments`]
    pub first_segment: usize,
    pub segment_count: usize,
    /// Path length to the network, or to the last cell when it was not reached (m)
    pub length: f64,
    pub reached_network: bool,
}

#[derive(Debug, Clone)]
pub struct SegmentFields {
    pub segments: Vec<Segment>,
    /// One entry per headwater, in id order
    pub paths: Vec<HeadwaterPath>,
    /// Paths started at cells no headwater path crosses, with `headwater` 0
    pub inflow_paths: Vec<HeadwaterPath>,
    /// Segment id owning the pixel
    pub trepix: Raster<u32>,
    /// Headwater id owning the pixel
    pub cabepix: Raster<u32>,
    /// Distance left to the end of the pixel's segment (m)
    pub disttre: Raster<f64>,
    /// Slope from the pixel to the end of its segment (m/km)
    pub declivpix: Raster<f64>,
}

impl SegmentFields {
    pub fn segment(&self, id: u32) -> Option<&Segment> {
        id.checked_sub(1)
            .and_then(|i| self.segments.get(i as usize))
    }

    /// Segments of a headwater path in downstream order
    pub fn path_segments(&self, headwater: u32) -> &[Segment] {
        headwater
            .checked_sub(1)
            .and_then(|i| self.paths.get(i as usize))
            .map(|p| &self.segments[p.first_segment..p.first_segment + p.segment_count])
            .unwrap_or(&[])
    }

    /// Segments after `segment` on its own path
    pub fn downstream_of(&self, segment: &Segment) -> &[Segment] {
        // a path's segments are contiguous; the next path restarts at ordinal 1
        let rest = self.segments.get(segment.id as usize..).unwrap_or(&[]);
        let count = rest.iter().take_while(|s| s.ordinal > 1).count();
        &rest[..count]
    }
}

pub fn decompose_segments(
    basin: &Basin,
    metric: &StepMetric,
    network: &NetworkIndex,
) -> SegmentFields {
    let walker = PathWalker::new(basin, metric, StopAt::Network);
    let mut fields = SegmentFields {
        segments: Vec::new(),
        paths: Vec::with_capacity(network.headwater_count()),
        inflow_paths: Vec::new(),
        trepix: basin.field(0),
        cabepix: basin.field(0),
        disttre: basin.nan_field(),
        declivpix: basin.nan_field(),
    };

    for (i, &start) in network.headwater_cells().iter().enumerate() {
        let path = fields.trace_path(basin, &walker, start, i as u32 + 1);
        fields.paths.push(path);
    }

    let unowned: Vec<Cell> = basin
        .cells()
        .filter(|&cell| !basin.on_network(cell) && fields.trepix.data()[cell] == 0)
        .collect();
    for start in unowned {
        // an earlier inflow path may have crossed it
        if fields.trepix.data()[start] == 0 {
            let path = fields.trace_path(basin, &walker, start, 0);
            fields.inflow_paths.push(path);
        }
    }
    if !fields.inflow_paths.is_empty() {
        debug!(paths = fields.inflow_paths.len(), "cells below the network segmented");
    }
    fields
}

impl SegmentFields {
    /// Walk from `start` to the network and cut the path at land-use changes.
    fn trace_path(
        &mut self,
        basin: &Basin,
        walker: &PathWalker<'_>,
        start: Cell,
        headwater: u32,
    ) -> HeadwaterPath {
        let mut path = vec![(start, 0.0)];
        let outcome = walker.walk(start, |step| {
            path.push((step.to, step.distance));
            ControlFlow::Continue(())
        });
        let reached = outcome.end == WalkEnd::ReachedNetwork;
        // cells that belong to segments; a reached network cell only closes the path
        let members = if reached { path.len() - 1 } else { path.len() };

        let first_segment = self.segments.len();
        let mut seg_start = 0;
        while seg_start < members {
            let class = basin.land_use(path[seg_start].0);
            let mut seg_stop = seg_start + 1;
            while seg_stop < members && basin.land_use(path[seg_stop].0) == class {
                seg_stop += 1;
            }
            let end = if seg_stop < members || reached {
                seg_stop
            } else {
                members - 1
            };
            let segment = Segment {
                id: self.segments.len() as u32 + 1,
                headwater,
                ordinal: (self.segments.len() - first_segment) as u32 + 1,
                land_use: class,
                ..Default::default()
            };
            let segment = self.fill_segment(basin, segment, &path[seg_start..seg_stop], path[end]);
            self.segments.push(segment);
            seg_start = seg_stop;
        }

        HeadwaterPath {
            headwater,
            cell: start,
            first_segment,
            segment_count: self.segments.len() - first_segment,
            length: outcome.distance,
            reached_network: reached,
        }
    }

    /// Measure a segment from its member cells and end cell, and claim unowned pixels.
    fn fill_segment(
        &mut self,
        basin: &Basin,
        mut segment: Segment,
        members: &[(Cell, f64)],
        (end, end_distance): (Cell, f64),
    ) -> Segment {
        let (start, start_distance) = members[0];
        let z_end = basin.elevation(end);
        segment.start = start;
        segment.end = end;
        segment.length = end_distance - start_distance;
        segment.z_start = basin.elevation(start);
        segment.z_end = z_end;
        segment.slope = slope_m_per_km(segment.z_start - z_end, segment.length);

        let mut sum = 0.0;
        let mut weighted = 0.0;
        let mut weights = 0.0;
        for &(cell, distance) in members {
            let remaining = end_distance - distance;
            let slope = slope_m_per_km(basin.elevation(cell) - z_end, remaining);
            sum += slope;
            weighted += slope * remaining;
            weights += remaining;

            if self.trepix.data()[cell] == 0 {
                self.trepix.data_mut()[cell] = segment.id;
                self.cabepix.data_mut()[cell] = segment.headwater;
                self.disttre.data_mut()[cell] = remaining;
                self.declivpix.data_mut()[cell] = slope;
            }
        }
        segment.slope_mean = sum / members.len() as f64;
        segment.slope_weighted = if weights > 0.0 {
            weighted / weights
        } else {
            segment.slope
        };
        segment
    }
}

/// Elevation drop over a length in metres, as m/km; zero over zero length.
pub(crate) fn slope_m_per_km(drop: f64, length: f64) -> f64 {
    if length > 0.0 {
        drop / (length / 1000.0)
    } else {
        0.0
    }
}
