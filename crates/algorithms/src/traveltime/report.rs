//! Fixed-width text reports over segment decomposition results

use std::io::Write;

use pixeltc_core::Result;

use super::segments::SegmentFields;

/// One line per segment: id, headwater, position on the path and the three
/// slope estimates (m/km).
pub fn write_slope_report<W: Write>(out: &mut W, segments: &SegmentFields) -> Result<()> {
    writeln!(
        out,
        "{:>8} {:>9} {:>7} {:>12} {:>12} {:>12}",
        "segment", "headwater", "ordinal", "end_points", "mean", "weighted"
    )?;
    for s in &segments.segments {
        writeln!(
            out,
            "{:>8} {:>9} {:>7} {:>12.4} {:>12.4} {:>12.4}",
            s.id, s.headwater, s.ordinal, s.slope, s.slope_mean, s.slope_weighted
        )?;
    }
    Ok(())
}

/// Number of segments along each headwater path.
pub fn write_headwater_summary<W: Write>(out: &mut W, segments: &SegmentFields) -> Result<()> {
    writeln!(out, "{:>9} {:>8}", "headwater", "segments")?;
    for path in &segments.paths {
        writeln!(out, "{:>9} {:>8}", path.headwater, path.segment_count)?;
    }
    Ok(())
}
