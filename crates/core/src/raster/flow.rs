//! Flow-direction code tables and the decoded D8 direction grid

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::raster::{Direction, Raster};

/// Compass azimuths accepted as an alternate direction encoding.
const DEGREE_CODES: [(i32, Direction); 8] = [
    (45, Direction::NorthEast),
    (90, Direction::East),
    (135, Direction::SouthEast),
    (180, Direction::South),
    (225, Direction::SouthWest),
    (270, Direction::West),
    (315, Direction::NorthWest),
    (360, Direction::North),
];

/// User-declared mapping from raw raster codes to D8 directions.
///
/// `codes[i]` is the raw code of `Direction::ALL[i]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectionCodes {
    codes: [i32; 8],
}

impl DirectionCodes {
    /// Codes listed in `Direction::ALL` order (NE, E, SE, S, SW, W, NW, N)
    pub fn new(codes: [i32; 8]) -> Self {
        Self { codes }
    }

    /// Power-of-two encoding: 1=NE 2=E 4=SE 8=S 16=SW 32=W 64=NW 128=N
    pub fn mgb_iph() -> Self {
        Self::new([1, 2, 4, 8, 16, 32, 64, 128])
    }

    /// ArcGIS encoding: 1=E 2=SE 4=S 8=SW 16=W 32=NW 64=N 128=NE
    pub fn arcgis() -> Self {
        Self::new([128, 1, 2, 4, 8, 16, 32, 64])
    }

    pub fn code(&self, dir: Direction) -> i32 {
        self.codes[dir as usize]
    }

    pub fn decode(&self, code: i32) -> Option<Direction> {
        self.codes
            .iter()
            .position(|&c| c == code)
            .map(|i| Direction::ALL[i])
    }

    pub fn max_code(&self) -> i32 {
        self.codes.iter().copied().max().unwrap_or(0)
    }

    /// Rejects non-positive and repeated codes.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if let Some(&code) = self.codes.iter().find(|&&c| c <= 0) {
            return Err(ConfigError::NonPositiveDirectionCode { code });
        }
        let mut seen = BTreeSet::new();
        let dups: BTreeSet<i32> = self
            .codes
            .iter()
            .copied()
            .filter(|&c| !seen.insert(c))
            .collect();
        if !dups.is_empty() {
            return Err(ConfigError::DuplicateDirectionCodes {
                codes: dups.into_iter().collect(),
            });
        }
        Ok(())
    }

    /// Translate a compass-azimuth code into this table's code for the same direction.
    fn from_degrees(&self, raw: i32) -> i32 {
        DEGREE_CODES
            .iter()
            .find(|(deg, _)| *deg == raw)
            .map_or(raw, |&(_, dir)| self.code(dir))
    }
}

impl Default for DirectionCodes {
    fn default() -> Self {
        Self::mgb_iph()
    }
}

/// Decoded D8 flow directions.
///
/// Cells store `Direction::index()`, with `0` for cells that have no
/// direction (sinks, non-positive codes, undeclared codes outside the basin).
#[derive(Debug, Clone)]
pub struct FlowDirectionGrid {
    dirs: Raster<u8>,
}

impl FlowDirectionGrid {
    /// Decode a raw code raster through `codes`.
    ///
    /// When the largest raw code exceeds the largest declared code, the grid is
    /// taken to be in compass azimuths (45..=360) and remapped first. Positive
    /// codes inside the basin that the table does not declare are a
    /// configuration error. With `clamp_borders`, border cells are forced to
    /// point off the grid: top row N, bottom row S, then left column W and
    /// right column E, so corners follow the column rule.
    pub fn decode(
        raw: &Raster<i32>,
        basin: &Raster<u8>,
        codes: &DirectionCodes,
        clamp_borders: bool,
    ) -> Result<Self> {
        codes.validate()?;
        let (rows, cols) = raw.shape();
        let max_raw = raw.data().iter().copied().max().unwrap_or(0);
        let degrees = max_raw > codes.max_code();

        let mut undeclared = BTreeSet::new();
        let mut dirs: Raster<u8> = raw.with_same_meta();
        for ((row, col), &value) in raw.data().indexed_iter() {
            let code = if degrees { codes.from_degrees(value) } else { value };
            if code <= 0 {
                continue;
            }
            match codes.decode(code) {
                Some(dir) => dirs.data_mut()[(row, col)] = dir.index(),
                None if basin.data().get((row, col)) == Some(&1) => {
                    undeclared.insert(value);
                }
                None => {}
            }
        }
        if !undeclared.is_empty() {
            return Err(ConfigError::UndeclaredDirectionCodes {
                codes: undeclared.into_iter().collect(),
            }
            .into());
        }

        if clamp_borders && rows > 0 && cols > 0 {
            let data = dirs.data_mut();
            for col in 0..cols {
                data[(0, col)] = Direction::North.index();
                data[(rows - 1, col)] = Direction::South.index();
            }
            for row in 0..rows {
                data[(row, 0)] = Direction::West.index();
                data[(row, cols - 1)] = Direction::East.index();
            }
        }

        Ok(Self { dirs })
    }

    pub fn shape(&self) -> (usize, usize) {
        self.dirs.shape()
    }

    pub fn direction(&self, row: usize, col: usize) -> Option<Direction> {
        self.dirs
            .data()
            .get((row, col))
            .and_then(|&i| Direction::from_index(i))
    }

    /// Next cell downstream, or `None` for sinks and flow off the grid
    pub fn downstream(&self, row: usize, col: usize) -> Option<(usize, usize)> {
        let (rows, cols) = self.shape();
        self.direction(row, col)?.step(row, col, rows, cols)
    }

    /// True if the cell at `(row, col)` drains into `(to_row, to_col)`
    pub fn drains_into(&self, row: usize, col: usize, to: (usize, usize)) -> bool {
        self.downstream(row, col) == Some(to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn full_basin(rows: usize, cols: usize) -> Raster<u8> {
        Raster::filled(rows, cols, 1)
    }

    #[test]
    fn test_presets_are_valid_permutations() {
        for codes in [DirectionCodes::mgb_iph(), DirectionCodes::arcgis()] {
            codes.validate().unwrap();
            for dir in Direction::ALL {
                assert_eq!(codes.decode(codes.code(dir)), Some(dir));
            }
        }
        assert_eq!(DirectionCodes::arcgis().decode(1), Some(Direction::East));
        assert_eq!(DirectionCodes::mgb_iph().decode(1), Some(Direction::NorthEast));
    }

    #[test]
    fn test_duplicate_codes_rejected() {
        let codes = DirectionCodes::new([1, 2, 4, 8, 16, 32, 64, 64]);
        assert_eq!(
            codes.validate(),
            Err(ConfigError::DuplicateDirectionCodes { codes: vec![64] })
        );
    }

    #[test]
    fn test_decode_without_clamp() {
        let raw = Raster::from_vec(vec![2, 8, 0, 32], 2, 2).unwrap();
        let grid =
            FlowDirectionGrid::decode(&raw, &full_basin(2, 2), &DirectionCodes::default(), false)
                .unwrap();
        assert_eq!(grid.direction(0, 0), Some(Direction::East));
        assert_eq!(grid.direction(0, 1), Some(Direction::South));
        assert_eq!(grid.direction(1, 0), None);
        assert_eq!(grid.downstream(0, 0), Some((0, 1)));
        assert_eq!(grid.downstream(1, 1), Some((1, 0)));
        assert_eq!(grid.downstream(0, 1), Some((1, 1)));
    }

    #[test]
    fn test_border_clamp_corners_follow_columns() {
        let raw = Raster::filled(3, 3, 8);
        let grid =
            FlowDirectionGrid::decode(&raw, &full_basin(3, 3), &DirectionCodes::default(), true)
                .unwrap();
        assert_eq!(grid.direction(0, 1), Some(Direction::North));
        assert_eq!(grid.direction(2, 1), Some(Direction::South));
        assert_eq!(grid.direction(1, 0), Some(Direction::West));
        assert_eq!(grid.direction(0, 0), Some(Direction::West));
        assert_eq!(grid.direction(2, 2), Some(Direction::East));
        assert_eq!(grid.direction(1, 1), Some(Direction::South));
    }

    #[test]
    fn test_degree_grid_is_remapped() {
        let raw = Raster::from_vec(vec![90, 180, 360, 45], 2, 2).unwrap();
        let grid =
            FlowDirectionGrid::decode(&raw, &full_basin(2, 2), &DirectionCodes::arcgis(), false)
                .unwrap();
        assert_eq!(grid.direction(0, 0), Some(Direction::East));
        assert_eq!(grid.direction(0, 1), Some(Direction::South));
        assert_eq!(grid.direction(1, 0), Some(Direction::North));
        assert_eq!(grid.direction(1, 1), Some(Direction::NorthEast));
    }

    #[test]
    fn test_undeclared_code_in_basin_is_fatal() {
        let raw = Raster::from_vec(vec![2, 3, 5, 8], 2, 2).unwrap();
        let mut basin = full_basin(2, 2);
        basin.set(1, 0, 0).unwrap();
        let err = FlowDirectionGrid::decode(&raw, &basin, &DirectionCodes::default(), false)
            .unwrap_err();
        match err {
            Error::Configuration(ConfigError::UndeclaredDirectionCodes { codes }) => {
                assert_eq!(codes, vec![3]);
            }
            other => panic!("expected undeclared codes, got {other:?}"),
        }
    }
}
