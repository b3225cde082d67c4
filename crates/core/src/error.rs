//! Error types for PixelTC

use std::fmt;
use thiserror::Error;

/// A raster cell as `(row, col)`.
pub type Cell = (usize, usize);

/// Main error type for PixelTC operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid raster dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("Index out of bounds: ({row}, {col}) in raster of size ({rows}, {cols})")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("Layer '{layer}' size mismatch: expected ({er}, {ec}), got ({ar}, {ac})")]
    DimensionMismatch {
        layer: &'static str,
        er: usize,
        ec: usize,
        ar: usize,
        ac: usize,
    },

    #[error("Layer '{layer}' cell size mismatch: expected {expected:?}, got {actual:?}")]
    CellSizeMismatch {
        layer: &'static str,
        expected: (f64, f64),
        actual: (f64, f64),
    },

    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("Invalid value in '{layer}' at ({row}, {col}): {value} ({reason})")]
    InvalidValue {
        layer: &'static str,
        row: usize,
        col: usize,
        value: String,
        reason: &'static str,
    },

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("No outlet: flow accumulation has no valid value inside the basin")]
    NoOutlet,

    #[error(
        "Flow from {start:?} does not reach outlet {outlet:?} ({cause}); last valid cell {last_valid:?}"
    )]
    ConvergenceFailure {
        start: Cell,
        last_valid: Cell,
        outlet: Cell,
        cause: DivergenceCause,
    },

    #[error("Drainage network cell ({row}, {col}) is not connected to the outlet")]
    DisconnectedNetwork { row: usize, col: usize },

    #[error("Flow accumulation does not increase toward the outlet at ({row}, {col}): {value}")]
    AccumulationViolation { row: usize, col: usize, value: f64 },

    #[error("{0}")]
    Other(String),
}

/// Why a downstream path failed to reach the outlet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DivergenceCause {
    /// The path revisits one of its own cells
    Cycle,
    /// The path leaves the basin or the grid before the outlet
    LeftBasin,
    /// A cell on the path has no flow direction
    Sink,
    /// The walk ran for more steps than the grid has cells
    StepLimit,
}

impl fmt::Display for DivergenceCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            DivergenceCause::Cycle => "cycle",
            DivergenceCause::LeftBasin => "left the basin",
            DivergenceCause::Sink => "sink",
            DivergenceCause::StepLimit => "step limit exceeded",
        };
        f.write_str(text)
    }
}

/// Problems with the run configuration: code tables and lookup tables.
///
/// These are detected before any computation starts.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("direction codes declared more than once: {codes:?}")]
    DuplicateDirectionCodes { codes: Vec<i32> },

    #[error("direction codes must be positive, got {code}")]
    NonPositiveDirectionCode { code: i32 },

    #[error("flow-direction grid uses undeclared codes inside the basin: {codes:?}")]
    UndeclaredDirectionCodes { codes: Vec<i32> },

    #[error("land-use classes without a Manning coefficient: {classes:?}")]
    MissingManningClasses { classes: Vec<i32> },

    #[error("land-use classes with non-positive Manning coefficient: {classes:?}")]
    NonPositiveManning { classes: Vec<i32> },

    #[error("river classes missing from the river table: {classes:?}")]
    MissingRiverClasses { classes: Vec<i32> },

    #[error("river class {class}: {field} must be positive, got {value}")]
    InvalidRiverClass {
        class: i32,
        field: &'static str,
        value: f64,
    },

    #[error("{table} table declares class {class} more than once")]
    DuplicateTableClass { table: &'static str, class: i32 },

    #[error("{table} table, line {line}: {reason}")]
    MalformedTable {
        table: &'static str,
        line: usize,
        reason: String,
    },
}

/// Result type alias for PixelTC operations
pub type Result<T> = std::result::Result<T, Error>;
