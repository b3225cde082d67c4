//! Land-use roughness and river-class lookup tables
//!
//! Both tables are keyed by the class id found in the raster, never by row
//! position. The text form is whitespace separated, one class per line:
//!
//! ```text
//! land_use  manning          class  slope_m_km  manning  radius_m
//! 1         0.40             1      2.0         0.035    1.0
//! ```
//!
//! Header lines, `#` comments and the single-number count line some files
//! carry are skipped.

use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

use pixeltc_core::{ConfigError, Raster};

/// Land-use class to Manning roughness coefficient
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ManningTable {
    classes: BTreeMap<i32, f64>,
}

impl ManningTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I>(pairs: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (i32, f64)>,
    {
        let mut table = Self::new();
        for (class, n) in pairs {
            table.insert(class, n)?;
        }
        Ok(table)
    }

    pub fn insert(&mut self, class: i32, n: f64) -> Result<(), ConfigError> {
        if self.classes.insert(class, n).is_some() {
            return Err(ConfigError::DuplicateTableClass {
                table: "manning",
                class,
            });
        }
        Ok(())
    }

    pub fn get(&self, class: i32) -> Option<f64> {
        self.classes.get(&class).copied()
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Every land-use class present inside the basin must have a positive coefficient.
    pub fn check_coverage(
        &self,
        land_use: &Raster<i32>,
        basin: &Raster<u8>,
    ) -> Result<(), ConfigError> {
        let present = classes_in(land_use, basin);
        let missing: Vec<i32> = present
            .iter()
            .copied()
            .filter(|c| !self.classes.contains_key(c))
            .collect();
        if !missing.is_empty() {
            return Err(ConfigError::MissingManningClasses { classes: missing });
        }
        let non_positive: Vec<i32> = present
            .into_iter()
            .filter(|c| self.get(*c).map_or(false, |n| !(n > 0.0)))
            .collect();
        if !non_positive.is_empty() {
            return Err(ConfigError::NonPositiveManning {
                classes: non_positive,
            });
        }
        Ok(())
    }
}

impl FromStr for ManningTable {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut table = Self::new();
        for (line, fields) in data_rows("manning", s, 2)? {
            table.insert(class_id("manning", line, fields[0])?, fields[1])?;
        }
        Ok(table)
    }
}

/// Channel characteristics of one river class
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiverClass {
    /// Bed slope (m/km)
    pub slope: f64,
    /// Manning roughness
    pub manning: f64,
    /// Hydraulic radius (m)
    pub hydraulic_radius: f64,
}

/// River class to channel characteristics
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RiverClassTable {
    classes: BTreeMap<i32, RiverClass>,
}

impl RiverClassTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries<I>(entries: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (i32, RiverClass)>,
    {
        let mut table = Self::new();
        for (class, river) in entries {
            table.insert(class, river)?;
        }
        Ok(table)
    }

    pub fn insert(&mut self, class: i32, river: RiverClass) -> Result<(), ConfigError> {
        if self.classes.insert(class, river).is_some() {
            return Err(ConfigError::DuplicateTableClass {
                table: "river",
                class,
            });
        }
        Ok(())
    }

    pub fn get(&self, class: i32) -> Option<&RiverClass> {
        self.classes.get(&class)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Slope, roughness and hydraulic radius must all be strictly positive.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (&class, river) in &self.classes {
            let fields = [
                ("slope", river.slope),
                ("manning", river.manning),
                ("hydraulic_radius", river.hydraulic_radius),
            ];
            if let Some(&(field, value)) = fields.iter().find(|(_, v)| !(*v > 0.0)) {
                return Err(ConfigError::InvalidRiverClass {
                    class,
                    field,
                    value,
                });
            }
        }
        Ok(())
    }

    /// Every river class found on network cells inside the basin must be declared.
    pub fn check_coverage(
        &self,
        river_class: &Raster<i32>,
        network: &Raster<u8>,
        basin: &Raster<u8>,
    ) -> Result<(), ConfigError> {
        let missing: Vec<i32> = river_class
            .data()
            .indexed_iter()
            .filter(|&(cell, _)| basin.data()[cell] == 1 && network.data()[cell] == 1)
            .map(|(_, &class)| class)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .filter(|c| !self.classes.contains_key(c))
            .collect();
        if !missing.is_empty() {
            return Err(ConfigError::MissingRiverClasses { classes: missing });
        }
        Ok(())
    }
}

impl FromStr for RiverClassTable {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut table = Self::new();
        for (line, f) in data_rows("river", s, 4)? {
            let river = RiverClass {
                slope: f[1],
                manning: f[2],
                hydraulic_radius: f[3],
            };
            table.insert(class_id("river", line, f[0])?, river)?;
        }
        table.validate()?;
        Ok(table)
    }
}

fn classes_in(values: &Raster<i32>, basin: &Raster<u8>) -> BTreeSet<i32> {
    values
        .data()
        .indexed_iter()
        .filter(|&(cell, _)| basin.data()[cell] == 1)
        .map(|(_, &v)| v)
        .collect()
}

/// Numeric rows of a table, with their 1-based line numbers.
fn data_rows(
    table: &'static str,
    text: &str,
    width: usize,
) -> Result<Vec<(usize, Vec<f64>)>, ConfigError> {
    let mut rows = Vec::new();
    for (i, raw) in text.lines().enumerate() {
        let line = raw.split('#').next().unwrap_or("").trim();
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let numeric_head = tokens.first().map_or(false, |t| t.parse::<f64>().is_ok());
        if !numeric_head || tokens.len() == 1 {
            continue;
        }
        if tokens.len() != width {
            return Err(ConfigError::MalformedTable {
                table,
                line: i + 1,
                reason: format!("expected {} columns, found {}", width, tokens.len()),
            });
        }
        let values = tokens
            .iter()
            .map(|t| t.parse::<f64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| ConfigError::MalformedTable {
                table,
                line: i + 1,
                reason: e.to_string(),
            })?;
        rows.push((i + 1, values));
    }
    Ok(rows)
}

fn class_id(table: &'static str, line: usize, value: f64) -> Result<i32, ConfigError> {
    if value.fract() != 0.0 || value < i32::MIN as f64 || value > i32::MAX as f64 {
        return Err(ConfigError::MalformedTable {
            table,
            line,
            reason: format!("class id {} is not an integer", value),
        });
    }
    Ok(value as i32)
}
