//! Coordinate Reference System tags

use serde::{Deserialize, Serialize};
use std::fmt;

/// Spatial-reference tag carried through from the input layers to the outputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CRS {
    wkt: Option<String>,
    epsg: Option<u32>,
}

impl CRS {
    pub fn from_epsg(code: u32) -> Self {
        Self {
            wkt: None,
            epsg: Some(code),
        }
    }

    pub fn from_wkt(wkt: impl Into<String>) -> Self {
        Self {
            wkt: Some(wkt.into()),
            epsg: None,
        }
    }

    /// WGS84 geographic CRS (EPSG:4326)
    pub fn wgs84() -> Self {
        Self::from_epsg(4326)
    }

    pub fn epsg(&self) -> Option<u32> {
        self.epsg
    }

    /// Whether coordinates are longitude/latitude degrees.
    ///
    /// Only recognises EPSG:4326 and WKT starting with `GEOGCS`/`GEOGCRS`.
    pub fn is_geographic(&self) -> bool {
        if let Some(code) = self.epsg {
            return code == 4326;
        }
        self.wkt.as_deref().is_some_and(|w| {
            let w = w.trim_start();
            w.starts_with("GEOGCS") || w.starts_with("GEOGCRS")
        })
    }

    pub fn identifier(&self) -> String {
        if let Some(code) = self.epsg {
            return format!("EPSG:{}", code);
        }
        if let Some(wkt) = &self.wkt {
            let end = wkt
                .char_indices()
                .nth(50)
                .map_or(wkt.len(), |(i, _)| i);
            return format!("WKT:{}", &wkt[..end]);
        }
        "Unknown".to_string()
    }
}

impl fmt::Display for CRS {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.identifier())
    }
}
