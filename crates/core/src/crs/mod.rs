//! Coordinate Reference System handling

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coordinate Reference System of a raster plane.
///
/// Only carried through the pipeline as metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CRS {
    /// WKT representation
    wkt: Option<String>,
    /// EPSG code if known
    epsg: Option<u32>,
    /// Latitude/longitude rather than projected coordinates
    #[serde(default)]
    geographic: bool,
}

impl CRS {
    /// Create a CRS from an EPSG code.
    ///
    /// Codes 4000-4999 are the EPSG geographic 2D block (4326, 4612, ...);
    /// everything else is taken as projected.
    pub fn from_epsg(code: u32) -> Self {
        Self {
            wkt: None,
            epsg: Some(code),
            geographic: (4000..5000).contains(&code),
        }
    }

    /// A projected CRS, e.g. a UTM zone
    pub fn projected(code: u32) -> Self {
        Self {
            wkt: None,
            epsg: Some(code),
            geographic: false,
        }
    }

    /// A geographic (lat/lon) CRS
    pub fn geographic(code: u32) -> Self {
        Self {
            wkt: None,
            epsg: Some(code),
            geographic: true,
        }
    }

    /// Create a CRS from a WKT string
    pub fn from_wkt(wkt: impl Into<String>) -> Self {
        Self {
            wkt: Some(wkt.into()),
            epsg: None,
            geographic: false,
        }
    }

    pub fn is_geographic(&self) -> bool {
        self.geographic
    }

    /// Get EPSG code if known
    pub fn epsg(&self) -> Option<u32> {
        self.epsg
    }

    /// Get WKT representation
    pub fn wkt(&self) -> Option<&str> {
        self.wkt.as_deref()
    }
}

impl fmt::Display for CRS {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.epsg, &self.wkt) {
            (Some(code), _) => write!(f, "EPSG:{}", code),
            (None, Some(wkt)) => write!(f, "{}", wkt),
            (None, None) => write!(f, "unknown"),
        }
    }
}
