//! Vegetation index kinds

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Vegetation index carried by a stack of composites.
///
/// The tag never changes the math; it labels outputs and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum VegetationIndex {
    /// Normalized Burn Ratio
    Nbr,
    /// Normalized Difference Vegetation Index
    Ndvi,
    /// Soil Adjusted Vegetation Index
    Savi,
}

impl fmt::Display for VegetationIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VegetationIndex::Nbr => "NBR",
            VegetationIndex::Ndvi => "NDVI",
            VegetationIndex::Savi => "SAVI",
        };
        f.write_str(name)
    }
}

impl FromStr for VegetationIndex {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "nbr" => Ok(VegetationIndex::Nbr),
            "ndvi" => Ok(VegetationIndex::Ndvi),
            "savi" => Ok(VegetationIndex::Savi),
            _ => Err(Error::InvalidParameter {
                name: "vegetation_index",
                value: s.to_string(),
                reason: "expected one of NBR, NDVI, SAVI".into(),
            }),
        }
    }
}
