//! # regrowth core
//!
//! Core types, errors and raster I/O for post-disturbance vegetation
//! recovery analysis.
//!
//! This crate provides:
//! - `Raster<T>` with `RasterMeta` (geotransform, CRS, no-data)
//! - The per-year series data model: `YearRange`, `ImageStack`,
//!   `GapFilledStack`, `PixelTable`, `CleanDataset`, `FitTable`
//! - Native GeoTIFF reading and writing
//! - The `Algorithm` trait shared by pipeline stages

pub mod crs;
pub mod error;
pub mod io;
pub mod raster;
pub mod series;

pub use crs::CRS;
pub use error::{Error, Result};
pub use raster::{GeoTransform, Raster, RasterElement, RasterMeta};
pub use series::{
    CleanDataset, FitRecord, FitTable, GapFilledStack, ImageStack, PixelTable, VegetationIndex,
    YearPlane, YearRange,
};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::raster::{GeoTransform, Raster, RasterMeta};
    pub use crate::series::*;
    pub use crate::Algorithm;
}

/// Core trait for algorithms in regrowth.
///
/// Algorithms are pure functions that transform input data according to parameters.
pub trait Algorithm {
    /// Input type for the algorithm
    type Input;
    /// Output type for the algorithm
    type Output;
    /// Parameters controlling algorithm behavior
    type Params: Default;
    /// Error type for algorithm execution
    type Error: std::error::Error;

    /// Returns the algorithm name
    fn name(&self) -> &'static str;

    /// Returns a description of what the algorithm does
    fn description(&self) -> &'static str;

    /// Execute the algorithm
    fn execute(
        &self,
        input: Self::Input,
        params: Self::Params,
    ) -> std::result::Result<Self::Output, Self::Error>;

    /// Execute with default parameters
    fn execute_default(&self, input: Self::Input) -> std::result::Result<Self::Output, Self::Error> {
        self.execute(input, Self::Params::default())
    }
}
