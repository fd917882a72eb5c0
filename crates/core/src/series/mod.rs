//! Per-year raster series and the tables derived from them
//!
//! The data model flows in one direction:
//!
//! `YearPlane`s → [`ImageStack`] → [`GapFilledStack`] → [`PixelTable`]
//! → [`CleanDataset`] → [`FitTable`]
//!
//! Every stage owns its output; nothing is mutated in place.

mod fit;
mod index;
mod stack;
mod table;
mod years;

pub use fit::{FitRecord, FitTable};
pub use index::VegetationIndex;
pub use stack::{GapFilledStack, ImageStack, YearPlane};
pub use table::{CleanDataset, PixelTable};
pub use years::YearRange;
