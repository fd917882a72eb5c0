//! GeoTIFF reading and writing for yearly composites and metric rasters

mod native;

pub use native::{read_geotiff, write_geotiff, GeoTiffOptions};
