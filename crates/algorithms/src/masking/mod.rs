//! Per-pixel masks and the combined filter
//!
//! - Validity: enough non-missing years across the full axis
//! - Disturbance: vegetation dropped enough between baseline and event
//! - Filter: blank out every year of pixels failing either mask

mod disturbance;
mod filter;
mod validity;

pub use disturbance::{disturbed_pixel_mask, DisturbanceParams};
pub use filter::{apply_pixel_filter, combined_filter};
pub use validity::{valid_pixel_mask, ValidityParams};
