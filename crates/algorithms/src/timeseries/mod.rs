//! Per-year stacks and their flattened tables
//!
//! - Stack builder: `(year, plane)` pairs → `[row, col, k]` image stack
//! - Gap filler: sparse years → continuous year axis with NaN planes
//! - Reshaper: `[row, col, year]` → `[pixel, year]` value and year tables

mod gap_fill;
mod reshape;
mod stack_builder;

pub use gap_fill::fill_missing_years;
pub use reshape::reshape_image_stack;
pub use stack_builder::build_image_stack;
