//! # regrowth parallel
//!
//! Execution strategies for the per-pixel stages.
//!
//! This crate provides:
//! - `ProcessingMode`: sequential, all cores, or a fixed thread count
//! - `PixelBatches`: contiguous pixel ranges for streaming large tables

pub mod batch;
pub mod strategy;

pub use batch::{PixelBatch, PixelBatches};
pub use strategy::{num_cpus, ParallelStrategy, ProcessingMode};
