//! # regrowth algorithms
//!
//! Every stage of the post-eruption vegetation recovery pipeline.
//!
//! ## Stages
//!
//! - **timeseries**: stack builder, gap filler, reshaper
//! - **masking**: validity mask, disturbance mask, combined filter
//! - **recovery**: per-pixel trend fit, significance gate, recovery
//!   metrics and the end-to-end [`recovery::RecoveryPipeline`]
//! - **statistics**: simple OLS and the Student-t distribution behind the
//!   slope p-value
//! - **anchors**: pre/post-event years resolved onto the year axis

pub mod anchors;
pub mod masking;
pub mod recovery;
pub mod statistics;
pub mod timeseries;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::anchors::EventAnchors;
    pub use crate::masking::{
        apply_pixel_filter, combined_filter, disturbed_pixel_mask, valid_pixel_mask,
        DisturbanceParams, ValidityParams,
    };
    pub use crate::recovery::{
        compute_dvi, fit_trends, run_pipeline, PipelineConfig, PipelineOutput, PipelineSummary,
        RecoveryMetrics, RecoveryParams, RecoveryPipeline, RegrowthParams, SignificanceGate,
        TrendFitParams,
    };
    pub use crate::timeseries::{build_image_stack, fill_missing_years, reshape_image_stack};
    pub use regrowth_core::prelude::*;
    pub use regrowth_parallel::ProcessingMode;
}
