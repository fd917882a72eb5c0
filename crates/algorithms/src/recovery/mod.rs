//! Trend fitting and recovery metrics
//!
//! - Trend: OLS of value on `log10` window position, per pixel
//! - Gate: p-value / r² threshold applied to every metric
//! - Metrics: years to recovery, slope, absolute and relative regrowth
//! - Pipeline: all stages from `(year, plane)` inputs to metric rasters

mod config;
mod dvi;
mod gate;
mod metrics;
mod pipeline;
mod trend;

pub use config::PipelineConfig;
pub use dvi::compute_dvi;
pub use gate::SignificanceGate;
pub use metrics::{
    absolute_regrowth, gated_slope, recovery_position, relative_regrowth, years_to_recovery,
    RecoveryMetrics, RecoveryParams, RegrowthParams,
};
pub use pipeline::{run_pipeline, PipelineOutput, PipelineSummary, RecoveryPipeline};
pub use trend::{fit_pixel_trend, fit_trends, fit_trends_range, TrendFitParams};
