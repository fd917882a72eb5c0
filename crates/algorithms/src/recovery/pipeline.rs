//! End-to-end recovery run: stack builder through recovery metrics

use super::config::PipelineConfig;
use super::dvi::compute_dvi;
use super::metrics::RecoveryMetrics;
use super::trend::fit_trends;
use crate::masking::{apply_pixel_filter, combined_filter, disturbed_pixel_mask, valid_pixel_mask};
use crate::timeseries::{build_image_stack, fill_missing_years, reshape_image_stack};
use ndarray::Array1;
use regrowth_core::{Algorithm, CleanDataset, Error, FitTable, Result, YearPlane};
use serde::Serialize;
use std::fmt;
use tracing::{debug, info};

/// Pixel counts collected along the run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PipelineSummary {
    pub total: usize,
    pub valid: usize,
    pub disturbed: usize,
    /// Valid and disturbed
    pub kept: usize,
    /// Pixels with a finite slope and intercept
    pub fitted: usize,
    /// Fits passing the significance gate
    pub significant: usize,
}

impl fmt::Display for PipelineSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} pixels: {} valid, {} disturbed, {} kept, {} fitted, {} significant",
            self.total, self.valid, self.disturbed, self.kept, self.fitted, self.significant
        )
    }
}

/// Everything a run produces
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub clean: CleanDataset,
    pub fits: FitTable,
    pub dvi: Array1<f64>,
    pub metrics: RecoveryMetrics,
    pub summary: PipelineSummary,
}

fn count(mask: &Array1<bool>) -> usize {
    mask.iter().filter(|&&m| m).count()
}

/// Recovery metrics from `(year, plane)` composites
#[derive(Debug, Clone, Default)]
pub struct RecoveryPipeline;

impl Algorithm for RecoveryPipeline {
    type Input = Vec<YearPlane>;
    type Output = PipelineOutput;
    type Params = PipelineConfig;
    type Error = Error;

    fn name(&self) -> &'static str {
        "RecoveryPipeline"
    }

    fn description(&self) -> &'static str {
        "Fit a linear-log regrowth trend per disturbed pixel and derive recovery metrics"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        run_pipeline(&input, &params)
    }
}

/// Run stages 1 to 8 in order.
///
/// Configuration problems (bad parameters, anchor years or window offset
/// outside the year axis) fail before any per-pixel work.
pub fn run_pipeline(planes: &[YearPlane], config: &PipelineConfig) -> Result<PipelineOutput> {
    config.validate()?;

    let stack = build_image_stack(planes, config.vegetation_index)?;
    let filled = fill_missing_years(&stack)?;
    let range = filled.year_range();
    let resolved = config.resolve(&range)?;
    debug!(
        "anchors resolve to baseline {:?}, post-event {} on {}..={}",
        resolved.pre_event,
        resolved.post_event,
        range.first(),
        range.last()
    );

    let valid = valid_pixel_mask(&filled, &config.validity);
    let table = reshape_image_stack(&filled)?;
    let disturbed = disturbed_pixel_mask(&table, &config.anchors, &config.disturbance)?;
    let keep = combined_filter(&valid, &disturbed)?;
    let clean = apply_pixel_filter(&table, keep)?;

    let fits = fit_trends(&clean, &config.trend)?;
    let dvi = compute_dvi(&clean, &config.anchors)?;
    let metrics = RecoveryMetrics::compute(
        &clean,
        &fits,
        &dvi,
        &config.anchors,
        &config.recovery,
        &config.regrowth,
        &config.gate,
    )?;

    let summary = PipelineSummary {
        total: table.n_pixels(),
        valid: count(&valid),
        disturbed: count(&disturbed),
        kept: clean.kept_count(),
        fitted: (0..fits.n_pixels())
            .filter(|&p| fits.record(p).is_fitted())
            .count(),
        significant: config.gate.count_significant(&fits),
    };
    info!("{}", summary);

    Ok(PipelineOutput {
        clean,
        fits,
        dvi,
        metrics,
        summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use regrowth_core::Raster;

    fn plane(year: i32, value: f64) -> YearPlane {
        YearPlane::new(year, Raster::filled(2, 2, value))
    }

    #[test]
    fn test_empty_input_fails() {
        let err = RecoveryPipeline.execute_default(Vec::new()).unwrap_err();
        assert!(matches!(err, Error::EmptyStack));
    }

    #[test]
    fn test_missing_anchor_year_is_fatal() {
        let planes = vec![plane(1986, 0.5), plane(2000, 0.5)];
        let err = RecoveryPipeline.execute_default(planes).unwrap_err();
        assert!(matches!(err, Error::InvalidIndex { year: 1985, .. }));
    }

    #[test]
    fn test_invalid_config_checked_first() {
        let mut config = PipelineConfig::default();
        config.validity.valid_num = 0;
        let err = RecoveryPipeline.execute(Vec::new(), config).unwrap_err();
        assert!(matches!(err, Error::InvalidParameter { .. }));
    }

    #[test]
    fn test_undisturbed_stack_yields_no_metrics() {
        let planes: Vec<_> = (1984..=2000).map(|y| plane(y, 0.6)).collect();
        let out = RecoveryPipeline.execute_default(planes).unwrap();
        assert_eq!(out.summary.total, 4);
        assert_eq!(out.summary.valid, 4);
        assert_eq!(out.summary.disturbed, 0);
        assert_eq!(out.summary.fitted, 0);
        assert!(out.metrics.slope.iter().all(|v| v.is_nan()));
    }
}
