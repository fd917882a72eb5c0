//! Pixel-wise linear-log trend fitting
//!
//! For every pixel the post-event window of the clean series is regressed as
//!
//!   value = intercept + slope · log10(t)
//!
//! where `t = 0, 1, 2, …` is the position inside the window. Position 0 has
//! no logarithm and is mapped to 0, the same as position 1.

use crate::statistics::fit_simple_ols;
use ndarray::{Array2, ArrayView1, ArrayView2};
use regrowth_core::{CleanDataset, Error, FitRecord, FitTable, Result};
use regrowth_parallel::{ParallelStrategy, PixelBatches, ProcessingMode};
use serde::{Deserialize, Serialize};
use std::ops::Range;
use tracing::{debug, info, trace};

/// Parameters for trend fitting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendFitParams {
    /// Index on the continuous year axis where the regrowth window starts.
    /// 11 is 1995 for a record starting in 1984.
    pub window_start_offset: usize,
    /// How pixels are distributed over threads
    pub mode: ProcessingMode,
    /// Fit pixels in batches of this size; bounds the per-batch scratch
    /// records, the output table is still built whole
    pub batch_size: Option<usize>,
}

impl Default for TrendFitParams {
    fn default() -> Self {
        Self {
            window_start_offset: 11,
            mode: ProcessingMode::Parallel,
            batch_size: None,
        }
    }
}

/// Fit one pixel's window. Never fails: unusable pixels get [`FitRecord::NAN`].
pub fn fit_pixel_trend(window: ArrayView1<'_, f64>) -> FitRecord {
    let (x, y): (Vec<f64>, Vec<f64>) = window
        .iter()
        .enumerate()
        .filter(|(_, v)| v.is_finite())
        .map(|(pos, &v)| {
            let t = pos as f64;
            (if t > 0.0 { t.log10() } else { 0.0 }, v)
        })
        .unzip();

    match fit_simple_ols(&x, &y) {
        Ok(fit) => FitRecord {
            slope: fit.slope,
            intercept: fit.intercept,
            p_value: fit.slope_p_value,
            r_squared: fit.r_squared,
        },
        Err(e) => {
            if !x.is_empty() {
                trace!("trend fit skipped ({} points): {}", x.len(), e);
            }
            FitRecord::NAN
        }
    }
}

/// Post-event window `[pixel, window_year]` of `clean`.
///
/// `InvalidIndex` when the window would start past the last year.
fn trend_window(clean: &CleanDataset, offset: usize) -> Result<ArrayView2<'_, f64>> {
    let table = clean.table();
    if offset >= table.n_years() {
        let range = table.year_range();
        return Err(Error::InvalidIndex {
            year: range.first() + offset as i32,
            first: range.first(),
            last: range.last(),
        });
    }
    Ok(table.values_from(offset))
}

/// Fit every pixel of `clean` from `window_start_offset` to the last year.
///
/// Pixels are independent; the result does not depend on the processing
/// mode or batch size. A thread pool requested by the mode is built once
/// and shared by all batches.
///
/// # Errors
/// `InvalidIndex` when the window would start past the last year.
pub fn fit_trends(clean: &CleanDataset, params: &TrendFitParams) -> Result<FitTable> {
    let window = trend_window(clean, params.window_start_offset)?;
    let (n_pixels, window_years) = window.dim();

    let batches = match params.batch_size {
        Some(size) => PixelBatches::new(n_pixels, size),
        None => PixelBatches::whole(n_pixels),
    };

    let data = params.mode.install(|mode| -> Result<Array2<f64>> {
        debug!(
            "fitting {} pixels over {} window years in {} batches on {} threads",
            n_pixels,
            window_years,
            batches.len(),
            mode.threads()
        );
        let mut data = Array2::from_elem((n_pixels, 4), f64::NAN);
        for batch in batches {
            let fitted = mode.par_map(batch.range(), |pixel| fit_pixel_trend(window.row(pixel)))?;
            for (local, record) in fitted.into_iter().enumerate() {
                let mut row = data.row_mut(batch.to_source(local));
                for (cell, v) in row.iter_mut().zip(record.to_array()) {
                    *cell = v;
                }
            }
        }
        Ok(data)
    })??;

    let table = FitTable::from_array(data)?;
    info!(
        "fitted {} of {} pixels",
        (0..n_pixels).filter(|&p| table.record(p).is_fitted()).count(),
        n_pixels
    );
    Ok(table)
}

/// Fit only the pixels in `pixels`; row `i` of the result is pixel
/// `pixels.start + i`.
///
/// For streaming a table that is fitted batch by batch. To share one thread
/// pool across many calls, run them inside [`ProcessingMode::install`] with
/// the mode it hands out.
///
/// # Errors
/// `InvalidIndex` for a window past the last year, `Algorithm` for a range
/// outside the table.
pub fn fit_trends_range(
    clean: &CleanDataset,
    params: &TrendFitParams,
    pixels: Range<usize>,
) -> Result<FitTable> {
    let window = trend_window(clean, params.window_start_offset)?;
    if pixels.start > pixels.end || pixels.end > window.nrows() {
        return Err(Error::Algorithm(format!(
            "pixel range {:?} outside 0..{}",
            pixels,
            window.nrows()
        )));
    }
    let records = params
        .mode
        .install(|mode| mode.par_map(pixels, |pixel| fit_pixel_trend(window.row(pixel))))??;
    Ok(FitTable::from_records(&records))
}
