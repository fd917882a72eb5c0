//! Recovery metrics derived from the fitted linear-log trend
//!
//! Every metric is gated by [`SignificanceGate`]:
//!
//! - **Years to recovery**: window position at which the curve reaches a
//!   fraction of the pre-event baseline (Pickell et al., 2016 use 80%,
//!   Lawrence and Ripple, 2000 use 10%)
//! - **Slope**: the fitted slope itself (DeSchutter et al., 2015)
//! - **Absolute regrowth**: `fitted(h) - fitted(1)` (Kennedy et al., 2012)
//! - **Relative regrowth**: absolute regrowth divided by dVI

use super::gate::SignificanceGate;
use crate::anchors::{pre_event_baseline, EventAnchors};
use ndarray::{Array1, Zip};
use regrowth_core::{CleanDataset, Error, FitTable, Raster, RasterMeta, Result};
use serde::{Deserialize, Serialize};

/// Parameters for years-to-recovery
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecoveryParams {
    /// Fraction of the pre-event baseline that counts as recovered
    pub target_fraction: f64,
    /// Positions at or beyond this are "never recovers"
    pub max_recovery_years: f64,
}

impl Default for RecoveryParams {
    fn default() -> Self {
        Self {
            target_fraction: 0.8,
            max_recovery_years: 30.0,
        }
    }
}

/// Parameters for absolute and relative regrowth
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegrowthParams {
    /// Years after the window start at which regrowth is measured
    pub horizon_years: f64,
}

impl Default for RegrowthParams {
    fn default() -> Self {
        Self { horizon_years: 5.0 }
    }
}

fn check_rows(fits: &FitTable, n_pixels: usize) -> Result<()> {
    if fits.n_pixels() != n_pixels {
        return Err(Error::Algorithm(format!(
            "fit table has {} rows for {} pixels",
            fits.n_pixels(),
            n_pixels
        )));
    }
    Ok(())
}

/// Invert `y = intercept + slope * log10(t)` for `y = target`, rounded to the
/// nearest whole window position (ties to even).
///
/// NaN when the inversion is undefined or the position is not below
/// `max_years`.
pub fn recovery_position(target: f64, slope: f64, intercept: f64, max_years: f64) -> f64 {
    let x_log = (target - intercept) / slope;
    let position = 10f64.powf(x_log).round_ties_even();
    if position < max_years {
        position
    } else {
        f64::NAN
    }
}

/// Years needed to reach `target_fraction` of the pre-event baseline.
///
/// The baseline is recomputed from `clean` with the same two-year rule as
/// disturbance classification.
pub fn years_to_recovery(
    clean: &CleanDataset,
    fits: &FitTable,
    anchors: &EventAnchors,
    params: &RecoveryParams,
    gate: &SignificanceGate,
) -> Result<Array1<f64>> {
    check_rows(fits, clean.table().n_pixels())?;
    let resolved = anchors.resolve(&clean.table().year_range())?;
    let baseline = pre_event_baseline(clean.values().view(), &resolved);

    let positions = Zip::from(&baseline)
        .and(fits.slope())
        .and(fits.intercept())
        .map_collect(|&pre, &slope, &intercept| {
            recovery_position(
                params.target_fraction * pre,
                slope,
                intercept,
                params.max_recovery_years,
            )
        });
    Ok(gate.apply_all(positions.view(), fits))
}

/// Fitted slope, gated
pub fn gated_slope(fits: &FitTable, gate: &SignificanceGate) -> Array1<f64> {
    gate.apply_all(fits.slope(), fits)
}

/// `fitted(horizon) - fitted(1)`, which reduces to `slope * log10(horizon)`
pub fn absolute_regrowth(
    fits: &FitTable,
    params: &RegrowthParams,
    gate: &SignificanceGate,
) -> Array1<f64> {
    let log_h = params.horizon_years.log10();
    let diff = Zip::from(fits.slope())
        .and(fits.intercept())
        .map_collect(|&slope, &intercept| {
            (intercept + slope * log_h) - (intercept + slope * 1f64.log10())
        });
    gate.apply_all(diff.view(), fits)
}

/// Absolute regrowth over the gated dVI.
///
/// A zero dVI yields ±inf or NaN; it is not trapped.
pub fn relative_regrowth(
    abs_regrowth: &Array1<f64>,
    dvi: &Array1<f64>,
    fits: &FitTable,
    gate: &SignificanceGate,
) -> Result<Array1<f64>> {
    check_rows(fits, dvi.len())?;
    if abs_regrowth.len() != dvi.len() {
        return Err(Error::Algorithm(format!(
            "{} regrowth values for {} dVI values",
            abs_regrowth.len(),
            dvi.len()
        )));
    }
    Ok(abs_regrowth / &gate.apply_all(dvi.view(), fits))
}

/// The four per-pixel metric arrays, flattened row-major over `grid`
#[derive(Debug, Clone)]
pub struct RecoveryMetrics {
    pub years_to_recovery: Array1<f64>,
    pub slope: Array1<f64>,
    pub abs_regrowth: Array1<f64>,
    pub rel_regrowth: Array1<f64>,
    grid: (usize, usize),
    meta: RasterMeta,
}

impl RecoveryMetrics {
    /// Layer names, also used as output file stems
    pub const LAYERS: [&'static str; 4] =
        ["years_to_recovery", "slope", "abs_regrowth", "rel_regrowth"];

    /// Compute all four metrics from the clean dataset, its fits and dVI
    pub fn compute(
        clean: &CleanDataset,
        fits: &FitTable,
        dvi: &Array1<f64>,
        anchors: &EventAnchors,
        recovery: &RecoveryParams,
        regrowth: &RegrowthParams,
        gate: &SignificanceGate,
    ) -> Result<Self> {
        let years_to_recovery = years_to_recovery(clean, fits, anchors, recovery, gate)?;
        let slope = gated_slope(fits, gate);
        let abs_regrowth = absolute_regrowth(fits, regrowth, gate);
        let rel_regrowth = relative_regrowth(&abs_regrowth, dvi, fits, gate)?;
        Ok(Self {
            years_to_recovery,
            slope,
            abs_regrowth,
            rel_regrowth,
            grid: clean.table().grid(),
            meta: clean.table().meta().clone(),
        })
    }

    /// `(rows, cols)` the arrays were flattened from
    pub fn grid(&self) -> (usize, usize) {
        self.grid
    }

    pub fn meta(&self) -> &RasterMeta {
        &self.meta
    }

    /// `(name, values)` in [`Self::LAYERS`] order
    pub fn layers(&self) -> [(&'static str, &Array1<f64>); 4] {
        [
            (Self::LAYERS[0], &self.years_to_recovery),
            (Self::LAYERS[1], &self.slope),
            (Self::LAYERS[2], &self.abs_regrowth),
            (Self::LAYERS[3], &self.rel_regrowth),
        ]
    }

    /// Reshape every layer back to `[rows, cols]` with the input georeferencing
    pub fn to_rasters(&self) -> Result<Vec<(&'static str, Raster<f64>)>> {
        let (rows, cols) = self.grid;
        let mut meta = self.meta.clone();
        meta.nodata = Some(f64::NAN);

        self.layers()
            .into_iter()
            .map(|(name, values)| {
                let mut raster = Raster::from_vec(values.to_vec(), rows, cols)?;
                raster.set_meta(meta.clone());
                Ok((name, raster))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::{array, Array2};
    use regrowth_core::{FitRecord, PixelTable, YearRange};

    const SIGNIFICANT: FitRecord = FitRecord {
        slope: 0.3,
        intercept: 0.1,
        p_value: 0.001,
        r_squared: 0.95,
    };

    fn anchors() -> EventAnchors {
        EventAnchors {
            pre_event_years: [2001, 2002],
            post_event_year: 2003,
        }
    }

    fn clean(values: Array2<f64>, grid: (usize, usize)) -> CleanDataset {
        let (pixels, n_years) = values.dim();
        let range = YearRange::from_years(&[2000, 2000 + n_years as i32 - 1]).unwrap();
        let years = Array2::from_shape_fn((pixels, n_years), |(_, j)| 2000 + j as i32);
        let table = PixelTable::new(years, values, range, grid, RasterMeta::default(), None)
            .unwrap();
        CleanDataset::new(table, Array1::from_elem(pixels, true)).unwrap()
    }

    #[test]
    fn test_recovery_position_inverts_curve() {
        // 0.1 + 0.3 * log10(10) = 0.4
        assert_eq!(recovery_position(0.4, 0.3, 0.1, 30.0), 10.0);
        // 10^(0.25/0.3) = 6.81
        assert_eq!(recovery_position(0.35, 0.3, 0.1, 30.0), 7.0);
    }

    #[test]
    fn test_recovery_position_bound() {
        // 0.1 + 0.3 * 2 = 0.7 at position 100
        assert!(recovery_position(0.7, 0.3, 0.1, 30.0).is_nan());
        assert_eq!(recovery_position(0.7, 0.3, 0.1, 101.0), 100.0);
        assert!(recovery_position(f64::NAN, 0.3, 0.1, 30.0).is_nan());
        assert!(recovery_position(0.4, f64::NAN, f64::NAN, 30.0).is_nan());
    }

    #[test]
    fn test_years_to_recovery_from_baseline() {
        // baseline 0.5, target 0.8 * 0.5 = 0.4 -> position 10
        let data = clean(array![[0.0, 0.5, 0.5, 0.1]], (1, 1));
        let fits = FitTable::from_records(&[SIGNIFICANT]);
        let years = years_to_recovery(
            &data,
            &fits,
            &anchors(),
            &RecoveryParams::default(),
            &SignificanceGate::default(),
        )
        .unwrap();
        assert_eq!(years[0], 10.0);
    }

    #[test]
    fn test_absolute_regrowth_is_slope_times_log_horizon() {
        let fits = FitTable::from_records(&[SIGNIFICANT]);
        let abs = absolute_regrowth(
            &fits,
            &RegrowthParams::default(),
            &SignificanceGate::default(),
        );
        assert_relative_eq!(abs[0], 0.3 * 5f64.log10(), epsilon = 1e-12);
    }

    #[test]
    fn test_relative_regrowth_divides_by_dvi() {
        let fits = FitTable::from_records(&[SIGNIFICANT, SIGNIFICANT]);
        let abs = array![0.2, 0.2];
        let dvi = array![0.4, 0.0];
        let rel =
            relative_regrowth(&abs, &dvi, &fits, &SignificanceGate::default()).unwrap();
        assert_relative_eq!(rel[0], 0.5);
        assert!(rel[1].is_infinite());
    }

    #[test]
    fn test_insignificant_fit_blanks_every_metric() {
        let weak_p = FitRecord {
            p_value: 0.05,
            ..SIGNIFICANT
        };
        let weak_r2 = FitRecord {
            r_squared: 0.69,
            ..SIGNIFICANT
        };
        let data = clean(Array2::from_elem((3, 4), 0.5), (1, 3));
        let fits = FitTable::from_records(&[SIGNIFICANT, weak_p, weak_r2]);
        let dvi = array![0.3, 0.3, 0.3];

        let metrics = RecoveryMetrics::compute(
            &data,
            &fits,
            &dvi,
            &anchors(),
            &RecoveryParams::default(),
            &RegrowthParams::default(),
            &SignificanceGate::default(),
        )
        .unwrap();

        for (name, values) in metrics.layers() {
            assert!(values[0].is_finite(), "{}", name);
            assert!(values[1].is_nan(), "{}", name);
            assert!(values[2].is_nan(), "{}", name);
        }
    }

    #[test]
    fn test_to_rasters_unflattens_row_major() {
        let data = clean(Array2::from_elem((6, 4), 0.5), (2, 3));
        let fits = FitTable::from_records(&[SIGNIFICANT; 6]);
        let dvi = Array1::from_elem(6, 0.3);
        let metrics = RecoveryMetrics::compute(
            &data,
            &fits,
            &dvi,
            &anchors(),
            &RecoveryParams::default(),
            &RegrowthParams::default(),
            &SignificanceGate::default(),
        )
        .unwrap();

        let rasters = metrics.to_rasters().unwrap();
        let names: Vec<_> = rasters.iter().map(|(n, _)| *n).collect();
        assert_eq!(names, RecoveryMetrics::LAYERS.to_vec());
        for (_, raster) in &rasters {
            assert_eq!(raster.shape(), (2, 3));
            assert!(raster.nodata().is_some_and(f64::is_nan));
        }
        assert_relative_eq!(rasters[1].1.get(1, 2).unwrap(), 0.3);
    }
}
