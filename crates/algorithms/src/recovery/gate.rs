//! Statistical significance gate shared by every recovery metric

use ndarray::{Array1, ArrayView1, Zip};
use regrowth_core::FitTable;
use serde::{Deserialize, Serialize};

/// Joint p-value / r² threshold on a fitted trend.
///
/// A metric survives iff `p_value < max_p_value` and
/// `r_squared >= min_r_squared`. NaN fails both tests.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignificanceGate {
    pub max_p_value: f64,
    pub min_r_squared: f64,
}

impl Default for SignificanceGate {
    fn default() -> Self {
        Self {
            max_p_value: 0.05,
            min_r_squared: 0.7,
        }
    }
}

impl SignificanceGate {
    /// `value` if the fit is significant, NaN otherwise
    #[inline]
    pub fn apply(&self, value: f64, p_value: f64, r_squared: f64) -> f64 {
        let after_p = if p_value < self.max_p_value { value } else { f64::NAN };
        if r_squared >= self.min_r_squared {
            after_p
        } else {
            f64::NAN
        }
    }

    #[inline]
    pub fn passes(&self, p_value: f64, r_squared: f64) -> bool {
        p_value < self.max_p_value && r_squared >= self.min_r_squared
    }

    /// Gate a per-pixel array against the matching rows of `fits`
    pub fn apply_all(&self, values: ArrayView1<'_, f64>, fits: &FitTable) -> Array1<f64> {
        Zip::from(values)
            .and(fits.p_value())
            .and(fits.r_squared())
            .map_collect(|&v, &p, &r2| self.apply(v, p, r2))
    }

    /// Number of pixels whose fit passes the gate
    pub fn count_significant(&self, fits: &FitTable) -> usize {
        Zip::from(fits.p_value())
            .and(fits.r_squared())
            .fold(0, |n, &p, &r2| n + usize::from(self.passes(p, r2)))
    }
}
