//! Ordinary least squares for a single predictor
//!
//! Fits `y = β₀ + β₁·x` and reports the quantities the recovery metrics
//! are gated on: slope p-value (two-sided t test, `n - 2` degrees of
//! freedom) and the coefficient of determination.

use crate::statistics::distribution::student_t_two_sided_p;
use regrowth_core::{Error, Result};

/// Result of a simple linear regression
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimpleOls {
    pub slope: f64,
    pub intercept: f64,
    /// Two-sided p-value of `H₀: β₁ = 0`; NaN with no residual degrees
    /// of freedom
    pub slope_p_value: f64,
    /// NaN when `y` has no variance
    pub r_squared: f64,
}

/// Fit `y ~ 1 + x` by least squares.
///
/// # Errors
/// - fewer than 2 observations
/// - `x` and `y` of different length
/// - a constant `x` (singular design)
pub fn fit_simple_ols(x: &[f64], y: &[f64]) -> Result<SimpleOls> {
    if x.len() != y.len() {
        return Err(Error::Algorithm(format!(
            "OLS: {} predictors vs {} responses",
            x.len(),
            y.len()
        )));
    }
    let n = x.len();
    if n < 2 {
        return Err(Error::Algorithm(format!("OLS: need 2 observations, got {}", n)));
    }

    let nf = n as f64;
    let mean_x = x.iter().sum::<f64>() / nf;
    let mean_y = y.iter().sum::<f64>() / nf;

    // centred sums
    let mut sxx = 0.0_f64;
    let mut sxy = 0.0_f64;
    let mut syy = 0.0_f64;
    for (&xi, &yi) in x.iter().zip(y) {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        sxx += dx * dx;
        sxy += dx * dy;
        syy += dy * dy;
    }

    if !sxx.is_finite() || sxx < 1e-14 {
        return Err(Error::Algorithm(
            "OLS: singular design (constant predictor)".into(),
        ));
    }

    let slope = sxy / sxx;
    let intercept = mean_y - slope * mean_x;

    let ssr: f64 = x
        .iter()
        .zip(y)
        .map(|(&xi, &yi)| {
            let r = yi - (intercept + slope * xi);
            r * r
        })
        .sum();

    let r_squared = if syy > 0.0 { 1.0 - ssr / syy } else { f64::NAN };

    let df = n - 2;
    let slope_p_value = if df == 0 {
        f64::NAN
    } else {
        let se = (ssr / df as f64 / sxx).sqrt();
        if se > 0.0 {
            student_t_two_sided_p(slope / se, df as f64)
        } else if slope != 0.0 {
            // exact fit
            0.0
        } else {
            f64::NAN
        }
    };

    Ok(SimpleOls {
        slope,
        intercept,
        slope_p_value,
        r_squared,
    })
}
