//! Per-pixel regression results

use crate::error::{Error, Result};
use ndarray::{Array2, ArrayView1};

/// Result of one pixel's `value ~ 1 + log10(t)` fit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitRecord {
    pub slope: f64,
    pub intercept: f64,
    /// Two-sided p-value of the slope
    pub p_value: f64,
    pub r_squared: f64,
}

impl FitRecord {
    /// Record for a pixel that could not be fitted
    pub const NAN: FitRecord = FitRecord {
        slope: f64::NAN,
        intercept: f64::NAN,
        p_value: f64::NAN,
        r_squared: f64::NAN,
    };

    /// Column order used by [`FitTable`]
    pub fn to_array(self) -> [f64; 4] {
        [self.slope, self.intercept, self.p_value, self.r_squared]
    }

    /// Whether slope and intercept are both finite
    pub fn is_fitted(&self) -> bool {
        self.slope.is_finite() && self.intercept.is_finite()
    }
}

/// `[pixel, 4]` table of `(slope, intercept, p_value, r_squared)`.
#[derive(Debug, Clone, PartialEq)]
pub struct FitTable {
    data: Array2<f64>,
}

impl FitTable {
    pub const SLOPE: usize = 0;
    pub const INTERCEPT: usize = 1;
    pub const P_VALUE: usize = 2;
    pub const R_SQUARED: usize = 3;

    /// Build from one record per pixel
    pub fn from_records(records: &[FitRecord]) -> Self {
        let mut data = Array2::<f64>::zeros((records.len(), 4));
        for (mut row, rec) in data.rows_mut().into_iter().zip(records) {
            for (cell, v) in row.iter_mut().zip(rec.to_array()) {
                *cell = v;
            }
        }
        Self { data }
    }

    /// Wrap an existing `[pixel, 4]` array
    pub fn from_array(data: Array2<f64>) -> Result<Self> {
        if data.ncols() != 4 {
            return Err(Error::Algorithm(format!(
                "fit table needs 4 columns, got {}",
                data.ncols()
            )));
        }
        Ok(Self { data })
    }

    pub fn n_pixels(&self) -> usize {
        self.data.nrows()
    }

    pub fn record(&self, pixel: usize) -> FitRecord {
        let row = self.data.row(pixel);
        FitRecord {
            slope: row[Self::SLOPE],
            intercept: row[Self::INTERCEPT],
            p_value: row[Self::P_VALUE],
            r_squared: row[Self::R_SQUARED],
        }
    }

    pub fn slope(&self) -> ArrayView1<'_, f64> {
        self.data.column(Self::SLOPE)
    }

    pub fn intercept(&self) -> ArrayView1<'_, f64> {
        self.data.column(Self::INTERCEPT)
    }

    pub fn p_value(&self) -> ArrayView1<'_, f64> {
        self.data.column(Self::P_VALUE)
    }

    pub fn r_squared(&self) -> ArrayView1<'_, f64> {
        self.data.column(Self::R_SQUARED)
    }

    pub fn data(&self) -> &Array2<f64> {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_columns() {
        let records = [
            FitRecord {
                slope: 0.3,
                intercept: 0.1,
                p_value: 0.01,
                r_squared: 0.9,
            },
            FitRecord::NAN,
        ];
        let table = FitTable::from_records(&records);
        assert_eq!(table.n_pixels(), 2);
        assert_eq!(table.slope()[0], 0.3);
        assert_eq!(table.r_squared()[0], 0.9);
        assert!(table.p_value()[1].is_nan());
        assert!(!table.record(1).is_fitted());
        assert_eq!(table.record(0), records[0]);
    }

    #[test]
    fn test_from_array_checks_width() {
        assert!(FitTable::from_array(Array2::zeros((3, 3))).is_err());
        assert!(FitTable::from_array(Array2::zeros((3, 4))).is_ok());
    }
}
