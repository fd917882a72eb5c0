//! Valid-pixel mask from missing-year counts

use ndarray::{Array1, Axis};
use regrowth_core::GapFilledStack;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Parameters for the validity mask
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidityParams {
    /// A pixel is valid while its count of missing years stays below this.
    /// 20 keeps pixels with roughly half of a 38-year record.
    pub valid_num: usize,
}

impl Default for ValidityParams {
    fn default() -> Self {
        Self { valid_num: 20 }
    }
}

/// One flag per pixel (row-major): `true` iff the number of NaN years in the
/// pixel's full series is `< valid_num`.
pub fn valid_pixel_mask(stack: &GapFilledStack, params: &ValidityParams) -> Array1<bool> {
    let valid_num = params.valid_num;
    let per_cell = stack
        .data()
        .map_axis(Axis(2), |series| series.iter().filter(|v| v.is_nan()).count() < valid_num);

    let mask: Array1<bool> = per_cell.iter().copied().collect();
    debug!(
        "valid pixels: {} of {} (valid_num = {})",
        mask.iter().filter(|&&v| v).count(),
        mask.len(),
        valid_num
    );
    mask
}
