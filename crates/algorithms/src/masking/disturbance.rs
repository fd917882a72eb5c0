//! Disturbed-pixel classification
//!
//! A pixel is disturbed when its vegetation index fell by more than a
//! fraction of the pre-event baseline (adapted from DeSchutter et al., 2015):
//!
//! `baseline - post_event > threshold_fraction * baseline`
//!
//! The difference is absolute, not relative: for a negative baseline (NBR
//! over bare ground) the two forms disagree, and this one is used.

use crate::anchors::{post_event_values, pre_event_baseline, EventAnchors};
use ndarray::{Array1, Zip};
use regrowth_core::{PixelTable, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Parameters for disturbance classification
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisturbanceParams {
    /// Required drop as a fraction of the baseline
    pub threshold_fraction: f64,
}

impl Default for DisturbanceParams {
    fn default() -> Self {
        Self {
            threshold_fraction: 0.2,
        }
    }
}

/// One flag per pixel: `true` iff the pixel is disturbed.
///
/// NaN baseline or NaN post-event value compares false, so such pixels are
/// not disturbed.
///
/// # Errors
/// `InvalidIndex` when an anchor year is outside the table's year range.
pub fn disturbed_pixel_mask(
    table: &PixelTable,
    anchors: &EventAnchors,
    params: &DisturbanceParams,
) -> Result<Array1<bool>> {
    let resolved = anchors.resolve(&table.year_range())?;
    let values = table.values().view();

    let baseline = pre_event_baseline(values, &resolved);
    let post = post_event_values(values, &resolved);
    let fraction = params.threshold_fraction;

    let mask = Zip::from(&baseline)
        .and(&post)
        .map_collect(|&pre, &post| (pre - post) > fraction * pre);

    debug!(
        "disturbed pixels: {} of {}",
        mask.iter().filter(|&&d| d).count(),
        mask.len()
    );
    Ok(mask)
}
