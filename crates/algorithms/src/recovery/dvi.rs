//! Magnitude of the event: differenced vegetation index (dVI)

use crate::anchors::{post_event_values, pre_event_baseline, EventAnchors};
use ndarray::Array1;
use regrowth_core::{CleanDataset, Result};

/// `baseline - post_event` per pixel, e.g. dNBR for NBR stacks.
///
/// Uses the same NaN-aware two-year baseline as disturbance classification
/// and is not gated. Pixels rejected by the filter come out NaN.
pub fn compute_dvi(clean: &CleanDataset, anchors: &EventAnchors) -> Result<Array1<f64>> {
    let resolved = anchors.resolve(&clean.table().year_range())?;
    let values = clean.values().view();
    let baseline = pre_event_baseline(values, &resolved);
    Ok(baseline - &post_event_values(values, &resolved))
}
