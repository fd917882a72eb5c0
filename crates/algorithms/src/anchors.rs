//! Temporal anchors of the disturbance event
//!
//! The study-specific calendar years (two pre-event baseline years and the
//! first post-event year) are configuration. They are resolved against the
//! continuous year axis once per run; a year outside the axis is a fatal
//! configuration error.

use ndarray::{Array1, ArrayView1, ArrayView2, Axis, Zip};
use regrowth_core::{Result, YearRange};
use serde::{Deserialize, Serialize};

/// Calendar years that anchor the analysis to the event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventAnchors {
    /// Years averaged into the pre-event baseline
    pub pre_event_years: [i32; 2],
    /// First year after the event
    pub post_event_year: i32,
}

impl Default for EventAnchors {
    fn default() -> Self {
        // Unzen: 1990-1995 eruption, best pre-event Landsat coverage 1985-86
        Self {
            pre_event_years: [1985, 1986],
            post_event_year: 1995,
        }
    }
}

/// Anchor years converted to column indices of a `[pixel, year]` table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedAnchors {
    pub pre_event: [usize; 2],
    pub post_event: usize,
}

impl EventAnchors {
    /// Map every anchor year to its position on `range`.
    ///
    /// Fails with `InvalidIndex` for the first year not covered by `range`.
    pub fn resolve(&self, range: &YearRange) -> Result<ResolvedAnchors> {
        let [y1, y2] = self.pre_event_years;
        Ok(ResolvedAnchors {
            pre_event: [range.index_of(y1)?, range.index_of(y2)?],
            post_event: range.index_of(self.post_event_year)?,
        })
    }
}

/// Mean of the two baseline values, or the one that is present.
///
/// NaN only when both are NaN.
pub fn baseline_value(a: f64, b: f64) -> f64 {
    match (a.is_nan(), b.is_nan()) {
        (false, false) => (a + b) / 2.0,
        (false, true) => a,
        (true, false) => b,
        (true, true) => f64::NAN,
    }
}

/// Per-pixel pre-event baseline from a `[pixel, year]` value table
pub fn pre_event_baseline(values: ArrayView2<'_, f64>, anchors: &ResolvedAnchors) -> Array1<f64> {
    let [i1, i2] = anchors.pre_event;
    Zip::from(values.column(i1))
        .and(values.column(i2))
        .map_collect(|&a, &b| baseline_value(a, b))
}

/// Per-pixel value in the post-event year
pub fn post_event_values<'a>(
    values: ArrayView2<'a, f64>,
    anchors: &ResolvedAnchors,
) -> ArrayView1<'a, f64> {
    values.index_axis_move(Axis(1), anchors.post_event)
}
