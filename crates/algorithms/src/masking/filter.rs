//! Combined validity/disturbance filter

use ndarray::{Array1, Zip};
use regrowth_core::{CleanDataset, Error, PixelTable, Result};
use tracing::{debug, info};

/// Logical AND of the validity and disturbance masks.
pub fn combined_filter(valid: &Array1<bool>, disturbed: &Array1<bool>) -> Result<Array1<bool>> {
    if valid.len() != disturbed.len() {
        return Err(Error::Algorithm(format!(
            "validity mask has {} pixels, disturbance mask {}",
            valid.len(),
            disturbed.len()
        )));
    }
    Ok(Zip::from(valid)
        .and(disturbed)
        .map_collect(|&v, &d| v && d))
}

/// Blank out every year of the pixels where `keep` is false.
///
/// Only values are replaced with NaN; the year table is carried unchanged.
pub fn apply_pixel_filter(table: &PixelTable, keep: Array1<bool>) -> Result<CleanDataset> {
    if keep.len() != table.n_pixels() {
        return Err(Error::Algorithm(format!(
            "filter has {} pixels, table {}",
            keep.len(),
            table.n_pixels()
        )));
    }

    let mut values = table.values().clone();
    Zip::from(values.rows_mut())
        .and(&keep)
        .for_each(|mut series, &k| {
            if !k {
                series.fill(f64::NAN);
            }
        });

    let clean = CleanDataset::new(table.with_values(values)?, keep)?;
    info!(
        "kept {} of {} pixels (valid and disturbed)",
        clean.kept_count(),
        table.n_pixels()
    );
    debug!(
        "clean dataset: {} pixels x {} years x 2",
        table.n_pixels(),
        table.n_years()
    );
    Ok(clean)
}
