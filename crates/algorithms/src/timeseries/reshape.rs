//! Flatten the spatial grid into a pixel axis

use ndarray::{Array2, Axis};
use regrowth_core::{Error, GapFilledStack, PixelTable, Result, YearRange};
use tracing::debug;

/// Flatten a gap-filled `[row, col, year]` stack into `[pixel, year]` tables.
///
/// `pixel = row * cols + col`. The year table repeats the continuous range,
/// regenerated from the stack's original (sparse) year list, in every row.
pub fn reshape_image_stack(stack: &GapFilledStack) -> Result<PixelTable> {
    let range = YearRange::from_years(stack.source_years())?;
    if range != stack.year_range() {
        return Err(Error::Algorithm(format!(
            "source years span {}..={} but stack spans {}..={}",
            range.first(),
            range.last(),
            stack.year_range().first(),
            stack.year_range().last()
        )));
    }

    let (rows, cols) = stack.grid();
    let pixels = rows * cols;
    let depth = stack.depth();

    let mut values = Array2::<f64>::from_elem((pixels, depth), f64::NAN);
    for (j, plane) in stack.data().axis_iter(Axis(2)).enumerate() {
        // row-major walk of the plane gives pixel order
        for (pixel, &v) in plane.iter().enumerate() {
            values[[pixel, j]] = v;
        }
    }

    let years = Array2::from_shape_fn((pixels, depth), |(_, j)| range.first() + j as i32);

    debug!("reshaped to {} pixels x {} years", pixels, depth);
    PixelTable::new(
        years,
        values,
        range,
        (rows, cols),
        stack.meta().clone(),
        stack.vegetation_index(),
    )
}
