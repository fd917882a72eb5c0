//! Re-index a sparse stack onto the continuous year axis

use ndarray::{Array3, Axis};
use regrowth_core::{GapFilledStack, ImageStack, Result};
use tracing::debug;

/// Expand `stack` so every year in `first..=last` has a plane.
///
/// Present years keep their plane unchanged; absent years are all NaN.
/// Output depth is `last - first + 1`, never less than the input depth.
pub fn fill_missing_years(stack: &ImageStack) -> Result<GapFilledStack> {
    let range = stack.year_range();
    let (rows, cols) = stack.grid();

    let mut data = Array3::<f64>::from_elem((rows, cols, range.len()), f64::NAN);
    for (k, &year) in stack.years().iter().enumerate() {
        let slot = range.index_of(year)?;
        data.index_axis_mut(Axis(2), slot).assign(&stack.plane(k));
    }

    debug!(
        "gap filled {} -> {} planes ({}..={})",
        stack.depth(),
        range.len(),
        range.first(),
        range.last()
    );
    GapFilledStack::new(
        data,
        range,
        stack.years().to_vec(),
        stack.meta().clone(),
        stack.vegetation_index(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeseries::build_image_stack;
    use regrowth_core::{Raster, YearPlane};

    fn sparse_stack(years: &[i32]) -> ImageStack {
        let planes: Vec<YearPlane> = years
            .iter()
            .enumerate()
            .map(|(k, &y)| {
                let data: Vec<f64> = (0..6).map(|i| k as f64 + i as f64 * 0.01).collect();
                YearPlane::new(y, Raster::from_vec(data, 2, 3).unwrap())
            })
            .collect();
        build_image_stack(&planes, None).unwrap()
    }

    #[test]
    fn test_depth_covers_range() {
        let years = [1984, 1985, 1986, 1990, 1995, 1996];
        let filled = fill_missing_years(&sparse_stack(&years)).unwrap();
        assert_eq!(filled.depth(), 1996 - 1984 + 1);
        assert_eq!(filled.source_years(), &years);
    }

    #[test]
    fn test_present_years_bit_identical_absent_years_nan() {
        let years = [1984, 1985, 1986, 1990, 1995, 1996];
        let stack = sparse_stack(&years);
        let filled = fill_missing_years(&stack).unwrap();

        for year in filled.year_range().iter() {
            let plane = filled.plane_for_year(year).unwrap();
            match years.iter().position(|&y| y == year) {
                Some(k) => {
                    let src = stack.plane(k);
                    assert!(plane
                        .iter()
                        .zip(src.iter())
                        .all(|(a, b)| a.to_bits() == b.to_bits()));
                }
                None => assert!(plane.iter().all(|v| v.is_nan()), "year {}", year),
            }
        }
    }

    #[test]
    fn test_contiguous_years_unchanged() {
        let stack = sparse_stack(&[2000, 2001, 2002]);
        let filled = fill_missing_years(&stack).unwrap();
        assert_eq!(filled.depth(), stack.depth());
        assert_eq!(filled.data(), stack.data());
    }
}
