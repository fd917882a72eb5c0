//! Stack yearly composites into a 3D array

use ndarray::{Array3, Axis};
use regrowth_core::{Error, ImageStack, Result, VegetationIndex, YearPlane, YearRange};
use tracing::{debug, warn};

/// Build an `[row, col, k]` stack from yearly planes.
///
/// Planes must be ordered by strictly increasing year and share one shape.
/// No-data sentinels of each plane become NaN. Metadata is taken from the
/// first plane.
///
/// # Errors
/// - `EmptyStack` when `planes` is empty
/// - `YearsNotIncreasing` when the years are not strictly increasing
/// - `ShapeMismatch` for the first plane whose shape differs from the first
pub fn build_image_stack(
    planes: &[YearPlane],
    index: Option<VegetationIndex>,
) -> Result<ImageStack> {
    let first = planes.first().ok_or(Error::EmptyStack)?;
    let years: Vec<i32> = planes.iter().map(|p| p.year).collect();
    YearRange::from_years(&years)?;

    let (rows, cols) = first.plane.shape();
    for p in planes {
        if p.plane.shape() != (rows, cols) {
            return Err(Error::ShapeMismatch {
                year: p.year,
                expected: (rows, cols),
                actual: p.plane.shape(),
            });
        }
        if !p.plane.transform().same_grid(first.plane.transform(), 1e-6) {
            warn!(
                "plane {} is not on the grid of plane {}; stacking by pixel position",
                p.year, first.year
            );
        }
    }

    let mut data = Array3::<f64>::from_elem((rows, cols, planes.len()), f64::NAN);
    for (k, p) in planes.iter().enumerate() {
        data.index_axis_mut(Axis(2), k)
            .assign(p.plane.to_f64_nan().data());
    }

    let mut meta = first.plane.meta().clone();
    meta.nodata = Some(f64::NAN);

    debug!(
        "image stack: {} x {} x {} ({})",
        rows,
        cols,
        planes.len(),
        index.map_or_else(|| "unlabelled".to_string(), |vi| vi.to_string())
    );
    ImageStack::new(data, years, meta, index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use regrowth_core::Raster;

    fn plane(year: i32, rows: usize, cols: usize, value: f64) -> YearPlane {
        YearPlane::new(year, Raster::filled(rows, cols, value))
    }

    #[test]
    fn test_build_stack() {
        let planes = vec![plane(1984, 3, 4, 0.1), plane(1986, 3, 4, 0.3)];
        let stack = build_image_stack(&planes, Some(VegetationIndex::Nbr)).unwrap();

        assert_eq!(stack.grid(), (3, 4));
        assert_eq!(stack.depth(), 2);
        assert_eq!(stack.years(), &[1984, 1986]);
        assert_eq!(stack.plane(1)[[2, 3]], 0.3);
        assert_eq!(stack.vegetation_index(), Some(VegetationIndex::Nbr));
    }

    #[test]
    fn test_shape_mismatch_is_fatal() {
        let planes = vec![plane(1984, 3, 4, 0.1), plane(1985, 4, 3, 0.2)];
        let err = build_image_stack(&planes, None).unwrap_err();
        assert!(matches!(
            err,
            Error::ShapeMismatch {
                year: 1985,
                expected: (3, 4),
                actual: (4, 3)
            }
        ));
    }

    #[test]
    fn test_empty_and_unordered_input() {
        assert!(matches!(build_image_stack(&[], None), Err(Error::EmptyStack)));

        let planes = vec![plane(1990, 2, 2, 0.1), plane(1985, 2, 2, 0.2)];
        assert!(matches!(
            build_image_stack(&planes, None),
            Err(Error::YearsNotIncreasing { .. })
        ));
    }

    #[test]
    fn test_sentinel_nodata_becomes_nan() {
        let mut r = Raster::filled(2, 2, 0.4);
        r.set(0, 1, -9999.0).unwrap();
        r.set_nodata(Some(-9999.0));
        let stack = build_image_stack(&[YearPlane::new(2000, r)], None).unwrap();

        assert!(stack.plane(0)[[0, 1]].is_nan());
        assert_eq!(stack.plane(0)[[1, 1]], 0.4);
        assert!(stack.meta().nodata.unwrap().is_nan());
    }
}
