//! Flattened `[pixel, year]` tables

use crate::error::{Error, Result};
use crate::raster::RasterMeta;
use crate::series::{VegetationIndex, YearRange};
use ndarray::{s, Array1, Array2, Array3, ArrayView1, ArrayView2, Axis};

/// Value table `[pixel, year]` and its parallel year table.
///
/// `pixel = row * cols + col` (row-major) and column `j` of both tables is
/// position `j` of the continuous [`YearRange`].
#[derive(Debug, Clone)]
pub struct PixelTable {
    years: Array2<i32>,
    values: Array2<f64>,
    range: YearRange,
    grid: (usize, usize),
    meta: RasterMeta,
    index: Option<VegetationIndex>,
}

impl PixelTable {
    pub fn new(
        years: Array2<i32>,
        values: Array2<f64>,
        range: YearRange,
        grid: (usize, usize),
        meta: RasterMeta,
        index: Option<VegetationIndex>,
    ) -> Result<Self> {
        let (pixels, n_years) = values.dim();
        if years.dim() != values.dim() {
            return Err(Error::Algorithm(format!(
                "year table {:?} and value table {:?} differ in shape",
                years.dim(),
                values.dim()
            )));
        }
        if pixels != grid.0 * grid.1 || n_years != range.len() {
            return Err(Error::Algorithm(format!(
                "table {:?} does not match grid {:?} over {} years",
                values.dim(),
                grid,
                range.len()
            )));
        }
        Ok(Self {
            years,
            values,
            range,
            grid,
            meta,
            index,
        })
    }

    /// Number of pixels (`rows * cols`)
    pub fn n_pixels(&self) -> usize {
        self.values.nrows()
    }

    /// Number of years on the continuous axis
    pub fn n_years(&self) -> usize {
        self.values.ncols()
    }

    /// `(rows, cols)` of the grid the pixels were flattened from
    pub fn grid(&self) -> (usize, usize) {
        self.grid
    }

    pub fn year_range(&self) -> YearRange {
        self.range
    }

    /// Year table; every row repeats the continuous year range
    pub fn years(&self) -> &Array2<i32> {
        &self.years
    }

    /// Vegetation-index values
    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    pub fn meta(&self) -> &RasterMeta {
        &self.meta
    }

    pub fn vegetation_index(&self) -> Option<VegetationIndex> {
        self.index
    }

    /// Time series of one pixel
    pub fn pixel_series(&self, pixel: usize) -> ArrayView1<'_, f64> {
        self.values.row(pixel)
    }

    /// Values of every pixel in calendar `year`
    pub fn values_for_year(&self, year: i32) -> Result<ArrayView1<'_, f64>> {
        let j = self.range.index_of(year)?;
        Ok(self.values.column(j))
    }

    /// Values from axis position `start` to the end, `[pixel, year]`
    pub fn values_from(&self, start: usize) -> ArrayView2<'_, f64> {
        self.values.slice(s![.., start..])
    }

    /// Combined `[pixel, year, {year, value}]` array: index 0 of the last
    /// axis holds the year, index 1 the value.
    pub fn combined(&self) -> Array3<f64> {
        let (pixels, n_years) = self.values.dim();
        let mut out = Array3::<f64>::zeros((pixels, n_years, 2));
        out.index_axis_mut(Axis(2), 0)
            .assign(&self.years.mapv(|y| y as f64));
        out.index_axis_mut(Axis(2), 1).assign(&self.values);
        out
    }

    /// Undo the row-major flattening: `[rows, cols, year]`.
    pub fn to_stack(&self) -> Result<Array3<f64>> {
        let (rows, cols) = self.grid;
        let flat: Vec<f64> = self.values.iter().copied().collect();
        Array3::from_shape_vec((rows, cols, self.n_years()), flat)
            .map_err(|e| Error::Other(e.to_string()))
    }

    /// Copy with the value table replaced; years and grid are kept.
    pub fn with_values(&self, values: Array2<f64>) -> Result<Self> {
        Self::new(
            self.years.clone(),
            values,
            self.range,
            self.grid,
            self.meta.clone(),
            self.index,
        )
    }
}

/// Validated, disturbance-filtered table consumed by trend fitting.
///
/// Pixels that failed the combined filter have NaN for every year; the year
/// table is untouched.
#[derive(Debug, Clone)]
pub struct CleanDataset {
    table: PixelTable,
    keep: Array1<bool>,
}

impl CleanDataset {
    pub fn new(table: PixelTable, keep: Array1<bool>) -> Result<Self> {
        if keep.len() != table.n_pixels() {
            return Err(Error::Algorithm(format!(
                "filter length {} does not match {} pixels",
                keep.len(),
                table.n_pixels()
            )));
        }
        Ok(Self { table, keep })
    }

    pub fn table(&self) -> &PixelTable {
        &self.table
    }

    /// Masked value table `[pixel, year]`
    pub fn values(&self) -> &Array2<f64> {
        self.table.values()
    }

    /// Year table `[pixel, year]`
    pub fn years(&self) -> &Array2<i32> {
        self.table.years()
    }

    /// Combined filter, one flag per pixel
    pub fn keep(&self) -> &Array1<bool> {
        &self.keep
    }

    /// Number of pixels that passed the combined filter
    pub fn kept_count(&self) -> usize {
        self.keep.iter().filter(|&&k| k).count()
    }

    /// `[pixel, year, {year, value}]`, see [`PixelTable::combined`]
    pub fn combined(&self) -> Array3<f64> {
        self.table.combined()
    }
}
