//! Image stacks indexed `[row, col, year]`

use crate::error::{Error, Result};
use crate::raster::{Raster, RasterMeta};
use crate::series::{VegetationIndex, YearRange};
use ndarray::{Array3, ArrayView2, Axis};

/// One decoded composite and the calendar year it represents.
///
/// Extracting the year from a file name is the caller's job.
#[derive(Debug, Clone)]
pub struct YearPlane {
    pub year: i32,
    pub plane: Raster<f64>,
}

impl YearPlane {
    pub fn new(year: i32, plane: Raster<f64>) -> Self {
        Self { year, plane }
    }
}

/// Planes stacked along a (possibly sparse) year axis.
#[derive(Debug, Clone)]
pub struct ImageStack {
    data: Array3<f64>,
    years: Vec<i32>,
    range: YearRange,
    meta: RasterMeta,
    index: Option<VegetationIndex>,
}

impl ImageStack {
    /// Wrap a `[row, col, k]` array whose `k`-th plane belongs to `years[k]`.
    pub fn new(
        data: Array3<f64>,
        years: Vec<i32>,
        meta: RasterMeta,
        index: Option<VegetationIndex>,
    ) -> Result<Self> {
        let range = YearRange::from_years(&years)?;
        let depth = data.len_of(Axis(2));
        if depth != years.len() {
            return Err(Error::Algorithm(format!(
                "stack depth {} does not match {} years",
                depth,
                years.len()
            )));
        }
        Ok(Self {
            data,
            years,
            range,
            meta,
            index,
        })
    }

    /// `(rows, cols)` of every plane
    pub fn grid(&self) -> (usize, usize) {
        let (rows, cols, _) = self.data.dim();
        (rows, cols)
    }

    /// Number of planes (equals the number of input files)
    pub fn depth(&self) -> usize {
        self.data.len_of(Axis(2))
    }

    /// Years present, one per plane, strictly increasing
    pub fn years(&self) -> &[i32] {
        &self.years
    }

    /// Continuous range spanning the present years
    pub fn year_range(&self) -> YearRange {
        self.range
    }

    /// Plane `k` of the stack
    pub fn plane(&self, k: usize) -> ArrayView2<'_, f64> {
        self.data.index_axis(Axis(2), k)
    }

    pub fn data(&self) -> &Array3<f64> {
        &self.data
    }

    pub fn meta(&self) -> &RasterMeta {
        &self.meta
    }

    pub fn vegetation_index(&self) -> Option<VegetationIndex> {
        self.index
    }
}

/// Stack re-indexed onto a [`YearRange`]; absent years are all-NaN planes.
#[derive(Debug, Clone)]
pub struct GapFilledStack {
    data: Array3<f64>,
    range: YearRange,
    source_years: Vec<i32>,
    meta: RasterMeta,
    index: Option<VegetationIndex>,
}

impl GapFilledStack {
    /// Wrap a `[row, col, year]` array whose depth equals `range.len()`.
    pub fn new(
        data: Array3<f64>,
        range: YearRange,
        source_years: Vec<i32>,
        meta: RasterMeta,
        index: Option<VegetationIndex>,
    ) -> Result<Self> {
        let depth = data.len_of(Axis(2));
        if depth != range.len() {
            return Err(Error::Algorithm(format!(
                "gap-filled depth {} does not match year range length {}",
                depth,
                range.len()
            )));
        }
        Ok(Self {
            data,
            range,
            source_years,
            meta,
            index,
        })
    }

    pub fn grid(&self) -> (usize, usize) {
        let (rows, cols, _) = self.data.dim();
        (rows, cols)
    }

    pub fn depth(&self) -> usize {
        self.data.len_of(Axis(2))
    }

    pub fn year_range(&self) -> YearRange {
        self.range
    }

    /// Years that had a source plane before gap filling
    pub fn source_years(&self) -> &[i32] {
        &self.source_years
    }

    /// Plane for calendar `year`
    pub fn plane_for_year(&self, year: i32) -> Result<ArrayView2<'_, f64>> {
        let k = self.range.index_of(year)?;
        Ok(self.data.index_axis(Axis(2), k))
    }

    pub fn data(&self) -> &Array3<f64> {
        &self.data
    }

    pub fn meta(&self) -> &RasterMeta {
        &self.meta
    }

    pub fn vegetation_index(&self) -> Option<VegetationIndex> {
        self.index
    }
}
