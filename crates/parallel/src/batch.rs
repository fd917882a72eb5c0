//! Contiguous pixel batches for streaming large tables

use std::ops::Range;

/// A contiguous run of pixel indices `[start, start + len)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelBatch {
    /// First pixel index in the source table
    pub start: usize,
    /// Number of pixels in this batch
    pub len: usize,
}

impl PixelBatch {
    /// Pixel index range covered by this batch
    pub fn range(&self) -> Range<usize> {
        self.start..self.start + self.len
    }

    /// Convert a batch-local index to the source pixel index
    pub fn to_source(&self, local: usize) -> usize {
        self.start + local
    }
}

/// Iterator over batches covering `0..total` pixels.
///
/// Every pixel appears in exactly one batch; the last batch may be short.
#[derive(Debug, Clone)]
pub struct PixelBatches {
    total: usize,
    batch_size: usize,
    current: usize,
}

impl PixelBatches {
    /// Batches of `batch_size` pixels (a size of 0 is treated as 1)
    pub fn new(total: usize, batch_size: usize) -> Self {
        Self {
            total,
            batch_size: batch_size.max(1),
            current: 0,
        }
    }

    /// A single batch covering everything
    pub fn whole(total: usize) -> Self {
        Self::new(total, total)
    }
}

impl Iterator for PixelBatches {
    type Item = PixelBatch;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current >= self.total {
            return None;
        }
        let len = self.batch_size.min(self.total - self.current);
        let batch = PixelBatch {
            start: self.current,
            len,
        };
        self.current += len;
        Some(batch)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.total - self.current).div_ceil(self.batch_size);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for PixelBatches {}
