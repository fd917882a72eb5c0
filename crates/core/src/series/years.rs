//! Continuous year axis

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Inclusive, gap-free range of calendar years `first..=last`.
///
/// This is the canonical year axis: every table column index downstream of
/// gap filling is a position in this range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearRange {
    first: i32,
    last: i32,
}

impl YearRange {
    /// Build the range spanning a strictly increasing list of years.
    pub fn from_years(years: &[i32]) -> Result<Self> {
        let (first, last) = match (years.first(), years.last()) {
            (Some(&f), Some(&l)) => (f, l),
            _ => return Err(Error::EmptyStack),
        };
        for pair in years.windows(2) {
            if pair[1] <= pair[0] {
                return Err(Error::YearsNotIncreasing {
                    previous: pair[0],
                    next: pair[1],
                });
            }
        }
        Ok(Self { first, last })
    }

    /// First year (inclusive)
    pub fn first(&self) -> i32 {
        self.first
    }

    /// Last year (inclusive)
    pub fn last(&self) -> i32 {
        self.last
    }

    /// Number of years, `last - first + 1`
    pub fn len(&self) -> usize {
        (self.last - self.first) as usize + 1
    }

    /// Always false; a range holds at least one year
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Whether `year` lies inside the range
    pub fn contains(&self, year: i32) -> bool {
        (self.first..=self.last).contains(&year)
    }

    /// Position of `year` on the axis
    pub fn index_of(&self, year: i32) -> Result<usize> {
        if !self.contains(year) {
            return Err(Error::InvalidIndex {
                year,
                first: self.first,
                last: self.last,
            });
        }
        Ok((year - self.first) as usize)
    }

    /// Year at axis position `index`, if in range
    pub fn year_at(&self, index: usize) -> Option<i32> {
        if index < self.len() {
            Some(self.first + index as i32)
        } else {
            None
        }
    }

    /// Iterate over every year of the range
    pub fn iter(&self) -> impl Iterator<Item = i32> {
        self.first..=self.last
    }
}
