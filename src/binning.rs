//! Interval assignment against an irregular set of bin boundaries
//!
//! Each boundary closes the half-open interval `(previous boundary, boundary]`,
//! so a record is assigned to the earliest boundary on or after its date.

use chrono::{Datelike, Months, NaiveDate};

use crate::errors::{Result, TimelineError};

/// Sorted ascending set of bin boundary dates.
///
/// Boundaries are fixed for a dataset and never mutated after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct BinBoundaries {
    boundaries: Vec<NaiveDate>,
}

impl BinBoundaries {
    /// Build a boundary set from arbitrary dates.
    ///
    /// Input is sorted and de-duplicated; an empty input is rejected.
    pub fn new(mut dates: Vec<NaiveDate>) -> Result<Self> {
        if dates.is_empty() {
            return Err(TimelineError::EmptyBoundaries);
        }
        dates.sort_unstable();
        dates.dedup();
        Ok(Self { boundaries: dates })
    }

    /// Calendar-month boundaries (last day of each month) covering
    /// `[earliest, latest]`.
    pub fn monthly(earliest: NaiveDate, latest: NaiveDate) -> Result<Self> {
        let mut boundaries = Vec::new();
        let mut month_start = NaiveDate::from_ymd_opt(earliest.year(), earliest.month(), 1)
            .expect("the first of a month is always a valid date");
        while month_start <= latest {
            let next = month_start
                .checked_add_months(Months::new(1))
                .ok_or(TimelineError::InvalidData {
                    message: format!("month arithmetic overflow past {month_start}"),
                })?;
            boundaries.push(next.pred_opt().expect("month start has a predecessor"));
            month_start = next;
        }
        Self::new(boundaries)
    }

    /// Calendar-year boundaries (December 31) covering `[earliest, latest]`.
    pub fn yearly(earliest: NaiveDate, latest: NaiveDate) -> Result<Self> {
        let boundaries = (earliest.year()..=latest.year())
            .map(|year| {
                NaiveDate::from_ymd_opt(year, 12, 31).expect("Dec 31 is always a valid date")
            })
            .collect();
        Self::new(boundaries)
    }

    /// Earliest boundary on or after `date`.
    ///
    /// Scans ascending and stops at the first match, so identical inputs
    /// always resolve to the same bin. A date past the last boundary is an
    /// error, never a silent drop.
    pub fn assign(&self, date: NaiveDate) -> Result<NaiveDate> {
        self.boundaries
            .iter()
            .copied()
            .find(|boundary| *boundary >= date)
            .ok_or(TimelineError::UnassignedRecord {
                date,
                last_boundary: self.last(),
            })
    }

    pub fn first(&self) -> NaiveDate {
        *self.boundaries.first().expect("validated non-empty")
    }

    pub fn last(&self) -> NaiveDate {
        *self.boundaries.last().expect("validated non-empty")
    }

    pub fn len(&self) -> usize {
        self.boundaries.len()
    }

    pub fn is_empty(&self) -> bool {
        false // construction rejects empty sets
    }

    pub fn as_slice(&self) -> &[NaiveDate] {
        &self.boundaries
    }
}
