//! Axis scales mapping data values onto chart coordinates
//!
//! Ranges follow d3 semantics: they may be inverted, so a vertical chart can
//! map later dates to smaller coordinates by passing `(height, 0.0)`.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

/// Monotonic map from a numeric value to an axis coordinate.
///
/// The layout engine only relies on monotonicity; callers configure the
/// concrete scale.
pub trait Scale {
    fn project(&self, value: f64) -> f64;
}

/// Linear scale over a numeric domain.
#[derive(Debug, Clone, Serialize)]
pub struct LinearScale {
    domain: (f64, f64),
    range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    /// Symmetric domain `[-extent, extent]` mapped onto the range.
    ///
    /// Used for the diff axis so that a zero score always lands mid-range.
    pub fn symmetric(extent: f64, range: (f64, f64)) -> Self {
        Self::new((-extent, extent), range)
    }

    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    pub fn range(&self) -> (f64, f64) {
        self.range
    }
}

impl Scale for LinearScale {
    fn project(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        if d1 == d0 {
            // degenerate domain: everything lands mid-range
            return (r0 + r1) / 2.0;
        }
        r0 + (value - d0) / (d1 - d0) * (r1 - r0)
    }
}

/// First day of the year containing `date`.
pub fn floor_to_year(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), 1, 1).expect("Jan 1 is always a valid date")
}

/// First day of the next year, unless `date` already is a year boundary.
pub fn ceil_to_year(date: NaiveDate) -> NaiveDate {
    let floor = floor_to_year(date);
    if floor == date {
        date
    } else {
        NaiveDate::from_ymd_opt(date.year() + 1, 1, 1).expect("Jan 1 is always a valid date")
    }
}

/// Time axis with the domain snapped outward to calendar-year boundaries.
///
/// Dates map linearly by day count across the snapped domain.
#[derive(Debug, Clone, Serialize)]
pub struct TimeAxis {
    start: NaiveDate,
    end: NaiveDate,
    range: (f64, f64),
}

impl TimeAxis {
    /// Axis spanning `[floor_to_year(earliest), ceil_to_year(latest)]`.
    pub fn spanning(earliest: NaiveDate, latest: NaiveDate, range: (f64, f64)) -> Self {
        Self {
            start: floor_to_year(earliest),
            end: ceil_to_year(latest),
            range,
        }
    }

    pub fn domain(&self) -> (NaiveDate, NaiveDate) {
        (self.start, self.end)
    }

    pub fn range(&self) -> (f64, f64) {
        self.range
    }

    /// Axis coordinate for a date; dates outside the domain extrapolate.
    pub fn position(&self, date: NaiveDate) -> f64 {
        let total_days = (self.end - self.start).num_days();
        let (r0, r1) = self.range;
        if total_days == 0 {
            return (r0 + r1) / 2.0;
        }
        let elapsed = (date - self.start).num_days() as f64;
        r0 + elapsed / total_days as f64 * (r1 - r0)
    }

    /// One tick per calendar year across the domain.
    pub fn tick_years(&self) -> Vec<NaiveDate> {
        (self.start.year()..=self.end.year())
            .map(|year| NaiveDate::from_ymd_opt(year, 1, 1).expect("Jan 1 is always a valid date"))
            .filter(|tick| *tick >= self.start && *tick <= self.end)
            .collect()
    }

    /// Number of year intervals spanned by the domain.
    pub fn tick_count(&self) -> usize {
        (self.end.year() - self.start.year()).max(0) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn linear_scale_projects_endpoints_and_midpoint() {
        let scale = LinearScale::new((0.0, 10.0), (0.0, 100.0));
        assert_eq!(scale.project(0.0), 0.0);
        assert_eq!(scale.project(10.0), 100.0);
        assert_eq!(scale.project(5.0), 50.0);
    }

    #[test]
    fn linear_scale_supports_inverted_range() {
        let scale = LinearScale::new((0.0, 10.0), (100.0, 0.0));
        assert_eq!(scale.project(0.0), 100.0);
        assert_eq!(scale.project(10.0), 0.0);
        assert_eq!(scale.project(2.5), 75.0);
    }

    #[test]
    fn symmetric_scale_centres_zero() {
        let scale = LinearScale::symmetric(2.0, (0.0, 600.0));
        assert_eq!(scale.project(-2.0), 0.0);
        assert_eq!(scale.project(0.0), 300.0);
        assert_eq!(scale.project(2.0), 600.0);
    }

    #[test]
    fn degenerate_domain_lands_mid_range() {
        let scale = LinearScale::new((3.0, 3.0), (0.0, 100.0));
        assert_eq!(scale.project(3.0), 50.0);
        assert_eq!(scale.project(99.0), 50.0);
    }

    #[test]
    fn year_floor_and_ceil() {
        assert_eq!(floor_to_year(date(2010, 6, 15)), date(2010, 1, 1));
        assert_eq!(ceil_to_year(date(2010, 6, 15)), date(2011, 1, 1));
        // an exact year boundary is its own ceiling
        assert_eq!(ceil_to_year(date(2011, 1, 1)), date(2011, 1, 1));
    }

    #[test]
    fn time_axis_snaps_domain_to_years() {
        let axis = TimeAxis::spanning(date(2010, 3, 10), date(2011, 6, 1), (0.0, 100.0));
        assert_eq!(axis.domain(), (date(2010, 1, 1), date(2012, 1, 1)));
        assert_eq!(axis.position(date(2010, 1, 1)), 0.0);
        assert_eq!(axis.position(date(2012, 1, 1)), 100.0);
        assert_eq!(axis.tick_count(), 2);
        assert_eq!(
            axis.tick_years(),
            vec![date(2010, 1, 1), date(2011, 1, 1), date(2012, 1, 1)]
        );
    }

    #[test]
    fn time_axis_inverted_range_flips_positions() {
        let axis = TimeAxis::spanning(date(2010, 1, 1), date(2011, 1, 1), (100.0, 0.0));
        assert_eq!(axis.position(date(2010, 1, 1)), 100.0);
        assert_eq!(axis.position(date(2011, 1, 1)), 0.0);
    }
}
