use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::Sample;

/// Inclusive calendar date window, open-ended on either side
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        DateRange { from, to }
    }

    /// Range spanning the earliest and latest sample dates
    ///
    /// Samples without a parseable date are ignored. Returns an unbounded
    /// range when no sample carries a date.
    pub fn spanning(samples: &[Sample]) -> Self {
        let mut dates = samples.iter().filter_map(Sample::date);
        match dates.next() {
            Some(first) => {
                let (min, max) = dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d)));
                DateRange::new(Some(min), Some(max))
            }
            None => DateRange::default(),
        }
    }

    pub fn is_unbounded(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }

    /// Check if a date falls within this range
    pub fn contains(&self, date: &NaiveDate) -> bool {
        let after_start = self.from.map_or(true, |start| date >= &start);
        let before_end = self.to.map_or(true, |end| date <= &end);
        after_start && before_end
    }

    /// Samples inside the window, in input order
    ///
    /// A sample without a parseable date only passes an unbounded range.
    pub fn filter(&self, samples: &[Sample]) -> Vec<Sample> {
        samples
            .iter()
            .filter(|s| match s.date() {
                Some(date) => self.contains(&date),
                None => self.is_unbounded(),
            })
            .cloned()
            .collect()
    }
}

/// Samples recorded on one calendar date, in input order
pub fn samples_on(samples: &[Sample], date: NaiveDate) -> Vec<Sample> {
    samples
        .iter()
        .filter(|s| s.date() == Some(date))
        .cloned()
        .collect()
}

/// Short human label for a comparison date ("today" or e.g. "Jun 3")
pub fn date_label(date: NaiveDate, today: NaiveDate) -> String {
    if date == today {
        "today".to_string()
    } else {
        date.format("%b %-d").to_string()
    }
}
