use std::collections::HashSet;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::MarginCallError;
use crate::MarginCallResult;

/// Returns `true` for Monday through Friday. Holidays are not modelled.
pub fn is_business_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// A fixed-size window of weekdays ending at a reference date, in
/// chronological order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessCalendar {
    days: Vec<NaiveDate>,
}

impl BusinessCalendar {
    /// Walks backward one calendar day at a time from `end_date` (inclusive
    /// when it is a weekday), collecting weekdays until `count` are found,
    /// then returns them oldest first.
    pub fn ending(end_date: NaiveDate, count: usize) -> MarginCallResult<Self> {
        let mut days = Vec::with_capacity(count);
        let mut current = end_date;

        while days.len() < count {
            if is_business_day(current) {
                days.push(current);
            }
            if days.len() == count {
                break;
            }
            current = current.pred_opt().ok_or_else(|| {
                MarginCallError::DateError(format!(
                    "calendar underflow walking back {count} business days from {end_date}"
                ))
            })?;
        }

        days.reverse();
        Ok(Self { days })
    }

    pub fn days(&self) -> &[NaiveDate] {
        &self.days
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn first(&self) -> Option<NaiveDate> {
        self.days.first().copied()
    }

    pub fn last(&self) -> Option<NaiveDate> {
        self.days.last().copied()
    }

    /// Position of `index` within the window as a fraction in `[0, 1)`.
    pub fn day_factor(&self, index: usize) -> f64 {
        if self.days.is_empty() {
            return 0.0;
        }
        index as f64 / self.days.len() as f64
    }

    /// True when two days in the window share a day-of-year, which makes
    /// their per-client random streams identical.
    pub fn repeats_day_of_year(&self) -> bool {
        let mut seen = HashSet::with_capacity(self.days.len());
        self.days.iter().any(|d| !seen.insert(d.ordinal()))
    }
}
