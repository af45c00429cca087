//! The date window a feed request covers.

use std::fmt;

use chrono::{Days, NaiveDate};
use serde::Serialize;

/// Longest span NeoWs accepts between `start_date` and `end_date`.
pub const MAX_SPAN_DAYS: u64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RangeError {
    #[error("start date {start} is after today ({today})")]
    StartInFuture { start: NaiveDate, today: NaiveDate },

    #[error("end date {end} is before start date {start}")]
    EndBeforeStart { start: NaiveDate, end: NaiveDate },

    #[error("end date {end} is more than 7 days after start date {start}")]
    SpanTooLong { start: NaiveDate, end: NaiveDate },
}

/// An inclusive `[start, end]` window that the feed endpoint will accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Validates `start <= today` and `start <= end <= start + 7 days`.
    pub fn new(start: NaiveDate, end: NaiveDate, today: NaiveDate) -> Result<Self, RangeError> {
        if start > today {
            return Err(RangeError::StartInFuture { start, today });
        }
        if end < start {
            return Err(RangeError::EndBeforeStart { start, end });
        }
        if start.checked_add_days(Days::new(MAX_SPAN_DAYS)).is_some_and(|limit| end > limit) {
            return Err(RangeError::SpanTooLong { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// `start_date` and `end_date` query pairs, ISO formatted.
    pub fn query_pairs(&self) -> [(&'static str, String); 2] {
        [
            ("start_date", self.start.format("%Y-%m-%d").to_string()),
            ("end_date", self.end.format("%Y-%m-%d").to_string()),
        ]
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}
