// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Time buckets and the history lookback window

use std::fmt;
use std::str::FromStr;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Datelike, FixedOffset, Local, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default bucket format: full month name and year ("October 2026")
pub const DEFAULT_DATE_FORMAT: &str = "%B %Y";

/// Errors from bucket and lookback configuration
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PeriodError {
    /// The strftime pattern contains an unknown specifier
    #[error("Invalid date format '{0}'")]
    InvalidDateFormat(String),

    /// The lookback reaches before the representable calendar
    #[error("Cannot look back {0} months")]
    InvalidLookback(u32),
}

/// A validated strftime pattern used to derive bucket keys
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DateFormat(String);

impl DateFormat {
    /// Validate a strftime pattern
    ///
    /// # Errors
    ///
    /// Returns `PeriodError::InvalidDateFormat` if chrono cannot parse it.
    pub fn new(pattern: &str) -> Result<Self, PeriodError> {
        if StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error)) {
            return Err(PeriodError::InvalidDateFormat(pattern.to_string()));
        }
        Ok(Self(pattern.to_string()))
    }

    /// The pattern text
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.0
    }

    /// Format a point in time as a bucket key
    #[must_use]
    pub fn bucket_key(&self, at: &DateTime<FixedOffset>) -> String {
        at.format(&self.0).to_string()
    }
}

impl Default for DateFormat {
    fn default() -> Self {
        Self(DEFAULT_DATE_FORMAT.to_string())
    }
}

impl FromStr for DateFormat {
    type Err = PeriodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for DateFormat {
    type Error = PeriodError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<DateFormat> for String {
    fn from(value: DateFormat) -> Self {
        value.0
    }
}

impl fmt::Display for DateFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Timezone commit timestamps are bucketed in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BucketTimezone {
    /// The machine's local timezone
    #[default]
    Local,
    /// Coordinated Universal Time
    Utc,
}

impl BucketTimezone {
    /// Convert a UTC instant into this timezone, keeping the offset
    #[must_use]
    pub fn localize(self, at: DateTime<Utc>) -> DateTime<FixedOffset> {
        match self {
            Self::Local => at.with_timezone(&Local).fixed_offset(),
            Self::Utc => at.fixed_offset(),
        }
    }
}

/// First day of the month `months_ago` months before `today`
///
/// ```
/// use chrono::NaiveDate;
/// use doclog::period::since_date;
///
/// let today = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
/// assert_eq!(since_date(today, 3).unwrap(), NaiveDate::from_ymd_opt(2026, 7, 1).unwrap());
/// ```
///
/// # Errors
///
/// Returns `PeriodError::InvalidLookback` if the date would underflow.
pub fn since_date(today: NaiveDate, months_ago: u32) -> Result<NaiveDate, PeriodError> {
    today
        .with_day(1)
        .and_then(|first| first.checked_sub_months(Months::new(months_ago)))
        .ok_or(PeriodError::InvalidLookback(months_ago))
}
