//! Date ranges and the half-open windows they resolve to
//!
//! A range is resolved against an injected `now` carrying the user's UTC
//! offset. Calendar boundaries are computed in that local time and then
//! converted to UTC instants, so "today" is the user's calendar day no
//! matter where the transactions were recorded.

use chrono::{
    DateTime, Datelike, Days, FixedOffset, Months, NaiveDate, TimeZone, Utc,
};
use pocketbook_config::TimeRange;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Date-range filter value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "range", rename_all = "lowercase")]
pub enum DateRange {
    All,
    Today,
    Week,
    Month,
    Quarter,
    Year,
    /// Both calendar dates inclusive
    Custom { start: NaiveDate, end: NaiveDate },
}

impl Default for DateRange {
    fn default() -> Self {
        DateRange::All
    }
}

impl From<TimeRange> for DateRange {
    fn from(range: TimeRange) -> Self {
        match range {
            TimeRange::All => DateRange::All,
            TimeRange::Today => DateRange::Today,
            TimeRange::Week => DateRange::Week,
            TimeRange::Month => DateRange::Month,
            TimeRange::Quarter => DateRange::Quarter,
            TimeRange::Year => DateRange::Year,
        }
    }
}

impl DateRange {
    /// Build a custom range, rejecting an end before the start
    pub fn custom(start: NaiveDate, end: NaiveDate) -> CoreResult<Self> {
        let range = DateRange::Custom { start, end };
        range.validate()?;
        Ok(range)
    }

    /// Whether the range restricts anything
    pub fn is_all(&self) -> bool {
        matches!(self, DateRange::All)
    }

    pub fn validate(&self) -> CoreResult<()> {
        if let DateRange::Custom { start, end } = *self {
            if start > end {
                return Err(CoreError::InvalidDateRange { start, end });
            }
        }
        Ok(())
    }

    /// Resolve to a concrete window; `None` for `All`
    pub fn window(&self, now: &DateTime<FixedOffset>) -> CoreResult<Option<DateWindow>> {
        self.validate()?;
        let today = now.date_naive();

        let (first, next) = match *self {
            DateRange::All => return Ok(None),
            DateRange::Today => (today, add_days(today, 1)?),
            DateRange::Week => {
                let back = u64::from(today.weekday().num_days_from_monday());
                let first = today
                    .checked_sub_days(Days::new(back))
                    .ok_or_else(|| out_of_range(today))?;
                (first, add_days(first, 7)?)
            }
            DateRange::Month => {
                let first = first_of_month(today.year(), today.month())?;
                (first, add_months(first, 1)?)
            }
            DateRange::Quarter => {
                let first = first_of_month(today.year(), (today.month0() / 3) * 3 + 1)?;
                (first, add_months(first, 3)?)
            }
            DateRange::Year => {
                let first = first_of_month(today.year(), 1)?;
                (first, add_months(first, 12)?)
            }
            DateRange::Custom { start, end } => (start, add_days(end, 1)?),
        };

        let offset = *now.offset();
        Ok(Some(DateWindow {
            start: local_midnight(&offset, first)?,
            end: local_midnight(&offset, next)?,
            first_day: first,
            last_day: next.pred_opt().unwrap_or(first),
        }))
    }

    /// Human-readable label
    pub fn description(&self) -> String {
        match self {
            DateRange::All => "All Time".to_string(),
            DateRange::Today => "Today".to_string(),
            DateRange::Week => "This Week".to_string(),
            DateRange::Month => "This Month".to_string(),
            DateRange::Quarter => "This Quarter".to_string(),
            DateRange::Year => "This Year".to_string(),
            DateRange::Custom { start, end } => format!("{} to {}", start, end),
        }
    }
}

impl std::str::FromStr for DateRange {
    type Err = CoreError;

    /// Accepts a preset name or `START..END` with ISO dates
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Some((start, end)) = trimmed.split_once("..") {
            let parse = |v: &str| {
                NaiveDate::parse_from_str(v.trim(), "%Y-%m-%d")
                    .map_err(|_| CoreError::invalid_value("date range", s))
            };
            return DateRange::custom(parse(start)?, parse(end)?);
        }
        trimmed
            .parse::<TimeRange>()
            .map(DateRange::from)
            .map_err(|_| CoreError::invalid_value("date range", s))
    }
}

/// Resolved half-open interval `[start, end)` in UTC
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// First local calendar day covered
    pub first_day: NaiveDate,
    /// Last local calendar day covered
    pub last_day: NaiveDate,
}

impl DateWindow {
    pub fn contains(&self, instant: &DateTime<Utc>) -> bool {
        *instant >= self.start && *instant < self.end
    }
}

fn out_of_range(date: NaiveDate) -> CoreError {
    CoreError::invalid_value("date", format!("{} is outside the supported calendar", date))
}

fn add_days(date: NaiveDate, days: u64) -> CoreResult<NaiveDate> {
    date.checked_add_days(Days::new(days))
        .ok_or_else(|| out_of_range(date))
}

fn add_months(date: NaiveDate, months: u32) -> CoreResult<NaiveDate> {
    date.checked_add_months(Months::new(months))
        .ok_or_else(|| out_of_range(date))
}

fn first_of_month(year: i32, month: u32) -> CoreResult<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| CoreError::invalid_value("date", format!("{}-{:02}", year, month)))
}

fn local_midnight(offset: &FixedOffset, date: NaiveDate) -> CoreResult<DateTime<Utc>> {
    date.and_hms_opt(0, 0, 0)
        .and_then(|naive| offset.from_local_datetime(&naive).single())
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| out_of_range(date))
}
