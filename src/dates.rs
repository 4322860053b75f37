use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};

use crate::error::{Error, Result};

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

fn first_of_month(day: NaiveDate) -> NaiveDate {
    day.with_day(1).unwrap_or(day)
}

fn previous_month(today: NaiveDate) -> DateRange {
    let last = first_of_month(today) - Duration::days(1);
    DateRange {
        from: first_of_month(last),
        to: last,
    }
}

impl DateRange {
    /// The 1st of the current month through `today`; on the 1st itself, the
    /// whole previous month.
    pub fn month_to_date(today: NaiveDate) -> Self {
        Self::month_to_date_with_grace(today, 1)
    }

    /// Like [`DateRange::month_to_date`] but keeps reporting the previous
    /// month for the first `grace_days` days.
    pub fn month_to_date_with_grace(today: NaiveDate, grace_days: u32) -> Self {
        if today.day() <= grace_days {
            previous_month(today)
        } else {
            DateRange {
                from: first_of_month(today),
                to: today,
            }
        }
    }

    /// The 1st of the current month through `today`, even on the 1st.
    pub fn current_month(today: NaiveDate) -> Self {
        Self::month_to_date_with_grace(today, 0)
    }

    pub fn yesterday(today: NaiveDate) -> Self {
        let day = today - Duration::days(1);
        DateRange { from: day, to: day }
    }

    /// Explicit bounds override the default one end at a time.
    pub fn resolve(from: Option<&str>, to: Option<&str>, default: DateRange) -> Result<Self> {
        let from = match from.map(str::trim).filter(|value| !value.is_empty()) {
            Some(value) => parse_date(value)?,
            None => default.from,
        };
        let to = match to.map(str::trim).filter(|value| !value.is_empty()) {
            Some(value) => parse_date(value)?,
            None => default.to,
        };
        Ok(DateRange { from, to })
    }

    pub fn from_date(&self) -> String {
        self.from.format(DATE_FORMAT).to_string()
    }

    pub fn to_date(&self) -> String {
        self.to.format(DATE_FORMAT).to_string()
    }

    /// Inclusive datetime lower bound, `YYYY-MM-DD 00:00:00`.
    pub fn start_of_day(&self) -> String {
        format!("{} 00:00:00", self.from_date())
    }

    /// Inclusive datetime upper bound, `YYYY-MM-DD 23:59:59`.
    pub fn end_of_day(&self) -> String {
        format!("{} 23:59:59", self.to_date())
    }
}

pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(value, DATETIME_FORMAT).map(|dt| dt.date()))
        .map_err(|_| Error::InvalidDate(value.to_string()))
}
