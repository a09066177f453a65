//! iCalendar DATE value and property value types (RFC 5545 §3.3).

use std::fmt;

use chrono::{NaiveDate, NaiveTime, Utc};

use super::DateTime;
use crate::error::{RfcError, RfcResult};

/// DATE value (RFC 5545 §3.3.4): a whole day with no time or zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Date {
    pub year: u16,
    /// 1-12.
    pub month: u8,
    /// 1-31.
    pub day: u8,
}

impl Date {
    #[must_use]
    pub const fn new(year: u16, month: u8, day: u8) -> Self {
        Self { year, month, day }
    }

    /// ## Errors
    /// Returns an error if the fields do not form a valid calendar date.
    pub fn to_naive(self) -> RfcResult<NaiveDate> {
        NaiveDate::from_ymd_opt(
            i32::from(self.year),
            u32::from(self.month),
            u32::from(self.day),
        )
        .ok_or_else(|| RfcError::ValidationError(format!("invalid DATE value: {self}")))
    }

    /// ## Summary
    /// Returns midnight at the start of this date, in UTC.
    ///
    /// ## Errors
    /// Returns an error if the fields do not form a valid calendar date.
    pub fn start_of_day_utc(self) -> RfcResult<chrono::DateTime<Utc>> {
        Ok(self.to_naive()?.and_time(NaiveTime::MIN).and_utc())
    }

    /// ## Summary
    /// Returns the last second of this date (23:59:59), in UTC.
    ///
    /// ## Errors
    /// Returns an error if the fields do not form a valid calendar date.
    pub fn end_of_day_utc(self) -> RfcResult<chrono::DateTime<Utc>> {
        let end = NaiveTime::from_hms_opt(23, 59, 59)
            .ok_or(RfcError::ValidationError("invalid end-of-day time".to_string()))?;
        Ok(self.to_naive()?.and_time(end).and_utc())
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}{:02}{:02}", self.year, self.month, self.day)
    }
}

/// Typed property value. The value text is kept on [`super::Property`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// `mailto:` or other calendar user address.
    CalAddress(String),
    Date(Date),
    DateTime(DateTime),
    Integer(i32),
    /// Recurrence rule text, not expanded.
    Recur(String),
    /// Unescaped text.
    Text(String),
    /// A value the object store did not type.
    Unknown(String),
}

impl Value {
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }
}
