//! iCalendar DATE-TIME value type (RFC 5545 §3.3.5).

use std::fmt;

use chrono::{LocalResult, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::error::{RfcError, RfcResult};

/// How a DATE-TIME value is anchored (RFC 5545 §3.3.5).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateTimeForm {
    /// Local wall-clock time with no zone (`19980118T230000`).
    Floating,
    /// `Z` suffix (`19980119T070000Z`).
    Utc,
    /// Local time in the zone named by a `TZID` parameter.
    Zoned { tzid: String },
}

/// DATE-TIME value with its fields as written.
///
/// `second` may be 60 for a leap second.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateTime {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub form: DateTimeForm,
}

impl DateTime {
    const fn with_form(
        (year, month, day): (u16, u8, u8),
        (hour, minute, second): (u8, u8, u8),
        form: DateTimeForm,
    ) -> Self {
        Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
            form,
        }
    }

    #[must_use]
    pub const fn floating(year: u16, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> Self {
        Self::with_form((year, month, day), (hour, minute, second), DateTimeForm::Floating)
    }

    #[must_use]
    pub const fn utc(year: u16, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> Self {
        Self::with_form((year, month, day), (hour, minute, second), DateTimeForm::Utc)
    }

    /// Local time in the IANA zone `tzid`.
    #[must_use]
    pub fn zoned(
        year: u16,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
        tzid: impl Into<String>,
    ) -> Self {
        let form = DateTimeForm::Zoned { tzid: tzid.into() };
        Self::with_form((year, month, day), (hour, minute, second), form)
    }

    #[must_use]
    pub const fn is_utc(&self) -> bool {
        matches!(self.form, DateTimeForm::Utc)
    }

    #[must_use]
    pub fn tzid(&self) -> Option<&str> {
        match &self.form {
            DateTimeForm::Zoned { tzid } => Some(tzid),
            DateTimeForm::Floating | DateTimeForm::Utc => None,
        }
    }

    /// Returns the wall-clock value without any timezone interpretation.
    ///
    /// A leap second (`60`) is clamped to `59`.
    ///
    /// ## Errors
    /// Returns an error if the fields do not form a valid calendar date and time.
    pub fn to_naive(&self) -> RfcResult<NaiveDateTime> {
        NaiveDate::from_ymd_opt(
            i32::from(self.year),
            u32::from(self.month),
            u32::from(self.day),
        )
        .and_then(|date| {
            date.and_hms_opt(
                u32::from(self.hour),
                u32::from(self.minute),
                u32::from(self.second.min(59)),
            )
        })
        .ok_or_else(|| RfcError::ValidationError(format!("invalid DATE-TIME value: {self}")))
    }

    /// ## Summary
    /// Resolves this value to an absolute UTC instant.
    ///
    /// Floating values are read as UTC. Zoned values are resolved through the
    /// IANA database; an unknown TZID or a wall-clock time skipped by a DST
    /// transition falls back to UTC, and an ambiguous wall-clock time takes
    /// its earliest mapping.
    ///
    /// ## Errors
    /// Returns an error if the fields do not form a valid calendar date and time.
    pub fn to_utc(&self) -> RfcResult<chrono::DateTime<Utc>> {
        let naive = self.to_naive()?;
        match &self.form {
            DateTimeForm::Utc | DateTimeForm::Floating => Ok(naive.and_utc()),
            DateTimeForm::Zoned { tzid } => Ok(resolve_zoned(naive, tzid)),
        }
    }
}

fn resolve_zoned(naive: NaiveDateTime, tzid: &str) -> chrono::DateTime<Utc> {
    let Ok(tz) = tzid.parse::<chrono_tz::Tz>() else {
        tracing::debug!(tzid, "Unknown TZID, reading value as UTC");
        return naive.and_utc();
    };

    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt.with_timezone(&Utc),
        LocalResult::Ambiguous(earliest, _) => earliest.with_timezone(&Utc),
        LocalResult::None => {
            tracing::debug!(tzid, %naive, "Local time falls in a DST gap, reading value as UTC");
            naive.and_utc()
        }
    }
}

impl fmt::Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}{:02}{:02}T{:02}{:02}{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )?;
        if self.is_utc() {
            write!(f, "Z")?;
        }
        Ok(())
    }
}
