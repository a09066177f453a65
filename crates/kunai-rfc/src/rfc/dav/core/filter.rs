//! `CalDAV` calendar-query filter tree (RFC 4791 §9.7).
//!
//! The protocol layer builds these from a `calendar-query` REPORT body; the
//! index only reads the parts it can answer (time ranges and text matches).

use chrono::{NaiveDate, NaiveDateTime, Utc};

use crate::error::{RfcError, RfcResult};
use crate::rfc::ical::core::ComponentKind;

/// `CALDAV:filter` root of a `calendar-query`.
#[derive(Debug, Clone)]
pub struct CalendarFilter {
    /// Root component name, `VCALENDAR` in practice.
    pub component: String,
    /// Top-level `comp-filter`s.
    pub filters: Vec<CompFilter>,
}

impl CalendarFilter {
    #[must_use]
    pub fn vcalendar() -> Self {
        Self {
            component: ComponentKind::Calendar.as_str().to_owned(),
            filters: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_comp(mut self, filter: CompFilter) -> Self {
        self.filters.push(filter);
        self
    }
}

/// `comp-filter`: conditions on components of one name.
#[derive(Debug, Clone)]
pub struct CompFilter {
    pub name: String,
    /// Matches when no such component exists.
    pub is_not_defined: bool,
    pub time_range: Option<TimeRange>,
    pub prop_filters: Vec<PropFilter>,
    pub comp_filters: Vec<CompFilter>,
}

impl CompFilter {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_not_defined: false,
            time_range: None,
            prop_filters: Vec::new(),
            comp_filters: Vec::new(),
        }
    }

    #[must_use]
    pub fn not_defined(mut self) -> Self {
        self.is_not_defined = true;
        self
    }

    #[must_use]
    pub fn with_time_range(mut self, range: TimeRange) -> Self {
        self.time_range = Some(range);
        self
    }

    #[must_use]
    pub fn with_prop_filter(mut self, filter: PropFilter) -> Self {
        self.prop_filters.push(filter);
        self
    }

    #[must_use]
    pub fn with_comp(mut self, filter: CompFilter) -> Self {
        self.comp_filters.push(filter);
        self
    }
}

/// `prop-filter`: conditions on one property of the enclosing component.
#[derive(Debug, Clone)]
pub struct PropFilter {
    pub name: String,
    /// Matches when the property is absent.
    pub is_not_defined: bool,
    pub text_match: Option<TextMatch>,
    /// Range test on a date-valued property; never answered by the index.
    pub time_range: Option<TimeRange>,
}

impl PropFilter {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_not_defined: false,
            text_match: None,
            time_range: None,
        }
    }

    #[must_use]
    pub fn not_defined(mut self) -> Self {
        self.is_not_defined = true;
        self
    }

    #[must_use]
    pub fn with_text_match(mut self, text_match: TextMatch) -> Self {
        self.text_match = Some(text_match);
        self
    }
}

/// `text-match`: substring test, negated by `negate-condition="yes"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextMatch {
    pub value: String,
    pub negate: bool,
}

impl TextMatch {
    #[must_use]
    pub fn contains(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            negate: false,
        }
    }

    #[must_use]
    pub fn negate(mut self) -> Self {
        self.negate = true;
        self
    }
}

/// `time-range` bounds in UTC; either side may be open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeRange {
    pub start: Option<chrono::DateTime<Utc>>,
    pub end: Option<chrono::DateTime<Utc>>,
}

impl TimeRange {
    #[must_use]
    pub fn new(start: chrono::DateTime<Utc>, end: chrono::DateTime<Utc>) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    /// Open-ended range starting at `start`.
    #[must_use]
    pub fn since(start: chrono::DateTime<Utc>) -> Self {
        Self {
            start: Some(start),
            end: None,
        }
    }

    /// Range ending at `end` with no lower bound.
    #[must_use]
    pub fn until(end: chrono::DateTime<Utc>) -> Self {
        Self {
            start: None,
            end: Some(end),
        }
    }

    /// ## Summary
    /// Builds a time range from the `start`/`end` attributes of a
    /// `time-range` element.
    ///
    /// Accepts basic ISO 8601 values: `YYYYMMDDTHHMMSSZ`, naive
    /// `YYYYMMDDTHHMMSS` (read as UTC), and date-only `YYYYMMDD`, which
    /// expands to the start of the day for `start` and to 23:59:59 for `end`.
    ///
    /// ## Errors
    /// Returns [`RfcError::ParseError`] if a bound is not in one of these forms.
    pub fn parse(start: Option<&str>, end: Option<&str>) -> RfcResult<Self> {
        Ok(Self {
            start: start.map(|s| parse_bound(s, BoundRole::Start)).transpose()?,
            end: end.map(|s| parse_bound(s, BoundRole::End)).transpose()?,
        })
    }

    /// Returns whether neither bound is set.
    #[must_use]
    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }
}

#[derive(Debug, Clone, Copy)]
enum BoundRole {
    Start,
    End,
}

fn parse_bound(text: &str, role: BoundRole) -> RfcResult<chrono::DateTime<Utc>> {
    let text = text.trim();

    if let Ok(naive) = NaiveDateTime::parse_from_str(text, "%Y%m%dT%H%M%SZ")
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y%m%dT%H%M%S"))
    {
        return Ok(naive.and_utc());
    }

    let date = NaiveDate::parse_from_str(text, "%Y%m%d")
        .map_err(|e| RfcError::ParseError(format!("invalid time-range value {text:?}: {e}")))?;

    let time = match role {
        BoundRole::Start => date.and_hms_opt(0, 0, 0),
        BoundRole::End => date.and_hms_opt(23, 59, 59),
    };
    time.map(|naive| naive.and_utc())
        .ok_or_else(|| RfcError::ParseError(format!("invalid time-range value {text:?}")))
}
