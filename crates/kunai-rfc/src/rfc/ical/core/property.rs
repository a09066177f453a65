//! Properties (RFC 5545 §3.8) as delivered by the object store.

use super::{Date, DateTime, Value};

/// A property: its upper-cased name, typed value and the value text it was
/// read from.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub name: String,
    pub value: Value,
    /// Value text as it appeared in the object.
    pub raw_value: String,
}

impl Property {
    fn build(name: impl Into<String>, value: Value, raw_value: String) -> Self {
        let mut name = name.into();
        name.make_ascii_uppercase();
        Self {
            name,
            value,
            raw_value,
        }
    }

    #[must_use]
    pub fn text(name: impl Into<String>, text: impl Into<String>) -> Self {
        let text = text.into();
        Self::build(name, Value::Text(text.clone()), text)
    }

    /// A calendar user address such as `ORGANIZER:mailto:...`.
    #[must_use]
    pub fn cal_address(name: impl Into<String>, address: impl Into<String>) -> Self {
        let address = address.into();
        Self::build(name, Value::CalAddress(address.clone()), address)
    }

    #[must_use]
    pub fn integer(name: impl Into<String>, value: i32) -> Self {
        Self::build(name, Value::Integer(value), value.to_string())
    }

    #[must_use]
    pub fn datetime(name: impl Into<String>, value: DateTime) -> Self {
        let raw = value.to_string();
        Self::build(name, Value::DateTime(value), raw)
    }

    #[must_use]
    pub fn date(name: impl Into<String>, value: Date) -> Self {
        let raw = value.to_string();
        Self::build(name, Value::Date(value), raw)
    }

    /// `RRULE` with the given rule text, kept unparsed.
    #[must_use]
    pub fn rrule(rule: impl Into<String>) -> Self {
        let rule = rule.into();
        Self::build(names::RRULE, Value::Recur(rule.clone()), rule)
    }

    /// A property whose value type the object store did not resolve.
    #[must_use]
    pub fn unknown(name: impl Into<String>, raw: impl Into<String>) -> Self {
        let raw = raw.into();
        Self::build(name, Value::Unknown(raw.clone()), raw)
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        self.value.as_text()
    }

    /// The text of a text value, otherwise the raw value text
    /// (`mailto:...` for a calendar address).
    #[must_use]
    pub fn text_or_raw(&self) -> &str {
        self.as_text().unwrap_or(&self.raw_value)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.raw_value.trim().is_empty()
    }
}

/// Upper-case property names.
pub mod names {
    pub const DESCRIPTION: &str = "DESCRIPTION";
    pub const DTEND: &str = "DTEND";
    pub const DTSTART: &str = "DTSTART";
    pub const LOCATION: &str = "LOCATION";
    pub const ORGANIZER: &str = "ORGANIZER";
    pub const RDATE: &str = "RDATE";
    pub const RRULE: &str = "RRULE";
    pub const SUMMARY: &str = "SUMMARY";
    pub const UID: &str = "UID";
}
