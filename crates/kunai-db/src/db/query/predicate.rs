//! Translation of search requests into a parameterized `WHERE` clause.
//!
//! A request maps field names to conditions. Each entry becomes one
//! parenthesized leg and legs are joined with `AND`. The two range fields
//! get dedicated legs so that a request bounded by a window `[A, B]` selects
//! every record whose `[dtstart, dtend]` interval overlaps it, plus every
//! recurrent record regardless of its stored interval.

use kunai_core::constants::{DTEND_FIELD, DTSTART_FIELD};

use crate::db::schema::{RECURRENT_COLUMN, quote_identifier};
use crate::model::IndexValue;

/// Always-true clause used when a request has no entries.
pub const MATCH_ALL: &str = "1";

/// A condition on one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// The field contains the text (ASCII case-insensitive).
    Contains(String),
    /// The field is absent or does not contain the text.
    NotContains(String),
    /// A UTC instant in Unix seconds; a window bound on the range fields.
    Instant(i64),
}

impl Condition {
    fn bound(&self) -> IndexValue {
        match self {
            Self::Contains(text) | Self::NotContains(text) => IndexValue::Text(text.clone()),
            Self::Instant(seconds) => IndexValue::Instant(*seconds),
        }
    }
}

/// Ordered field-to-condition mapping.
///
/// Setting a field that is already present replaces its condition and keeps
/// its original position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchRequest {
    entries: Vec<(String, Condition)>,
}

impl SearchRequest {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the condition for `field`, replacing any previous one in place.
    pub fn set(&mut self, field: impl Into<String>, condition: Condition) {
        let field = field.into();
        match self.entries.iter_mut().find(|(f, _)| *f == field) {
            Some((_, existing)) => *existing = condition,
            None => self.entries.push((field, condition)),
        }
    }

    #[must_use]
    pub fn with(mut self, field: impl Into<String>, condition: Condition) -> Self {
        self.set(field, condition);
        self
    }

    /// Lower window bound: selects records ending at or after `seconds`.
    #[must_use]
    pub fn range_start(self, seconds: i64) -> Self {
        self.with(DTSTART_FIELD, Condition::Instant(seconds))
    }

    /// Upper window bound: selects records starting at or before `seconds`.
    #[must_use]
    pub fn range_end(self, seconds: i64) -> Self {
        self.with(DTEND_FIELD, Condition::Instant(seconds))
    }

    #[must_use]
    pub fn contains(self, field: impl Into<String>, text: impl Into<String>) -> Self {
        self.with(field, Condition::Contains(text.into()))
    }

    #[must_use]
    pub fn not_contains(self, field: impl Into<String>, text: impl Into<String>) -> Self {
        self.with(field, Condition::NotContains(text.into()))
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Condition> {
        self.entries
            .iter()
            .find_map(|(f, condition)| (f == field).then_some(condition))
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &Condition)> {
        self.entries.iter().map(|(f, c)| (f.as_str(), c))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A translated `WHERE` clause with its positional parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate {
    clause: String,
    params: Vec<IndexValue>,
}

impl Predicate {
    /// ## Summary
    /// Translates `request` into a clause over the record table.
    ///
    /// Field names are emitted as quoted identifiers without checking them
    /// against a schema; an unknown field fails when the clause is executed.
    #[must_use]
    pub fn translate(request: &SearchRequest) -> Self {
        if request.is_empty() {
            return Self::match_all();
        }

        let mut legs = Vec::with_capacity(request.len());
        let mut params = Vec::with_capacity(request.len());

        for (field, condition) in request.entries() {
            legs.push(format!("({})", leg(field, condition)));
            params.push(match condition {
                Condition::Contains(text) | Condition::NotContains(text)
                    if !is_range_field(field) =>
                {
                    IndexValue::Text(like_pattern(text))
                }
                _ => condition.bound(),
            });
        }

        Self {
            clause: legs.join(" AND "),
            params,
        }
    }

    #[must_use]
    pub fn match_all() -> Self {
        Self {
            clause: MATCH_ALL.to_owned(),
            params: Vec::new(),
        }
    }

    #[must_use]
    pub fn clause(&self) -> &str {
        &self.clause
    }

    #[must_use]
    pub fn params(&self) -> &[IndexValue] {
        &self.params
    }

    #[must_use]
    pub fn is_match_all(&self) -> bool {
        self.clause == MATCH_ALL
    }
}

fn is_range_field(field: &str) -> bool {
    field == DTSTART_FIELD || field == DTEND_FIELD
}

fn leg(field: &str, condition: &Condition) -> String {
    if field == DTSTART_FIELD {
        return format!(
            "? <= {} OR {RECURRENT_COLUMN}",
            quote_identifier(DTEND_FIELD)
        );
    }
    if field == DTEND_FIELD {
        return format!("? >= {}", quote_identifier(DTSTART_FIELD));
    }

    let column = quote_identifier(field);
    match condition {
        Condition::Contains(_) => format!("{column} LIKE ? ESCAPE '\\'"),
        Condition::NotContains(_) => {
            format!("{column} IS NULL OR {column} NOT LIKE ? ESCAPE '\\'")
        }
        Condition::Instant(_) => format!("{column} = ?"),
    }
}

/// Wraps `text` in `%` wildcards, escaping LIKE metacharacters so the text
/// matches literally.
#[must_use]
pub fn like_pattern(text: &str) -> String {
    let mut pattern = String::with_capacity(text.len() + 2);
    pattern.push('%');
    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
