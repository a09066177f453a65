//! Index record extraction from iCalendar objects.

use kunai_core::constants::{DTEND_FIELD, DTSTART_FIELD};
use kunai_rfc::rfc::ical::core::{Component, ICalendar, Property, Value};

use crate::db::schema::{FieldSchema, property_name_for_field};
use crate::error::{DbError, DbResult};
use crate::model::{IndexRecord, IndexValue};

/// ## Summary
/// Derives the index record for the object stored at `href`.
///
/// Values come from the object's primary component: the first `VEVENT`,
/// else `VTODO`, else `VJOURNAL`. Each field reads the property of the same
/// name (`last_modified` reads `LAST-MODIFIED`); an absent property records
/// [`IndexValue::Null`].
///
/// `dtstart` and `dtend` record UTC instants. A bare date counts from the
/// start of its day for `dtstart` and up to the end of its day for `dtend`.
/// Other fields record the property text, or the raw iCalendar value for
/// non-text properties.
///
/// ## Errors
/// Returns [`DbError::NoIndexableComponent`] if the object has no primary
/// component, or an error if a date or date-time value is not a valid
/// calendar date.
#[tracing::instrument(skip(ical, schema))]
pub fn extract_record(href: &str, ical: &ICalendar, schema: &FieldSchema) -> DbResult<IndexRecord> {
    let component = ical
        .primary_component()
        .ok_or_else(|| DbError::NoIndexableComponent(href.to_owned()))?;

    let values = schema
        .fields()
        .iter()
        .map(|field| field_value(component, field))
        .collect::<DbResult<Vec<_>>>()?;

    Ok(IndexRecord::new(href, component.has_recurrence(), values))
}

fn field_value(component: &Component, field: &str) -> DbResult<IndexValue> {
    let Some(property) = component.property(&property_name_for_field(field)) else {
        return Ok(IndexValue::Null);
    };

    if field == DTSTART_FIELD || field == DTEND_FIELD {
        return instant_value(property, field == DTEND_FIELD);
    }

    Ok(IndexValue::from(property.text_or_raw()))
}

fn instant_value(property: &Property, end_of_range: bool) -> DbResult<IndexValue> {
    let instant = match &property.value {
        Value::DateTime(dt) => dt.to_utc()?,
        Value::Date(date) if end_of_range => date.end_of_day_utc()?,
        Value::Date(date) => date.start_of_day_utc()?,
        other => {
            tracing::debug!(property = %property.name, value = ?other, "Time property has no date value");
            return Ok(IndexValue::Null);
        }
    };

    Ok(IndexValue::Instant(instant.timestamp()))
}
