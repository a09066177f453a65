//! Index search requests derived from calendar-query filters.
//!
//! Only the parts of a filter the index can answer are kept: time ranges
//! and text matches on the primary component. The resulting candidate list
//! may hold objects the full filter rejects.

use kunai_core::constants::{DTEND_FIELD, DTSTART_FIELD};
use kunai_db::db::query::predicate::{Condition, SearchRequest};
use kunai_db::db::schema::field_name_for_property;
use kunai_rfc::rfc::dav::core::{CalendarFilter, CompFilter, PropFilter, TimeRange};
use kunai_rfc::rfc::ical::core::ComponentKind;

/// ## Summary
/// Builds the index search request for `filter`.
///
/// A `time-range` sets the `dtstart` bound from its start and the `dtend`
/// bound from its end. A `prop-filter` with a `text-match` sets the field
/// named after the property to a contains, or does-not-contain, condition.
/// Later entries replace earlier ones for the same field.
///
/// Component filters below `VEVENT`, `VTODO` and `VJOURNAL` (alarms, for
/// example) and `is-not-defined` tests are skipped: the index only
/// summarizes the primary component.
#[must_use]
pub fn search_request(filter: &CalendarFilter) -> SearchRequest {
    let mut request = SearchRequest::new();
    for comp in &filter.filters {
        fill_request(comp, &mut request);
    }

    request
}

fn fill_request(filter: &CompFilter, request: &mut SearchRequest) {
    if filter.is_not_defined {
        return;
    }

    match ComponentKind::parse(&filter.name) {
        ComponentKind::Calendar => {
            for comp in &filter.comp_filters {
                fill_request(comp, request);
            }
        }
        kind if kind.is_schedulable() => {
            if let Some(range) = &filter.time_range {
                apply_time_range(request, range);
            }
            for prop in &filter.prop_filters {
                apply_prop_filter(request, prop);
            }
        }
        kind => tracing::trace!(%kind, "Component filter not answerable from the index"),
    }
}

fn apply_time_range(request: &mut SearchRequest, range: &TimeRange) {
    if let Some(start) = range.start {
        request.set(DTSTART_FIELD, Condition::Instant(start.timestamp()));
    }
    if let Some(end) = range.end {
        request.set(DTEND_FIELD, Condition::Instant(end.timestamp()));
    }
}

fn apply_prop_filter(request: &mut SearchRequest, filter: &PropFilter) {
    if filter.is_not_defined {
        return;
    }
    let Some(text_match) = &filter.text_match else {
        return;
    };

    let condition = if text_match.negate {
        Condition::NotContains(text_match.value.clone())
    } else {
        Condition::Contains(text_match.value.clone())
    };
    request.set(field_name_for_property(&filter.name), condition);
}
