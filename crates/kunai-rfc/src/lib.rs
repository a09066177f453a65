//! Calendar-side models consumed by the index: the iCalendar object model
//! (RFC 5545) and the calendar-query filter tree (RFC 4791 §9.7).

pub mod error;
pub mod rfc;
