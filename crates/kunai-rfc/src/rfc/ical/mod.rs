//! iCalendar (RFC 5545) object model.

pub mod core;
