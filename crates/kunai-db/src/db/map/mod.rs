//! Mapping from calendar objects to index records.
pub mod caldav;

pub use caldav::extract_record;
