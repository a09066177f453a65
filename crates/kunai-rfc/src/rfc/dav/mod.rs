//! `CalDAV` request structures consumed by the index.

pub mod core;
