//! Indexed calendar collections.
//!
//! [`caldav::service::collection::IndexedCollection`] keeps a
//! [`kunai_db::db::store::IndexStore`] in step with an [`store::ObjectStore`]
//! and answers calendar-query filters from the index.

pub mod caldav;
pub mod error;
pub mod store;
pub mod telemetry;
