//! SQLite-backed secondary index over a calendar-object store.
//!
//! [`db::store::IndexStore`] owns one database per collection and heals
//! itself when the persisted layout drifts from the configured
//! [`db::schema::FieldSchema`]. [`db::map`] derives index records from
//! calendar objects and [`db::query`] translates search requests into SQL.

pub mod db;
pub mod error;
pub mod model;
