//! SQL for the index record table.
pub mod index_record;
pub mod predicate;

pub use predicate::{Condition, Predicate, SearchRequest};

#[cfg(test)]
mod predicate_tests;
