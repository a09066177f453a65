pub mod connection;
pub mod map;
pub mod query;
pub mod schema;
pub mod store;
pub mod transaction;

#[cfg(test)]
mod store_tests;
