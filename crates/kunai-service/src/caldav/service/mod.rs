//! Calendar collection services.
pub mod collection;
pub mod filter;
