//! Kunai shared building blocks: configuration, errors and constants used by
//! every layer of the calendar index.

pub mod config;
pub mod constants;
pub mod error;
