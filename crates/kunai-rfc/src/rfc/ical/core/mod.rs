//! iCalendar object model (RFC 5545) read by the index.
//!
//! This module defines the data structures the index reads calendar objects
//! through. Parsing iCalendar text is left to the object store; values arrive
//! here already typed.

mod component;
mod datetime;
mod property;
mod value;

pub use component::{Component, ComponentKind, ICalendar};
pub use datetime::{DateTime, DateTimeForm};
pub use property::{Property, names};
pub use value::{Date, Value};
