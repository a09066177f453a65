mod filter;

pub use filter::{CalendarFilter, CompFilter, PropFilter, TextMatch, TimeRange};
