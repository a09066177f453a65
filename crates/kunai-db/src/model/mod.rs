pub mod index_record;

pub use index_record::{IndexRecord, IndexValue};
