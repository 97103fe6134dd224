//! Core data structures for observation tables.

mod key;
mod table;

pub use key::KeyValue;
pub use table::{Column, ObservationTable, Reduction, TableBuilder};
