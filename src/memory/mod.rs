//! Fully materialized, disconnected cursors.

mod dataset;

pub use dataset::MemoryDataSet;
