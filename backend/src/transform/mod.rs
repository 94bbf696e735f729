//! Transformation module.
//!
//! - Splitter: the `Student` column split on an in-memory table
//! - Pipeline: decode, split and encode one upload

pub mod pipeline;
pub mod splitter;

pub use pipeline::*;
pub use splitter::{find_column, parse_student, split, ColumnSplitter, SplitReport, StudentId};
