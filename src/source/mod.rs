//! File discovery and line reading for the local filesystem source.

pub mod listing;
pub mod reader;

pub use listing::{SourceFile, discover_files, filter_modified_after};
pub use reader::LineReader;
