//! Snowline: incremental JSON-Lines file connector.
//!
//! This crate handles:
//! - Discovering files in a directory by glob pattern, ordered by
//!   modification time
//! - Filtering out files at or below a starting watermark
//! - Reading each surviving file line by line and parsing every line
//!   as JSON
//! - Attaching provenance fields (`source_file`, `serial_number`,
//!   `json_object`, `_modified_time`) and configured extracted columns
//!   to each record
//! - Deriving the record schema from the extraction rules

pub mod config;
pub mod error;
pub mod extract;
pub mod record;
pub mod schema;
pub mod source;
pub mod state;
pub mod stream;
pub mod tracing;

// Re-export commonly used items
pub use config::{CompressionFormat, Config, ExtractionRule};
pub use error::{ConfigError, ExtractError, RecordError, StateError, SyncError};
pub use extract::{Extraction, PathExpr};
pub use record::{Record, RecordBuilder};
pub use schema::{RecordSchema, SchemaType};
pub use source::{SourceFile, discover_files, filter_modified_after};
pub use state::State;
pub use stream::{PRIMARY_KEYS, REPLICATION_KEY, RecordStream};
pub use tracing::init_tracing;
