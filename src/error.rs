//! Error types for the snowline connector.

use snafu::prelude::*;

/// Errors that can occur during configuration parsing, validation,
/// and file discovery.
///
/// Discovery failures live here rather than in a separate enum because
/// an unreadable base directory or a pattern matching zero files is a
/// configuration mistake the user must fix, not a transient condition.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[snafu(display("Failed to read configuration file"))]
    ReadFile { source: std::io::Error },

    /// Failed to parse YAML configuration.
    #[snafu(display("Failed to parse YAML configuration"))]
    YamlParse { source: serde_yaml::Error },

    /// Environment variable interpolation failed.
    #[snafu(display("Environment variable interpolation failed:\n{message}"))]
    EnvInterpolation { message: String },

    /// Entity name is empty.
    #[snafu(display("Entity name cannot be empty"))]
    EmptyEntity,

    /// Source path is empty.
    #[snafu(display("Source path cannot be empty"))]
    EmptyPath,

    /// Search pattern is empty.
    #[snafu(display("Search pattern cannot be empty"))]
    EmptySearchPattern,

    /// An extraction path expression failed to compile.
    #[snafu(display("Invalid extraction path {expr:?}: {message}"))]
    InvalidPathExpression { expr: String, message: String },

    /// The configured base path is not an existing directory.
    #[snafu(display("Path does not lead to an existing directory: {path}"))]
    NotADirectory { path: String },

    /// The search pattern is not a valid glob.
    #[snafu(display("Invalid search pattern {pattern:?}"))]
    InvalidPattern {
        pattern: String,
        source: globset::Error,
    },

    /// Discovery found nothing. An empty result is treated as a broken
    /// path/pattern combination rather than a valid empty sync.
    #[snafu(display("No files found under {path} matching {pattern:?}"))]
    NoFilesMatched { path: String, pattern: String },

    /// Failed to walk the source directory.
    #[snafu(display("Failed to walk source directory"))]
    Walk { source: walkdir::Error },

    /// Failed to read file metadata during discovery.
    #[snafu(display("Failed to read metadata for {path}"))]
    FileMetadata {
        path: String,
        source: std::io::Error,
    },
}

/// Errors that can occur while turning raw lines into records.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum RecordError {
    /// A line is not valid JSON. Fatal to the sync; lines are never
    /// skipped. `line` is 1-based for error messages.
    #[snafu(display("Malformed JSON in {path} at line {line}: {source}"))]
    JsonParse {
        path: String,
        line: usize,
        source: serde_json::Error,
    },

    /// IO failure while reading a line from a source file.
    #[snafu(display("Failed to read line from {path}"))]
    LineRead {
        path: String,
        source: std::io::Error,
    },
}

/// Errors that can occur during path-based value extraction.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ExtractError {
    /// The path expression matched more than one value. Picking one
    /// silently would drop data, so this is a hard stop.
    #[snafu(display(
        "Extraction path {expr:?} matched {} values: {matches:?}",
        matches.len()
    ))]
    AmbiguousPath {
        expr: String,
        matches: Vec<serde_json::Value>,
    },
}

/// Errors that can occur while reading the framework-owned state file.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum StateError {
    /// Failed to read the state file.
    #[snafu(display("Failed to read state file {path}"))]
    ReadState {
        path: String,
        source: std::io::Error,
    },

    /// Failed to parse the state file as JSON.
    #[snafu(display("Failed to parse state file {path}"))]
    ParseState {
        path: String,
        source: serde_json::Error,
    },
}

/// Top-level sync errors.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum SyncError {
    /// Configuration error.
    #[snafu(display("Configuration error: {source}"))]
    Config { source: ConfigError },

    /// Record construction error.
    #[snafu(display("Record error: {source}"))]
    Record { source: RecordError },

    /// Extraction error.
    #[snafu(display("Extraction error: {source}"))]
    Extract { source: ExtractError },

    /// State file error.
    #[snafu(display("State error: {source}"))]
    State { source: StateError },
}

impl From<ConfigError> for SyncError {
    fn from(source: ConfigError) -> Self {
        SyncError::Config { source }
    }
}

impl From<RecordError> for SyncError {
    fn from(source: RecordError) -> Self {
        SyncError::Record { source }
    }
}

impl From<ExtractError> for SyncError {
    fn from(source: ExtractError) -> Self {
        SyncError::Extract { source }
    }
}

impl From<StateError> for SyncError {
    fn from(source: StateError) -> Self {
        SyncError::State { source }
    }
}
