//! Starting-watermark lookup from a framework-owned state file.
//!
//! Persisted state belongs to the orchestrating framework; this module
//! only reads the starting timestamp back out of it and never writes.
//! The file is JSON of the shape:
//!
//! ```json
//! {"bookmarks": {"events": {"_modified_time": "2026-01-28T14:00:00Z"}}}
//! ```

use std::collections::HashMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use snafu::ResultExt;

use crate::error::{ParseStateSnafu, ReadStateSnafu, StateError};

#[derive(Debug, Deserialize)]
struct Bookmark {
    #[serde(rename = "_modified_time")]
    modified_time: Option<DateTime<Utc>>,
}

/// Replication state as handed over by the framework.
#[derive(Debug, Default, Deserialize)]
pub struct State {
    #[serde(default)]
    bookmarks: HashMap<String, Bookmark>,
}

impl State {
    /// Load state from a JSON file.
    ///
    /// A missing file is a cold start, not an error; a present but
    /// unparseable file is an error.
    pub fn from_file(path: &Path) -> Result<Self, StateError> {
        let display = path.display().to_string();
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(e).context(ReadStateSnafu { path: display });
            }
        };
        serde_json::from_str(&contents).context(ParseStateSnafu { path: display })
    }

    /// Starting watermark for the named stream, if one was persisted.
    pub fn starting_timestamp(&self, stream: &str) -> Option<DateTime<Utc>> {
        self.bookmarks
            .get(stream)
            .and_then(|bookmark| bookmark.modified_time)
    }
}
