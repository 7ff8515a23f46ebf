//! Lazy line reading for JSON-Lines input files.

use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;

use snafu::ResultExt;

use crate::error::{LineReadSnafu, RecordError};

/// Forward-only iterator over the trimmed lines of one input file.
///
/// Lines are stripped of leading and trailing whitespace but otherwise
/// passed through; blank lines are not filtered, so an empty line
/// reaches the JSON parser and fails there. The file handle is released
/// when the reader is dropped, whether or not iteration finished.
#[derive(Debug)]
pub struct LineReader {
    path: String,
    lines: Lines<BufReader<File>>,
}

impl LineReader {
    /// Open `path` for reading.
    pub fn open(path: &Path) -> Result<Self, RecordError> {
        let display = path.display().to_string();
        let file = File::open(path).context(LineReadSnafu {
            path: display.clone(),
        })?;
        Ok(Self {
            path: display,
            lines: BufReader::new(file).lines(),
        })
    }

    /// Path of the underlying file, as opened.
    pub fn path(&self) -> &str {
        &self.path
    }
}

impl Iterator for LineReader {
    type Item = Result<String, RecordError>;

    fn next(&mut self) -> Option<Self::Item> {
        let line = self.lines.next()?;
        Some(
            line.map(|l| l.trim().to_string())
                .context(LineReadSnafu {
                    path: self.path.clone(),
                }),
        )
    }
}
