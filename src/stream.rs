//! The per-file, per-line record stream.
//!
//! Wires discovery, watermark filtering, line reading, and record
//! construction into a single pull-based iterator. Files are read one
//! at a time in modification-time order; only the path list is held in
//! memory, line content is streamed.

use std::path::Path;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::config::Config;
use crate::error::SyncError;
use crate::record::{Record, RecordBuilder};
use crate::schema::RecordSchema;
use crate::source::{LineReader, SourceFile, discover_files, filter_modified_after};

/// Replication key advertised for every stream. Records are emitted in
/// non-decreasing order of this field.
pub const REPLICATION_KEY: &str = "_modified_time";

/// Natural key of an emitted record.
pub const PRIMARY_KEYS: [&str; 2] = ["source_file", "serial_number"];

/// Read position within the file currently being consumed.
#[derive(Debug)]
struct FileCursor {
    source_file: String,
    modified_time: DateTime<Utc>,
    reader: LineReader,
    serial_number: usize,
}

/// Lazily yields one record per JSON line from every file that survived
/// the watermark filter.
///
/// Errors are terminal: after the first `Err` item the iterator yields
/// `None`, matching the no-skip, no-recovery sync contract.
#[derive(Debug)]
pub struct RecordStream {
    name: String,
    schema: RecordSchema,
    builder: RecordBuilder,
    pending: std::vec::IntoIter<SourceFile>,
    current: Option<FileCursor>,
    done: bool,
}

impl RecordStream {
    /// Discover and filter source files, compile the extraction rules,
    /// and derive the schema.
    ///
    /// Discovery and filtering happen here, once; iteration only opens
    /// and reads files. `watermark` is the externally persisted starting
    /// timestamp; `None` means a cold start.
    pub fn new(config: &Config, watermark: Option<DateTime<Utc>>) -> Result<Self, SyncError> {
        let schema = RecordSchema::derive(&config.variables_to_extract);
        let builder = RecordBuilder::from_config(&config.variables_to_extract)?;

        let found = discover_files(Path::new(&config.path), &config.search_pattern)?;
        info!(
            stream = %config.entity,
            count = found.len(),
            "Found matching source files"
        );
        debug!(
            stream = %config.entity,
            files = ?found.iter().map(|f| f.path.display().to_string()).collect::<Vec<_>>(),
            "Discovered file set"
        );

        if let Some(watermark) = watermark {
            info!(stream = %config.entity, %watermark, "Starting timestamp");
        }
        let pending = filter_modified_after(found, watermark);
        info!(
            stream = %config.entity,
            count = pending.len(),
            "Files remaining after filtering already synced files"
        );

        Ok(Self {
            name: config.entity.clone(),
            schema,
            builder,
            pending: pending.into_iter(),
            current: None,
            done: false,
        })
    }

    /// Name of the stream, from the `entity` config key.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The derived record schema, computed once at construction.
    pub fn schema(&self) -> &RecordSchema {
        &self.schema
    }

    fn next_record(&mut self) -> Result<Option<Record>, SyncError> {
        loop {
            if let Some(cursor) = self.current.as_mut() {
                match cursor.reader.next() {
                    Some(line) => {
                        let line = line?;
                        let serial_number = cursor.serial_number;
                        cursor.serial_number += 1;
                        let source_file = cursor.source_file.clone();
                        let modified_time = cursor.modified_time;
                        let record = self.builder.build(
                            &line,
                            &source_file,
                            serial_number,
                            modified_time,
                        )?;
                        return Ok(Some(record));
                    }
                    None => {
                        // File exhausted; drop the handle before moving on.
                        self.current = None;
                        continue;
                    }
                }
            }

            let Some(file) = self.pending.next() else {
                return Ok(None);
            };
            debug!(stream = %self.name, path = %file.path.display(), "Reading file");
            let reader = LineReader::open(&file.path)?;
            self.current = Some(FileCursor {
                source_file: reader.path().to_string(),
                modified_time: file.modified_time,
                reader,
                serial_number: 0,
            });
        }
    }
}

impl Iterator for RecordStream {
    type Item = Result<Record, SyncError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(error) => {
                self.done = true;
                self.current = None;
                Some(Err(error))
            }
        }
    }
}
