//! Modification-time ordered file discovery and watermark filtering.
//!
//! Discovery resolves a base directory and a glob pattern into the list
//! of matching files, ascending by modification time. Each file is
//! statted exactly once per discovery pass and the result is cached on
//! [`SourceFile`], so filtering reuses the same observation.
//!
//! Ordering of files that share a modification time follows the
//! directory walk and is not guaranteed deterministic across platforms.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use globset::GlobBuilder;
use snafu::ResultExt;
use tracing::debug;
use walkdir::WalkDir;

use crate::error::{
    ConfigError, FileMetadataSnafu, InvalidPatternSnafu, NoFilesMatchedSnafu,
    NotADirectorySnafu, WalkSnafu,
};

/// A file matched by the search pattern, with the modification time
/// observed during discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub modified_time: DateTime<Utc>,
}

/// Discover files under `base` whose path relative to `base` matches
/// `pattern`, sorted ascending by modification time.
///
/// `*` does not cross directory separators; `**` does. Matching zero
/// files is an error: an empty discovery is treated as a misconfigured
/// path or pattern, not a valid empty sync.
pub fn discover_files(base: &Path, pattern: &str) -> Result<Vec<SourceFile>, ConfigError> {
    if !base.is_dir() {
        return NotADirectorySnafu {
            path: base.display().to_string(),
        }
        .fail();
    }

    let matcher = GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .context(InvalidPatternSnafu { pattern })?
        .compile_matcher();

    let mut files = Vec::new();
    for entry in WalkDir::new(base) {
        let entry = entry.context(WalkSnafu)?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(base) else {
            continue;
        };
        if !matcher.is_match(relative) {
            continue;
        }
        let metadata = entry
            .metadata()
            .map_err(std::io::Error::from)
            .context(FileMetadataSnafu {
                path: entry.path().display().to_string(),
            })?;
        let modified = metadata.modified().context(FileMetadataSnafu {
            path: entry.path().display().to_string(),
        })?;
        files.push(SourceFile {
            path: entry.into_path(),
            modified_time: DateTime::<Utc>::from(modified),
        });
    }

    if files.is_empty() {
        return NoFilesMatchedSnafu {
            path: base.display().to_string(),
            pattern,
        }
        .fail();
    }

    // Stable sort: ties stay in walk order.
    files.sort_by_key(|file| file.modified_time);

    debug!(count = files.len(), "Discovered source files");

    Ok(files)
}

/// Keep only files modified strictly after the watermark.
///
/// `None` (cold start or replication-key reset) keeps everything.
/// Strict `>` means a file modified in the same instant as the
/// watermark is skipped; the boundary file is never re-emitted at the
/// cost of records written in that same instant.
pub fn filter_modified_after(
    files: Vec<SourceFile>,
    watermark: Option<DateTime<Utc>>,
) -> Vec<SourceFile> {
    match watermark {
        None => files,
        Some(watermark) => files
            .into_iter()
            .filter(|file| file.modified_time > watermark)
            .collect(),
    }
}
