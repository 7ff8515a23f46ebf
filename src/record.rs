//! Record construction from raw JSON lines.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde_json::{Value, json};
use snafu::ResultExt;

use crate::config::ExtractionRule;
use crate::error::{ConfigError, JsonParseSnafu, SyncError};
use crate::extract::{Extraction, PathExpr};

/// An extraction rule with its path expression compiled.
#[derive(Debug, Clone)]
pub struct CompiledRule {
    pub column_name: String,
    pub expr: PathExpr,
}

/// One emitted record: the parsed JSON line plus provenance fields and
/// any configured extracted columns.
///
/// `(source_file, serial_number)` is the natural key; `_modified_time`
/// is the replication key.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Origin file identifier.
    pub source_file: String,
    /// Zero-based position of the line within its source file.
    pub serial_number: usize,
    /// The fully parsed JSON value from the line.
    pub json_object: Value,
    /// Modification time of the source file at read time.
    pub modified_time: DateTime<Utc>,
    /// Extracted columns, in configuration order.
    pub columns: IndexMap<String, Extraction>,
}

impl Record {
    /// Render the record as a flat JSON object in schema field order:
    /// `source_file`, `serial_number`, extracted columns, `json_object`,
    /// `_modified_time`. Missing extractions render as null.
    pub fn to_json(&self) -> Value {
        let mut map = serde_json::Map::new();
        map.insert("source_file".to_string(), json!(self.source_file));
        map.insert("serial_number".to_string(), json!(self.serial_number));
        for (name, extraction) in &self.columns {
            map.insert(name.clone(), extraction.clone().into_value());
        }
        map.insert("json_object".to_string(), self.json_object.clone());
        map.insert(
            "_modified_time".to_string(),
            json!(self.modified_time.to_rfc3339()),
        );
        Value::Object(map)
    }
}

/// Builds records for one stream by parsing each line and applying the
/// compiled extraction rules.
#[derive(Debug)]
pub struct RecordBuilder {
    rules: Vec<CompiledRule>,
}

impl RecordBuilder {
    /// Create a builder with the given compiled rules.
    pub fn new(rules: Vec<CompiledRule>) -> Self {
        Self { rules }
    }

    /// Compile the configured extraction rules into a builder.
    ///
    /// Pure function of configuration, no I/O; an invalid path
    /// expression is a configuration error.
    pub fn from_config(rules: &[ExtractionRule]) -> Result<Self, ConfigError> {
        let compiled = rules
            .iter()
            .map(|rule| {
                Ok(CompiledRule {
                    column_name: rule.column_name.clone(),
                    expr: PathExpr::compile(&rule.path)?,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;
        Ok(Self::new(compiled))
    }

    /// Parse one raw line into a record.
    ///
    /// A malformed line is fatal; the error names the source file and
    /// the 1-based line number. Ambiguous extractions propagate
    /// unchanged.
    pub fn build(
        &self,
        line: &str,
        source_file: &str,
        serial_number: usize,
        modified_time: DateTime<Utc>,
    ) -> Result<Record, SyncError> {
        let json_object: Value = serde_json::from_str(line).context(JsonParseSnafu {
            path: source_file,
            line: serial_number + 1,
        })?;

        let mut columns = IndexMap::with_capacity(self.rules.len());
        for rule in &self.rules {
            let extraction = rule.expr.extract(&json_object)?;
            columns.insert(rule.column_name.clone(), extraction);
        }

        Ok(Record {
            source_file: source_file.to_string(),
            serial_number,
            json_object,
            modified_time,
            columns,
        })
    }
}
