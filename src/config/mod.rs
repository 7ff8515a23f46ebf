//! Configuration for the snowline connector.

mod vars;

use std::path::Path;

use serde::{Deserialize, Serialize};
use snafu::ResultExt;

use crate::error::{ConfigError, ReadFileSnafu, YamlParseSnafu};
use crate::schema::SchemaType;

pub use vars::interpolate;

/// One variable to pull out of each JSON object.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExtractionRule {
    /// Dot/bracket path expression that locates the value.
    pub path: String,
    /// Column name the extracted value is stored under. Uniqueness is
    /// the caller's responsibility; it is not enforced here.
    pub column_name: String,
    /// Advertised schema type for the column. Advisory only; extracted
    /// values are not coerced.
    #[serde(rename = "type")]
    pub value_type: SchemaType,
}

/// Declared compression of the input files.
///
/// Accepted for forward compatibility. Files are currently read as
/// plain text regardless of this setting.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CompressionFormat {
    #[default]
    None,
    Gzip,
}

/// Main configuration for a snowline sync.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Name assigned to the discovered stream, usually the table name.
    pub entity: String,
    /// Base directory to search for input files.
    pub path: String,
    /// Glob pattern, relative to `path`. Recursive wildcards allowed.
    pub search_pattern: String,
    /// Declared compression of the input files. Currently inert.
    #[serde(default)]
    pub compression: CompressionFormat,
    /// Variables to extract from each JSON object.
    #[serde(default)]
    pub variables_to_extract: Vec<ExtractionRule>,
}

impl Config {
    /// Load configuration from a YAML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).context(ReadFileSnafu)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// Environment variables are interpolated before parsing, and the
    /// result is validated.
    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        let interpolated = interpolate(contents)?;

        let config: Config =
            serde_yaml::from_str(&interpolated).context(YamlParseSnafu)?;

        config.validate()?;

        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.entity.is_empty() {
            return Err(ConfigError::EmptyEntity);
        }
        if self.path.is_empty() {
            return Err(ConfigError::EmptyPath);
        }
        if self.search_pattern.is_empty() {
            return Err(ConfigError::EmptySearchPattern);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_config() {
        let yaml = r#"
entity: events
path: /data/in
search_pattern: "*.jsonl"
"#;
        let config = Config::parse(yaml).unwrap();
        assert_eq!(config.entity, "events");
        assert_eq!(config.path, "/data/in");
        assert_eq!(config.search_pattern, "*.jsonl");
        assert_eq!(config.compression, CompressionFormat::None);
        assert!(config.variables_to_extract.is_empty());
    }

    #[test]
    fn test_parse_full_config() {
        let yaml = r#"
entity: events
path: /data/in
search_pattern: "**/*.jsonl"
compression: gzip
variables_to_extract:
  - path: a.b
    column_name: x
    type: IntegerType
  - path: user.name
    column_name: user_name
    type: StringType
"#;
        let config = Config::parse(yaml).unwrap();
        assert_eq!(config.compression, CompressionFormat::Gzip);
        assert_eq!(config.variables_to_extract.len(), 2);
        assert_eq!(config.variables_to_extract[0].column_name, "x");
        assert_eq!(
            config.variables_to_extract[0].value_type,
            SchemaType::Integer
        );
        assert_eq!(config.variables_to_extract[1].path, "user.name");
    }

    #[test]
    fn test_unknown_type_tag_fails_at_parse_time() {
        let yaml = r#"
entity: events
path: /data/in
search_pattern: "*.jsonl"
variables_to_extract:
  - path: a
    column_name: x
    type: DecimalType
"#;
        let err = Config::parse(yaml).unwrap_err();
        assert!(matches!(err, ConfigError::YamlParse { .. }));
    }

    #[test]
    fn test_missing_required_key_fails() {
        let yaml = r#"
entity: events
path: /data/in
"#;
        assert!(Config::parse(yaml).is_err());
    }

    #[test]
    fn test_empty_entity_fails_validation() {
        let yaml = r#"
entity: ""
path: /data/in
search_pattern: "*.jsonl"
"#;
        let err = Config::parse(yaml).unwrap_err();
        assert!(matches!(err, ConfigError::EmptyEntity));
    }

    #[test]
    fn test_env_interpolation_in_config() {
        std::env::set_var("SNOWLINE_TEST_CONFIG_DIR", "/srv/events");
        std::env::remove_var("SNOWLINE_TEST_CONFIG_PATTERN");
        let yaml = r#"
entity: events
path: ${SNOWLINE_TEST_CONFIG_DIR}
search_pattern: "${SNOWLINE_TEST_CONFIG_PATTERN:-*.jsonl}"
"#;
        let config = Config::parse(yaml).unwrap();
        assert_eq!(config.path, "/srv/events");
        assert_eq!(config.search_pattern, "*.jsonl");
    }
}
