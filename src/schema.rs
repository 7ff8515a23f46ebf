//! Record schema derivation.
//!
//! The schema of an emitted record is assembled once per stream
//! activation from the configured extraction rules. Field order is
//! fixed: `source_file`, `serial_number`, the configured columns in
//! configuration order, `json_object`, `_modified_time`.
//!
//! Column types are advisory metadata for the downstream consumer.
//! Extracted values are never validated or coerced against them.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::config::ExtractionRule;

/// Type tags for extracted columns.
///
/// The configured names mirror the descriptor vocabulary the downstream
/// framework expects (`StringType`, `IntegerType`, ...). An unknown name
/// fails configuration parsing; there is no late lookup.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SchemaType {
    #[serde(rename = "StringType")]
    String,
    #[serde(rename = "IntegerType")]
    Integer,
    #[serde(rename = "NumberType")]
    Number,
    #[serde(rename = "BooleanType")]
    Boolean,
    #[serde(rename = "ObjectType")]
    Object,
    #[serde(rename = "ArrayType")]
    Array,
    #[serde(rename = "DateTimeType")]
    DateTime,
}

impl SchemaType {
    /// JSON-schema fragment describing this type.
    ///
    /// Extracted columns are always nullable: a path that matches
    /// nothing is emitted as null.
    pub fn descriptor(self) -> Value {
        match self {
            SchemaType::String => json!({"type": ["string", "null"]}),
            SchemaType::Integer => json!({"type": ["integer", "null"]}),
            SchemaType::Number => json!({"type": ["number", "null"]}),
            SchemaType::Boolean => json!({"type": ["boolean", "null"]}),
            SchemaType::Object => {
                json!({"type": ["object", "null"], "additionalProperties": true})
            }
            SchemaType::Array => json!({"type": ["array", "null"]}),
            SchemaType::DateTime => {
                json!({"type": ["string", "null"], "format": "date-time"})
            }
        }
    }
}

/// A single field in the derived schema.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSchema {
    /// JSON-schema fragment for the field.
    pub descriptor: Value,
    /// Human-readable description, carried into catalog output.
    pub description: String,
}

/// Insertion-ordered schema of an emitted record.
///
/// Derived once at stream construction and held immutably for the rest
/// of the run.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordSchema {
    fields: IndexMap<String, FieldSchema>,
}

impl RecordSchema {
    /// Derive the record schema from the configured extraction rules.
    ///
    /// Column name uniqueness is the caller's responsibility; a rule
    /// reusing a fixed field name would shadow it here the same way it
    /// would in the emitted record.
    pub fn derive(rules: &[ExtractionRule]) -> Self {
        let mut fields = IndexMap::new();
        fields.insert(
            "source_file".to_string(),
            FieldSchema {
                descriptor: json!({"type": "string"}),
                description: "The source file.".to_string(),
            },
        );
        fields.insert(
            "serial_number".to_string(),
            FieldSchema {
                descriptor: json!({"type": "integer"}),
                description: "nth row from the source file.".to_string(),
            },
        );
        for rule in rules {
            fields.insert(
                rule.column_name.clone(),
                FieldSchema {
                    descriptor: rule.value_type.descriptor(),
                    description: format!("Extracted value from path: {}", rule.path),
                },
            );
        }
        fields.insert(
            "json_object".to_string(),
            FieldSchema {
                descriptor: json!({"type": "object", "additionalProperties": true}),
                description: "The full JSON object.".to_string(),
            },
        );
        fields.insert(
            "_modified_time".to_string(),
            FieldSchema {
                descriptor: json!({"type": "string", "format": "date-time"}),
                description: "The modification date of the source file.".to_string(),
            },
        );
        Self { fields }
    }

    /// Field names in schema order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the schema has no fields. Never true for a derived
    /// schema, which always carries the four fixed fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.get(name)
    }

    /// Render as a JSON-schema object for catalog output.
    pub fn to_json(&self) -> Value {
        let mut properties = serde_json::Map::new();
        for (name, field) in &self.fields {
            let mut descriptor = field.descriptor.clone();
            if let Value::Object(obj) = &mut descriptor {
                obj.insert("description".to_string(), json!(field.description));
            }
            properties.insert(name.clone(), descriptor);
        }
        json!({"type": "object", "properties": properties})
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(column_name: &str, path: &str, value_type: SchemaType) -> ExtractionRule {
        ExtractionRule {
            path: path.to_string(),
            column_name: column_name.to_string(),
            value_type,
        }
    }

    #[test]
    fn test_field_order_without_rules() {
        let schema = RecordSchema::derive(&[]);
        let names: Vec<_> = schema.field_names().collect();
        assert_eq!(
            names,
            vec!["source_file", "serial_number", "json_object", "_modified_time"]
        );
    }

    #[test]
    fn test_field_order_with_rules() {
        let rules = vec![
            rule("x", "a", SchemaType::Integer),
            rule("y", "b.c", SchemaType::String),
        ];
        let schema = RecordSchema::derive(&rules);
        let names: Vec<_> = schema.field_names().collect();
        assert_eq!(
            names,
            vec![
                "source_file",
                "serial_number",
                "x",
                "y",
                "json_object",
                "_modified_time"
            ]
        );
    }

    #[test]
    fn test_column_descriptor_and_description() {
        let schema = RecordSchema::derive(&[rule("count", "stats.count", SchemaType::Integer)]);
        let field = schema.field("count").unwrap();
        assert_eq!(field.descriptor, json!({"type": ["integer", "null"]}));
        assert_eq!(field.description, "Extracted value from path: stats.count");
    }

    #[test]
    fn test_to_json_carries_descriptions() {
        let schema = RecordSchema::derive(&[]);
        let rendered = schema.to_json();
        assert_eq!(rendered["type"], "object");
        assert_eq!(
            rendered["properties"]["source_file"]["description"],
            "The source file."
        );
        assert_eq!(
            rendered["properties"]["_modified_time"]["format"],
            "date-time"
        );
    }

    #[test]
    fn test_schema_type_parses_configured_names() {
        let parsed: SchemaType = serde_yaml::from_str("IntegerType").unwrap();
        assert_eq!(parsed, SchemaType::Integer);

        let unknown: Result<SchemaType, _> = serde_yaml::from_str("FloatType");
        assert!(unknown.is_err());
    }

    #[test]
    fn test_datetime_descriptor() {
        assert_eq!(
            SchemaType::DateTime.descriptor(),
            json!({"type": ["string", "null"], "format": "date-time"})
        );
    }
}
