//! Path-based value extraction from JSON values.
//!
//! Extraction paths use dot/bracket navigation: `a.b`, `items[0].id`,
//! `tags[*]`, `payload["odd key"]`. An optional leading `$` (or `$.`)
//! is accepted and ignored. Expressions are compiled once at stream
//! construction; a malformed expression is a configuration error, not
//! a per-record one.
//!
//! A field segment applied to an array descends into each element, so
//! a path can fan out to several matches. One match is the extracted
//! value; zero matches is distinguished from a matched null; more than
//! one match is an error.

use serde_json::Value;

use crate::error::{AmbiguousPathSnafu, ConfigError, ExtractError};

/// One navigation step of a compiled path expression.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    /// `.name` or `["name"]`
    Field(String),
    /// `[3]`
    Index(usize),
    /// `[*]` or `.*`
    Wildcard,
}

/// Result of evaluating a path expression against one JSON value.
///
/// `Missing` ("no value at this path") is kept distinct from
/// `Found(Value::Null)` ("path present, value is null") even though
/// both serialize to null on the emitted record.
#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    Missing,
    Found(Value),
}

impl Extraction {
    /// Collapse into the value stored on the output record. A missing
    /// path is represented as JSON null, same as a matched null.
    pub fn into_value(self) -> Value {
        match self {
            Extraction::Missing => Value::Null,
            Extraction::Found(value) => value,
        }
    }

    /// Whether the path matched nothing.
    pub fn is_missing(&self) -> bool {
        matches!(self, Extraction::Missing)
    }
}

/// A compiled dot/bracket path expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathExpr {
    expr: String,
    segments: Vec<Segment>,
}

impl PathExpr {
    /// Compile a path expression.
    pub fn compile(expr: &str) -> Result<Self, ConfigError> {
        let segments = parse_segments(expr).map_err(|message| {
            ConfigError::InvalidPathExpression {
                expr: expr.to_string(),
                message,
            }
        })?;
        Ok(Self {
            expr: expr.to_string(),
            segments,
        })
    }

    /// Evaluate the expression against a JSON value.
    ///
    /// More than one match fails with [`ExtractError::AmbiguousPath`]
    /// naming the expression and the matched values.
    pub fn extract(&self, value: &Value) -> Result<Extraction, ExtractError> {
        let mut current: Vec<&Value> = vec![value];
        for segment in &self.segments {
            let mut next = Vec::new();
            for candidate in current {
                apply_segment(segment, candidate, &mut next);
            }
            current = next;
        }
        match current.as_slice() {
            [] => Ok(Extraction::Missing),
            [single] => Ok(Extraction::Found((*single).clone())),
            many => AmbiguousPathSnafu {
                expr: self.expr.clone(),
                matches: many.iter().map(|v| (*v).clone()).collect::<Vec<_>>(),
            }
            .fail(),
        }
    }
}

/// Apply one segment to a candidate value, pushing matches onto `out`.
fn apply_segment<'a>(segment: &Segment, value: &'a Value, out: &mut Vec<&'a Value>) {
    match segment {
        Segment::Field(name) => match value {
            Value::Object(map) => {
                if let Some(child) = map.get(name) {
                    out.push(child);
                }
            }
            // Field access on an array descends into each element.
            Value::Array(items) => {
                for item in items {
                    if let Value::Object(map) = item {
                        if let Some(child) = map.get(name) {
                            out.push(child);
                        }
                    }
                }
            }
            _ => {}
        },
        Segment::Index(index) => {
            if let Value::Array(items) = value {
                if let Some(child) = items.get(*index) {
                    out.push(child);
                }
            }
        }
        Segment::Wildcard => match value {
            Value::Array(items) => out.extend(items.iter()),
            Value::Object(map) => out.extend(map.values()),
            _ => {}
        },
    }
}

/// Parse a dot/bracket expression into segments.
fn parse_segments(expr: &str) -> Result<Vec<Segment>, String> {
    let mut rest = expr.strip_prefix('$').unwrap_or(expr);
    rest = rest.strip_prefix('.').unwrap_or(rest);
    if rest.is_empty() {
        return Err("expression is empty".to_string());
    }

    let mut segments = Vec::new();
    let mut chars = rest.char_indices().peekable();
    let mut field_start: Option<usize> = None;

    let flush = |start: Option<usize>, end: usize, segments: &mut Vec<Segment>| {
        if let Some(start) = start {
            let name = &rest[start..end];
            if name == "*" {
                segments.push(Segment::Wildcard);
            } else {
                segments.push(Segment::Field(name.to_string()));
            }
        }
    };

    while let Some((pos, ch)) = chars.next() {
        match ch {
            '.' => {
                if field_start.is_none() && segments.is_empty() {
                    return Err(format!("unexpected '.' at position {pos}"));
                }
                if field_start.is_none() && rest[..pos].ends_with('.') {
                    return Err(format!("empty segment at position {pos}"));
                }
                flush(field_start.take(), pos, &mut segments);
            }
            '[' => {
                flush(field_start.take(), pos, &mut segments);
                let mut inner = String::new();
                let mut closed = false;
                for (_, c) in chars.by_ref() {
                    if c == ']' {
                        closed = true;
                        break;
                    }
                    inner.push(c);
                }
                if !closed {
                    return Err("unclosed '[' segment".to_string());
                }
                segments.push(parse_bracket(&inner)?);
                // A ']' must be followed by '.', another '[', or the end.
                match chars.peek() {
                    Some((_, '.')) => {
                        chars.next();
                    }
                    Some((_, '[')) | None => {}
                    Some((next_pos, c)) => {
                        return Err(format!("unexpected {c:?} at position {next_pos}"));
                    }
                }
            }
            ']' => return Err(format!("unmatched ']' at position {pos}")),
            _ => {
                if field_start.is_none() {
                    field_start = Some(pos);
                }
            }
        }
    }
    if rest.ends_with('.') {
        return Err("trailing '.' in expression".to_string());
    }
    flush(field_start.take(), rest.len(), &mut segments);

    if segments.is_empty() {
        return Err("expression has no segments".to_string());
    }
    Ok(segments)
}

/// Parse the inside of a bracket segment: an index, `*`, or a quoted
/// field name.
fn parse_bracket(inner: &str) -> Result<Segment, String> {
    let inner = inner.trim();
    if inner == "*" {
        return Ok(Segment::Wildcard);
    }
    if (inner.starts_with('"') && inner.ends_with('"') && inner.len() >= 2)
        || (inner.starts_with('\'') && inner.ends_with('\'') && inner.len() >= 2)
    {
        return Ok(Segment::Field(inner[1..inner.len() - 1].to_string()));
    }
    inner
        .parse::<usize>()
        .map(Segment::Index)
        .map_err(|_| format!("invalid bracket segment [{inner}]"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn extract(expr: &str, value: &Value) -> Result<Extraction, ExtractError> {
        PathExpr::compile(expr).unwrap().extract(value)
    }

    #[test]
    fn test_simple_field() {
        let value = json!({"a": {"b": 5}});
        assert_eq!(extract("a.b", &value).unwrap(), Extraction::Found(json!(5)));
    }

    #[test]
    fn test_leading_dollar_is_accepted() {
        let value = json!({"a": {"b": "x"}});
        assert_eq!(
            extract("$.a.b", &value).unwrap(),
            Extraction::Found(json!("x"))
        );
    }

    #[test]
    fn test_missing_path() {
        let value = json!({"a": {}});
        assert!(extract("a.b", &value).unwrap().is_missing());
    }

    #[test]
    fn test_null_is_found_not_missing() {
        let value = json!({"a": {"b": null}});
        let extraction = extract("a.b", &value).unwrap();
        assert_eq!(extraction, Extraction::Found(Value::Null));
        assert!(!extraction.is_missing());
        assert_eq!(extraction.into_value(), Value::Null);
    }

    #[test]
    fn test_missing_collapses_to_null_value() {
        let value = json!({"a": {}});
        assert_eq!(extract("a.b", &value).unwrap().into_value(), Value::Null);
    }

    #[test]
    fn test_field_descends_into_array_elements() {
        let value = json!({"a": [{"b": 1}]});
        assert_eq!(extract("a.b", &value).unwrap(), Extraction::Found(json!(1)));
    }

    #[test]
    fn test_ambiguous_path_is_an_error() {
        let value = json!({"a": [{"b": 1}, {"b": 2}]});
        let err = extract("a.b", &value).unwrap_err();
        let ExtractError::AmbiguousPath { expr, matches } = err;
        assert_eq!(expr, "a.b");
        assert_eq!(matches, vec![json!(1), json!(2)]);
    }

    #[test]
    fn test_index_segment() {
        let value = json!({"items": [10, 20, 30]});
        assert_eq!(
            extract("items[1]", &value).unwrap(),
            Extraction::Found(json!(20))
        );
        assert!(extract("items[9]", &value).unwrap().is_missing());
    }

    #[test]
    fn test_index_then_field() {
        let value = json!({"items": [{"id": "a"}, {"id": "b"}]});
        assert_eq!(
            extract("items[0].id", &value).unwrap(),
            Extraction::Found(json!("a"))
        );
    }

    #[test]
    fn test_quoted_bracket_field() {
        let value = json!({"odd key": {"x": true}});
        assert_eq!(
            extract("[\"odd key\"].x", &value).unwrap(),
            Extraction::Found(json!(true))
        );
    }

    #[test]
    fn test_wildcard_single_element() {
        let value = json!({"tags": ["only"]});
        assert_eq!(
            extract("tags[*]", &value).unwrap(),
            Extraction::Found(json!("only"))
        );
    }

    #[test]
    fn test_wildcard_multiple_elements_is_ambiguous() {
        let value = json!({"tags": ["a", "b"]});
        assert!(extract("tags[*]", &value).is_err());
    }

    #[test]
    fn test_extraction_on_scalar_root_is_missing() {
        let value = json!(42);
        assert!(extract("a.b", &value).unwrap().is_missing());
    }

    #[test]
    fn test_compile_rejects_empty_expression() {
        assert!(PathExpr::compile("").is_err());
        assert!(PathExpr::compile("$").is_err());
    }

    #[test]
    fn test_compile_rejects_unclosed_bracket() {
        assert!(PathExpr::compile("a[0").is_err());
    }

    #[test]
    fn test_compile_rejects_bad_bracket_contents() {
        assert!(PathExpr::compile("a[x]").is_err());
    }

    #[test]
    fn test_compile_rejects_trailing_dot() {
        assert!(PathExpr::compile("a.").is_err());
        assert!(PathExpr::compile("a[0].").is_err());
    }

    #[test]
    fn test_compile_rejects_text_after_bracket() {
        assert!(PathExpr::compile("a[0]b").is_err());
        assert!(PathExpr::compile("a[0]b.c").is_err());
    }

    #[test]
    fn test_chained_brackets_still_compile() {
        let value = json!({"grid": [[1], [2]]});
        assert_eq!(
            extract("grid[1][0]", &value).unwrap(),
            Extraction::Found(json!(2))
        );
    }
}
