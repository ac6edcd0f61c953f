//! JSON construction and path evaluation.

use serde_json::{Map, Value};

use crate::builder::value::SqlValue;
use crate::error::JsonError;

/// Builds JSON documents and reads values out of them.
pub trait JsonProvider: Send + Sync {
    /// Serialises key/value pairs into a JSON object, keeping their order.
    ///
    /// # Errors
    ///
    /// Fails when a value cannot be represented.
    fn construct_json_object(&self, entries: &[(String, SqlValue)]) -> Result<String, JsonError>;

    /// Evaluates a `$.key[0].other` path, returning `None` when nothing is
    /// there.
    ///
    /// # Errors
    ///
    /// Fails on malformed JSON or a malformed path.
    fn evaluate_json_path(&self, json: &str, path: &str) -> Result<Option<String>, JsonError>;
}

/// [`JsonProvider`] backed by `serde_json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SerdeJsonProvider;

impl SerdeJsonProvider {
    /// Creates a new provider.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

fn to_json(value: &SqlValue) -> Value {
    match value {
        SqlValue::Null => Value::Null,
        SqlValue::Bool(b) => Value::Bool(*b),
        SqlValue::Int(n) => Value::from(*n),
        SqlValue::Float(f) => Value::from(*f),
        SqlValue::Text(s) => Value::String(s.clone()),
        SqlValue::Blob(bytes) => {
            Value::String(bytes.iter().map(|b| format!("{b:02x}")).collect())
        }
        SqlValue::Timestamp(ts) => Value::String(ts.to_rfc3339()),
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Segment {
    Key(String),
    Index(usize),
}

fn parse_path(path: &str) -> Result<Vec<Segment>, JsonError> {
    let invalid = |message: &str| JsonError::InvalidPath {
        path: path.to_string(),
        message: message.to_string(),
    };
    let rest = path
        .strip_prefix('$')
        .ok_or_else(|| invalid("must start with `$`"))?;

    let mut segments = Vec::new();
    let mut chars = rest.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '.' => {
                let mut key = String::new();
                while let Some(&next) = chars.peek() {
                    if next == '.' || next == '[' {
                        break;
                    }
                    key.push(next);
                    chars.next();
                }
                if key.is_empty() {
                    return Err(invalid("empty key"));
                }
                segments.push(Segment::Key(key));
            }
            '[' => {
                let mut digits = String::new();
                loop {
                    match chars.next() {
                        Some(']') => break,
                        Some(d) => digits.push(d),
                        None => return Err(invalid("unclosed `[`")),
                    }
                }
                let index = digits
                    .trim()
                    .parse()
                    .map_err(|_| invalid("array index must be a non-negative integer"))?;
                segments.push(Segment::Index(index));
            }
            _ => return Err(invalid("expected `.` or `[`")),
        }
    }
    Ok(segments)
}

impl JsonProvider for SerdeJsonProvider {
    fn construct_json_object(&self, entries: &[(String, SqlValue)]) -> Result<String, JsonError> {
        let object: Map<String, Value> = entries
            .iter()
            .map(|(key, value)| (key.clone(), to_json(value)))
            .collect();
        Ok(serde_json::to_string(&Value::Object(object))?)
    }

    fn evaluate_json_path(&self, json: &str, path: &str) -> Result<Option<String>, JsonError> {
        let segments = parse_path(path)?;
        let document: Value = serde_json::from_str(json)?;

        let mut current = &document;
        for segment in &segments {
            let next = match segment {
                Segment::Key(key) => current.get(key.as_str()),
                Segment::Index(index) => current.get(*index),
            };
            match next {
                Some(value) => current = value,
                None => return Ok(None),
            }
        }

        match current {
            Value::Null => Ok(None),
            Value::String(s) => Ok(Some(s.clone())),
            Value::Bool(_) | Value::Number(_) => Ok(Some(current.to_string())),
            Value::Array(_) | Value::Object(_) => Ok(Some(serde_json::to_string(current)?)),
        }
    }
}
