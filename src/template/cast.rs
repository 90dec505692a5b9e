//! Variable casting.
//!
//! Raw variable input (from `-v key=value`, prompts, or declared
//! defaults) is always text. Casting converts it to the type declared in
//! `input_variables`, rejecting mismatches rather than coercing them.
//!
//! | Declared type | Behavior |
//! |---------------|----------|
//! | `string`      | passthrough |
//! | `number`      | parsed as a float; unparseable or NaN is rejected |
//! | `boolean`     | `true`/`false`, case-insensitive; anything else is rejected |
//! | `array`       | JSON array if it parses as one, else comma-split and trimmed |

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use std::fmt;

use crate::error::{PromptkitError, Result};

use super::schema::InputType;

/// Resolved variable values, keyed by name.
pub type VariableMap = IndexMap<String, VariableValue>;

/// A typed variable value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum VariableValue {
    String(String),
    Number(f64),
    Boolean(bool),
    Array(Vec<Value>),
}

impl VariableValue {
    /// Check whether this value satisfies a declared input type.
    pub fn matches(&self, input_type: InputType) -> bool {
        matches!(
            (self, input_type),
            (Self::String(_), InputType::String)
                | (Self::Number(_), InputType::Number)
                | (Self::Boolean(_), InputType::Boolean)
                | (Self::Array(_), InputType::Array)
        )
    }

    /// Name of this value's type, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Number(_) => "number",
            Self::Boolean(_) => "boolean",
            Self::Array(_) => "array",
        }
    }
}

/// Renders the value as substituted into template content.
///
/// Array items are joined with newlines; string items render bare,
/// other items as JSON.
impl fmt::Display for VariableValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => write!(f, "{}", s),
            Self::Number(n) => write!(f, "{}", n),
            Self::Boolean(b) => write!(f, "{}", b),
            Self::Array(items) => {
                let lines: Vec<String> = items
                    .iter()
                    .map(|item| match item {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect();
                write!(f, "{}", lines.join("\n"))
            }
        }
    }
}

/// Cast a raw value to the declared type name.
///
/// # Errors
///
/// Returns `InputValidation` naming `key` and `raw` when the value does
/// not match, or when `declared_type` is not an input type.
///
/// # Example
///
/// ```
/// use promptkit::template::{cast_value, VariableValue};
///
/// assert_eq!(cast_value("n", "42", "number").unwrap(), VariableValue::Number(42.0));
/// assert!(cast_value("n", "abc", "number").is_err());
/// ```
pub fn cast_value(key: &str, raw: &str, declared_type: &str) -> Result<VariableValue> {
    let input_type = InputType::parse(declared_type).ok_or_else(|| invalid(
        key,
        raw,
        format!("unknown declared type '{}'", declared_type),
    ))?;
    cast_as(key, raw, input_type)
}

/// Cast a raw value to a parsed input type.
pub fn cast_as(key: &str, raw: &str, input_type: InputType) -> Result<VariableValue> {
    match input_type {
        InputType::String => Ok(VariableValue::String(raw.to_string())),
        InputType::Number => {
            let parsed: f64 = raw
                .trim()
                .parse()
                .map_err(|_| invalid(key, raw, "expected a number"))?;
            if parsed.is_nan() {
                return Err(invalid(key, raw, "expected a number"));
            }
            Ok(VariableValue::Number(parsed))
        }
        InputType::Boolean => match raw.trim().to_lowercase().as_str() {
            "true" => Ok(VariableValue::Boolean(true)),
            "false" => Ok(VariableValue::Boolean(false)),
            _ => Err(invalid(key, raw, "expected 'true' or 'false'")),
        },
        InputType::Array => match serde_json::from_str::<Value>(raw) {
            Ok(Value::Array(items)) => Ok(VariableValue::Array(items)),
            _ => Ok(VariableValue::Array(
                raw.split(',')
                    .map(|item| Value::String(item.trim().to_string()))
                    .collect(),
            )),
        },
    }
}

fn invalid(key: &str, raw: &str, message: impl Into<String>) -> PromptkitError {
    PromptkitError::InputValidation {
        key: key.to_string(),
        value: raw.to_string(),
        message: message.into(),
    }
}
