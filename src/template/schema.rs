//! Template definition schema.
//!
//! This module contains the struct definitions that map to a template
//! file (`<name>.yaml`) in the template directory.
//!
//! Deserialization is deliberately lenient: every top-level field is
//! optional and variable types are kept as raw strings, so a malformed
//! template still loads and [`crate::template::validate`] can report the
//! exact field at fault.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A named, versioned prompt definition.
///
/// # Example
///
/// ```
/// use promptkit::template::TemplateDefinition;
///
/// let yaml = r#"
/// name: greet
/// version: "1.0"
/// description: Say hello
/// author: me
/// provider: echo
/// model: none
/// content: "Hello, {{who}}!"
/// input_variables:
///   who:
///     type: string
///     description: Who to greet
/// "#;
///
/// let template: TemplateDefinition = serde_yaml::from_str(yaml).unwrap();
/// assert_eq!(template.name, "greet");
/// assert!(template.input_variables.contains_key("who"));
/// assert!(template.resolved_content.is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateDefinition {
    /// Unique key; matches the file stem in the template directory.
    #[serde(deserialize_with = "scalar_string")]
    pub name: String,

    #[serde(deserialize_with = "scalar_string")]
    pub version: String,

    #[serde(deserialize_with = "scalar_string")]
    pub description: String,

    #[serde(deserialize_with = "scalar_string")]
    pub author: String,

    /// Backend provider the template was written for.
    #[serde(deserialize_with = "scalar_string")]
    pub provider: String,

    #[serde(deserialize_with = "scalar_string")]
    pub model: String,

    /// Raw template text with `{{variable}}` and `{{file: path}}` tokens.
    #[serde(deserialize_with = "scalar_string")]
    pub content: String,

    /// Inclusion-expanded content. Computed on load, never persisted.
    #[serde(skip)]
    pub resolved_content: Option<String>,

    /// Declared inputs, in declaration order.
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub input_variables: IndexMap<String, VariableSpec>,

    /// Declared outputs, in declaration order.
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub output_variables: IndexMap<String, VariableSpec>,

    /// Generation parameters overriding the configured defaults.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Parameters>,
}

impl TemplateDefinition {
    /// The text variables are substituted into: resolved content when
    /// inclusion has run, raw content otherwise.
    pub fn effective_content(&self) -> &str {
        self.resolved_content.as_deref().unwrap_or(&self.content)
    }
}

/// Declaration of a single input or output variable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VariableSpec {
    /// Declared type name; checked by the validator.
    #[serde(rename = "type", deserialize_with = "scalar_string")]
    pub var_type: String,

    #[serde(deserialize_with = "scalar_string")]
    pub description: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl VariableSpec {
    /// Create a spec with the given type and description.
    pub fn new(var_type: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            var_type: var_type.into(),
            description: description.into(),
            default: None,
        }
    }

    /// Set a default value.
    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    /// The default rendered as raw input text, suitable for casting.
    ///
    /// Strings are returned as-is; anything else as JSON.
    pub fn default_as_raw(&self) -> Option<String> {
        self.default.as_ref().map(|value| match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }
}

/// Types accepted for input variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputType {
    String,
    Number,
    Boolean,
    Array,
}

impl InputType {
    /// All input type names, for help text and prompts.
    pub const NAMES: [&'static str; 4] = ["string", "number", "boolean", "array"];

    /// Parse a declared type name.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "string" => Some(Self::String),
            "number" => Some(Self::Number),
            "boolean" => Some(Self::Boolean),
            "array" => Some(Self::Array),
            _ => None,
        }
    }

    /// The declared name of this type.
    pub fn name(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Array => "array",
        }
    }
}

/// Types accepted for output variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputType {
    String,
    Integer,
    Float,
    Boolean,
    Array,
    Object,
}

impl OutputType {
    /// Parse a declared type name.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "string" => Some(Self::String),
            "integer" => Some(Self::Integer),
            "float" => Some(Self::Float),
            "boolean" => Some(Self::Boolean),
            "array" => Some(Self::Array),
            "object" => Some(Self::Object),
            _ => None,
        }
    }
}

/// Generation parameters declared by a template.
///
/// Kept as a raw map so unknown keys survive loading and are reported by
/// the validator rather than the YAML parser.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Parameters(pub IndexMap<String, Value>);

impl Parameters {
    /// Recognized parameter keys.
    pub const KEYS: [&'static str; 4] = ["max_tokens", "temperature", "top_p", "top_k"];

    pub fn max_tokens(&self) -> Option<u64> {
        self.0.get("max_tokens").and_then(Value::as_u64)
    }

    pub fn temperature(&self) -> Option<f64> {
        self.0.get("temperature").and_then(Value::as_f64)
    }

    pub fn top_p(&self) -> Option<f64> {
        self.0.get("top_p").and_then(Value::as_f64)
    }

    pub fn top_k(&self) -> Option<u64> {
        self.0.get("top_k").and_then(Value::as_u64)
    }

    /// Iterate over all declared parameters.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }
}

/// Partial update applied by [`crate::template::TemplateStore::update_template`].
///
/// Only fields that are `Some` replace the stored values.
#[derive(Debug, Clone, Default)]
pub struct TemplatePatch {
    pub version: Option<String>,
    pub description: Option<String>,
    pub author: Option<String>,
    pub provider: Option<String>,
    pub model: Option<String>,
    pub content: Option<String>,
    pub input_variables: Option<IndexMap<String, VariableSpec>>,
    pub output_variables: Option<IndexMap<String, VariableSpec>>,
    pub parameters: Option<Parameters>,
}

impl TemplatePatch {
    /// Check whether the patch changes anything.
    pub fn is_empty(&self) -> bool {
        self.version.is_none()
            && self.description.is_none()
            && self.author.is_none()
            && self.provider.is_none()
            && self.model.is_none()
            && self.content.is_none()
            && self.input_variables.is_none()
            && self.output_variables.is_none()
            && self.parameters.is_none()
    }

    /// Merge the patch over an existing definition.
    pub fn apply(self, template: &mut TemplateDefinition) {
        if let Some(v) = self.version {
            template.version = v;
        }
        if let Some(v) = self.description {
            template.description = v;
        }
        if let Some(v) = self.author {
            template.author = v;
        }
        if let Some(v) = self.provider {
            template.provider = v;
        }
        if let Some(v) = self.model {
            template.model = v;
        }
        if let Some(v) = self.content {
            template.content = v;
            template.resolved_content = None;
        }
        if let Some(v) = self.input_variables {
            template.input_variables = v;
        }
        if let Some(v) = self.output_variables {
            template.output_variables = v;
        }
        if let Some(v) = self.parameters {
            template.parameters = Some(v);
        }
    }
}

/// Accept any YAML scalar (`version: 1.0`, `author: 42`) as a string.
fn scalar_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_yaml::Value>::deserialize(deserializer)?;
    match value {
        None | Some(serde_yaml::Value::Null) => Ok(String::new()),
        Some(serde_yaml::Value::String(s)) => Ok(s),
        Some(serde_yaml::Value::Number(n)) => Ok(n.to_string()),
        Some(serde_yaml::Value::Bool(b)) => Ok(b.to_string()),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected a scalar value, found {:?}",
            other
        ))),
    }
}
