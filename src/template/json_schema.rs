//! JSON Schema generation for template files.
//!
//! Generates a JSON Schema (Draft-07) describing `<name>.yaml` template
//! definitions, for editor autocomplete and external validation.

use serde_json::{json, Value};

use super::schema::{InputType, Parameters};

/// Generates JSON Schema for template definitions.
#[derive(Debug, Default)]
pub struct SchemaGenerator;

impl SchemaGenerator {
    /// Create a new schema generator.
    pub fn new() -> Self {
        Self
    }

    /// Generate the complete JSON Schema for a template file.
    pub fn generate(&self) -> Value {
        json!({
            "$schema": "http://json-schema.org/draft-07/schema#",
            "title": "promptkit template",
            "description": "A named, versioned prompt definition with typed variables",
            "type": "object",
            "required": ["name", "version", "description", "author", "provider", "model", "content"],
            "properties": {
                "name": { "type": "string", "description": "Unique name; matches the file stem" },
                "version": { "type": ["string", "number"] },
                "description": { "type": "string" },
                "author": { "type": "string" },
                "provider": { "type": "string", "description": "Backend provider" },
                "model": { "type": "string" },
                "content": {
                    "type": "string",
                    "description": "Prompt text with {{variable}} and {{file: path}} tokens"
                },
                "input_variables": self.variables_schema(&InputType::NAMES),
                "output_variables": self.variables_schema(
                    &["string", "integer", "float", "boolean", "array", "object"]
                ),
                "parameters": self.parameters_schema()
            },
            "additionalProperties": false
        })
    }

    fn variables_schema(&self, types: &[&str]) -> Value {
        json!({
            "type": "object",
            "additionalProperties": {
                "type": "object",
                "required": ["type", "description"],
                "properties": {
                    "type": { "type": "string", "enum": types },
                    "description": { "type": "string", "minLength": 1 },
                    "default": {}
                },
                "additionalProperties": false
            }
        })
    }

    fn parameters_schema(&self) -> Value {
        let mut properties = serde_json::Map::new();
        for key in Parameters::KEYS {
            let schema = match key {
                "temperature" | "top_p" => json!({ "type": "number", "minimum": 0, "maximum": 1 }),
                _ => json!({ "type": "integer", "minimum": 1 }),
            };
            properties.insert(key.to_string(), schema);
        }

        json!({
            "type": "object",
            "properties": properties,
            "additionalProperties": false
        })
    }
}
