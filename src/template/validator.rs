//! Template definition validation.
//!
//! Checks run in a fixed order and stop at the first violation:
//!
//! 1. Required top-level fields are present
//! 2. Every declared variable has a known type and a description
//! 3. Declared defaults match their types
//! 4. Content is non-empty and references exactly the declared inputs
//! 5. Parameters use known keys with in-range values

use indexmap::IndexMap;
use serde_json::Value;

use crate::error::{PromptkitError, Result};

use super::schema::{InputType, OutputType, Parameters, TemplateDefinition, VariableSpec};
use super::token::variable_names;

/// Validate a template definition.
///
/// # Errors
///
/// Returns `TemplateValidation` naming the first offending field.
///
/// # Example
///
/// ```
/// use promptkit::template::{validate, TemplateDefinition};
///
/// let mut template = TemplateDefinition {
///     name: "t".into(),
///     version: "1".into(),
///     description: "d".into(),
///     author: "a".into(),
///     provider: "echo".into(),
///     model: "m".into(),
///     content: "static text".into(),
///     ..Default::default()
/// };
/// assert!(validate(&template).is_ok());
///
/// template.content = "uses {{undeclared}}".into();
/// assert!(validate(&template).is_err());
/// ```
pub fn validate(template: &TemplateDefinition) -> Result<()> {
    validate_required_fields(template)?;
    validate_declarations(&template.input_variables, "input_variables", |t| {
        InputType::parse(t).is_some()
    })?;
    validate_declarations(&template.output_variables, "output_variables", |t| {
        OutputType::parse(t).is_some()
    })?;
    validate_defaults(template)?;
    validate_content(template)?;
    if let Some(params) = &template.parameters {
        validate_parameters(params)?;
    }
    Ok(())
}

fn validate_required_fields(template: &TemplateDefinition) -> Result<()> {
    let fields = [
        ("name", &template.name),
        ("version", &template.version),
        ("description", &template.description),
        ("author", &template.author),
        ("provider", &template.provider),
        ("model", &template.model),
        ("content", &template.content),
    ];

    for (field, value) in fields {
        if value.trim().is_empty() {
            return Err(PromptkitError::validation(field, "required field is missing"));
        }
    }
    Ok(())
}

fn validate_declarations(
    variables: &IndexMap<String, VariableSpec>,
    section: &str,
    known_type: impl Fn(&str) -> bool,
) -> Result<()> {
    for (name, spec) in variables {
        let field = format!("{}.{}", section, name);
        if spec.var_type.is_empty() {
            return Err(PromptkitError::validation(field, "missing type"));
        }
        if !known_type(&spec.var_type) {
            return Err(PromptkitError::validation(
                field,
                format!("unknown type '{}'", spec.var_type),
            ));
        }
        if spec.description.trim().is_empty() {
            return Err(PromptkitError::validation(field, "missing description"));
        }
    }
    Ok(())
}

fn validate_defaults(template: &TemplateDefinition) -> Result<()> {
    for (name, spec) in &template.input_variables {
        let Some(default) = &spec.default else {
            continue;
        };
        let matches = match InputType::parse(&spec.var_type) {
            Some(InputType::String) => default.is_string(),
            Some(InputType::Number) => default.is_number(),
            Some(InputType::Boolean) => default.is_boolean(),
            Some(InputType::Array) => default.is_array(),
            None => false,
        };
        if !matches {
            return Err(default_mismatch("input_variables", name, spec, default));
        }
    }

    for (name, spec) in &template.output_variables {
        let Some(default) = &spec.default else {
            continue;
        };
        let matches = match OutputType::parse(&spec.var_type) {
            Some(OutputType::String) => default.is_string(),
            Some(OutputType::Integer) => is_integer(default),
            Some(OutputType::Float) => default.is_number(),
            Some(OutputType::Boolean) => default.is_boolean(),
            Some(OutputType::Array) => default.is_array(),
            Some(OutputType::Object) => default.is_object(),
            None => false,
        };
        if !matches {
            return Err(default_mismatch("output_variables", name, spec, default));
        }
    }

    Ok(())
}

fn default_mismatch(section: &str, name: &str, spec: &VariableSpec, default: &Value) -> PromptkitError {
    PromptkitError::validation(
        format!("{}.{}.default", section, name),
        format!("{} does not match declared type '{}'", default, spec.var_type),
    )
}

fn is_integer(value: &Value) -> bool {
    value.is_i64()
        || value.is_u64()
        || value
            .as_f64()
            .is_some_and(|f| f.is_finite() && f.fract() == 0.0)
}

fn validate_content(template: &TemplateDefinition) -> Result<()> {
    let content = template.effective_content();
    if content.trim().is_empty() {
        return Err(PromptkitError::validation("content", "content is empty"));
    }

    let referenced = variable_names(content);

    for name in template.input_variables.keys() {
        if !referenced.contains(name) {
            return Err(PromptkitError::validation(
                format!("input_variables.{}", name),
                "declared but never used in content",
            ));
        }
    }

    for name in &referenced {
        if !template.input_variables.contains_key(name) {
            return Err(PromptkitError::validation(
                "content",
                format!("variable '{{{{{}}}}}' is not declared in input_variables", name),
            ));
        }
    }

    Ok(())
}

fn validate_parameters(params: &Parameters) -> Result<()> {
    for (key, value) in params.iter() {
        let field = format!("parameters.{}", key);
        match key.as_str() {
            "temperature" | "top_p" => {
                let in_range = value.as_f64().is_some_and(|v| (0.0..=1.0).contains(&v));
                if !in_range {
                    return Err(PromptkitError::validation(
                        field,
                        format!("{} must be a number between 0 and 1", value),
                    ));
                }
            }
            "max_tokens" | "top_k" => {
                if !value.as_u64().is_some_and(|v| v > 0) {
                    return Err(PromptkitError::validation(
                        field,
                        format!("{} must be a positive integer", value),
                    ));
                }
            }
            _ => {
                return Err(PromptkitError::validation(
                    field,
                    format!(
                        "unknown parameter (expected one of: {})",
                        Parameters::KEYS.join(", ")
                    ),
                ));
            }
        }
    }
    Ok(())
}
