//! Template execution.
//!
//! A run goes through [`TemplateExecutor::execute`]:
//!
//! 1. Missing declared inputs are asked of a [`VariableResolver`]
//! 2. Every declared input is checked against its type
//! 3. Values are substituted into the content
//! 4. One user message is sent to the backend, streamed or whole
//!
//! # Example
//!
//! ```
//! use promptkit::backend::{EchoBackend, GenerationOptions};
//! use promptkit::config::EffectiveConfig;
//! use promptkit::executor::{ExecutionContext, FixedResolver, TemplateExecutor};
//! use promptkit::template::{TemplateDefinition, VariableSpec};
//!
//! let mut template = TemplateDefinition {
//!     name: "greet".into(),
//!     content: "Hello, {{name}}!".into(),
//!     ..Default::default()
//! };
//! template
//!     .input_variables
//!     .insert("name".into(), VariableSpec::new("string", "Who to greet"));
//!
//! let options = GenerationOptions::from_config(&EffectiveConfig::with_home(None));
//! let context = ExecutionContext::new(template, Box::new(EchoBackend::new()), options);
//!
//! let mut resolver = FixedResolver::new().with_answer("name", "Ada");
//! let mut sink = Vec::new();
//! let text = TemplateExecutor::new(&mut resolver)
//!     .execute(context, &mut sink)
//!     .unwrap();
//!
//! assert_eq!(text, "Hello, Ada!");
//! ```

pub mod context;
pub mod substitute;
pub mod variables;

use std::io::Write;

use crate::backend::Message;
use crate::error::{PromptkitError, Result};
use crate::template::{cast_value, InputType, TemplateDefinition, VariableMap};

pub use context::ExecutionContext;
pub use substitute::substitute;
pub use variables::{FixedResolver, PromptingResolver, VariableResolver};

/// Runs templates against their backend.
pub struct TemplateExecutor<'a> {
    resolver: &'a mut dyn VariableResolver,
}

impl<'a> TemplateExecutor<'a> {
    pub fn new(resolver: &'a mut dyn VariableResolver) -> Self {
        Self { resolver }
    }

    /// Execute one template and return the generated text.
    ///
    /// When the context asks for streaming, each fragment is written and
    /// flushed to `sink` as it arrives; otherwise nothing is written.
    ///
    /// # Errors
    ///
    /// `InputValidation` for missing or mistyped variables; backend errors
    /// are returned unchanged. A failure mid-stream leaves the fragments
    /// already written in `sink`.
    pub fn execute(&mut self, context: ExecutionContext, sink: &mut dyn Write) -> Result<String> {
        let ExecutionContext {
            template,
            mut variables,
            options,
            backend,
            stream,
        } = context;

        self.resolve_missing(&template, &mut variables)?;
        check_variables(&template, &variables)?;

        let prompt = substitute(template.effective_content(), &variables);
        let messages = [Message::user(prompt)];

        tracing::debug!(
            "Executing template {} with {} backend (stream: {})",
            template.name,
            backend.name(),
            stream
        );

        let text = if stream {
            let mut buffer = String::new();
            for fragment in backend.stream_message(&messages, &options)? {
                let fragment = fragment?;
                sink.write_all(fragment.as_bytes())?;
                sink.flush()?;
                buffer.push_str(&fragment);
            }
            buffer
        } else {
            backend.generate_message(&messages, &options)?
        };

        Ok(process_output(&template, text))
    }

    fn resolve_missing(
        &mut self,
        template: &TemplateDefinition,
        variables: &mut VariableMap,
    ) -> Result<()> {
        for (name, spec) in &template.input_variables {
            if variables.contains_key(name) {
                continue;
            }
            let raw = self.resolver.resolve(name, spec)?;
            let value = cast_value(name, &raw, &spec.var_type)?;
            variables.insert(name.clone(), value);
        }
        Ok(())
    }
}

/// Every declared input must be present and of its declared type.
fn check_variables(template: &TemplateDefinition, variables: &VariableMap) -> Result<()> {
    for (name, spec) in &template.input_variables {
        let value = variables
            .get(name)
            .ok_or_else(|| PromptkitError::InputValidation {
                key: name.clone(),
                value: String::new(),
                message: "missing required variable".to_string(),
            })?;

        let declared = InputType::parse(&spec.var_type).ok_or_else(|| {
            PromptkitError::InputValidation {
                key: name.clone(),
                value: value.to_string(),
                message: format!("unknown declared type '{}'", spec.var_type),
            }
        })?;

        if !value.matches(declared) {
            return Err(PromptkitError::InputValidation {
                key: name.clone(),
                value: value.to_string(),
                message: format!("expected {}, got {}", declared.name(), value.type_name()),
            });
        }
    }
    Ok(())
}

/// Post-process generated text. Output variables are not extracted yet,
/// so the text is returned unchanged.
fn process_output(_template: &TemplateDefinition, text: String) -> String {
    text
}
