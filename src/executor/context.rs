//! Everything one template run needs.

use std::fmt;

use crate::backend::{GenerationBackend, GenerationOptions};
use crate::template::{TemplateDefinition, VariableMap};

/// State for a single execution, owned by that execution.
pub struct ExecutionContext {
    /// The template to run, with inclusions resolved.
    pub template: TemplateDefinition,
    /// Variable values supplied so far; missing inputs are resolved by the
    /// executor.
    pub variables: VariableMap,
    pub options: GenerationOptions,
    pub backend: Box<dyn GenerationBackend>,
    /// Write fragments to the sink as they arrive.
    pub stream: bool,
}

impl ExecutionContext {
    pub fn new(
        template: TemplateDefinition,
        backend: Box<dyn GenerationBackend>,
        options: GenerationOptions,
    ) -> Self {
        Self {
            template,
            variables: VariableMap::new(),
            options,
            backend,
            stream: false,
        }
    }

    pub fn with_variables(mut self, variables: VariableMap) -> Self {
        self.variables = variables;
        self
    }

    pub fn with_stream(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }
}

impl fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("template", &self.template.name)
            .field("variables", &self.variables)
            .field("options", &self.options)
            .field("backend", &self.backend.name())
            .field("stream", &self.stream)
            .finish()
    }
}
