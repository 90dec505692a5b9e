//! Run command implementation.
//!
//! The `promptkit run` command loads a template, fills in its variables,
//! and sends it to a backend.
//!
//! Provider and model are picked in this order: the `--provider`/`--model`
//! flags, then the template's own fields, then configuration. A template
//! naming a provider that is not built in falls back to configuration.

use std::io::Write;

use crate::backend::{create_backend, GenerationOptions, Provider};
use crate::cli::args::RunArgs;
use crate::config::EffectiveConfig;
use crate::error::Result;
use crate::executor::{ExecutionContext, PromptingResolver, TemplateExecutor};
use crate::template::{validate, TemplateDefinition, TemplateStore};
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};
use super::require_template;

/// The run command implementation.
pub struct RunCommand {
    config: EffectiveConfig,
    args: RunArgs,
    provider: Option<String>,
    model: Option<String>,
}

impl RunCommand {
    pub fn new(config: EffectiveConfig, args: RunArgs) -> Self {
        Self {
            config,
            args,
            provider: None,
            model: None,
        }
    }

    /// Provider named on the command line.
    pub fn with_provider(mut self, provider: Option<String>) -> Self {
        self.provider = provider;
        self
    }

    /// Model named on the command line.
    pub fn with_model(mut self, model: Option<String>) -> Self {
        self.model = model;
        self
    }

    fn select_provider(&self, template: &TemplateDefinition) -> Result<Provider> {
        if let Some(name) = &self.provider {
            return Ok(name.parse()?);
        }
        match template.provider.parse() {
            Ok(provider) => Ok(provider),
            Err(_) => {
                tracing::debug!(
                    "Template provider '{}' is not built in, using '{}'",
                    template.provider,
                    self.config.provider
                );
                Ok(self.config.provider.parse()?)
            }
        }
    }
}

impl Command for RunCommand {
    fn execute(&mut self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let mut store = TemplateStore::new(&self.config.template_dir);
        let template = require_template(&mut store, &self.args.name)?;
        validate(&template)?;

        let variables = store.parse_variables(&self.args.vars, &template)?;

        let provider = self.select_provider(&template)?;
        let options = GenerationOptions::from_config(&self.config)
            .with_parameters(template.parameters.as_ref())
            .with_model(Some(&template.model))
            .with_model(self.model.as_deref());
        let backend = create_backend(provider, &self.config)?;

        // Prompts and a spinner would fight over the terminal.
        let needs_prompt = template
            .input_variables
            .keys()
            .any(|name| !variables.contains_key(name));
        let mut spinner = if self.args.stream || needs_prompt {
            None
        } else {
            Some(ui.start_spinner(&format!("Running {}", template.name)))
        };

        let context = ExecutionContext::new(template, backend, options)
            .with_variables(variables)
            .with_stream(self.args.stream);

        let mut stdout = std::io::stdout();
        let mut resolver = PromptingResolver::new(ui);
        let result = TemplateExecutor::new(&mut resolver).execute(context, &mut stdout);

        let text = match result {
            Ok(text) => text,
            Err(e) => {
                if let Some(spinner) = spinner.as_mut() {
                    spinner.finish_error("Generation failed");
                }
                return Err(e);
            }
        };

        if let Some(spinner) = spinner.as_mut() {
            spinner.finish_clear();
        }

        if self.args.stream {
            if !text.ends_with('\n') {
                writeln!(stdout)?;
            }
        } else {
            ui.output(&text);
        }

        Ok(CommandResult::success())
    }
}
