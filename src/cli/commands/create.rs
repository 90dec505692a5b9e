//! Create command implementation.
//!
//! The `promptkit create <name>` command builds a new template
//! interactively. Variables are detected from the content (after
//! inclusion), and a type and description are asked for each one.

use indexmap::IndexMap;
use std::fs;

use crate::cli::args::CreateArgs;
use crate::config::EffectiveConfig;
use crate::error::{PromptkitError, Result};
use crate::template::{
    validate, variable_names, InputType, TemplateDefinition, TemplateStore, VariableSpec,
};
use crate::ui::{hints, Prompt, UserInterface};

use super::dispatcher::{Command, CommandResult};

/// The create command implementation.
pub struct CreateCommand {
    config: EffectiveConfig,
    args: CreateArgs,
}

impl CreateCommand {
    pub fn new(config: EffectiveConfig, args: CreateArgs) -> Self {
        Self { config, args }
    }

    fn ask(ui: &mut dyn UserInterface, prompt: Prompt) -> Result<String> {
        Ok(ui.prompt(&prompt)?.as_string())
    }

    fn content(&self, ui: &mut dyn UserInterface) -> Result<String> {
        if let Some(content) = &self.args.content {
            return Ok(content.clone());
        }
        if let Some(path) = &self.args.file {
            return fs::read_to_string(path).map_err(|e| PromptkitError::FileInclusion {
                path: path.clone(),
                message: e.to_string(),
            });
        }

        // Single-line input; a literal \n stands for a line break.
        let raw = Self::ask(
            ui,
            Prompt::input("content", "Template content (use \\n for new lines)"),
        )?;
        Ok(raw.replace("\\n", "\n"))
    }

    fn declare_variables(
        ui: &mut dyn UserInterface,
        names: Vec<String>,
    ) -> Result<IndexMap<String, VariableSpec>> {
        let mut declared = IndexMap::new();
        for name in names {
            let var_type = Self::ask(
                ui,
                Prompt::select(
                    format!("type_{}", name),
                    format!("Type of '{}'", name),
                    &InputType::NAMES,
                )
                .with_default("string"),
            )?;
            let description = Self::ask(
                ui,
                Prompt::input(
                    format!("description_{}", name),
                    format!("Description of '{}'", name),
                )
                .with_default(name.clone()),
            )?;
            declared.insert(name, VariableSpec::new(var_type, description));
        }
        Ok(declared)
    }
}

fn default_author() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string())
}

impl Command for CreateCommand {
    fn execute(&mut self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let mut store = TemplateStore::new(&self.config.template_dir);
        let name = self.args.name.clone();

        if store.template_exists(&name) {
            ui.error(&format!("Template '{}' already exists", name));
            ui.show_hint(&format!("Use `promptkit edit {}` to change it.", name));
            return Ok(CommandResult::failure(1));
        }

        ui.show_header(&format!("New template: {}", name));

        let description = Self::ask(ui, Prompt::input("description", "Description"))?;
        let version = Self::ask(ui, Prompt::input("version", "Version").with_default("1.0.0"))?;
        let author = Self::ask(ui, Prompt::input("author", "Author").with_default(default_author()))?;
        let provider = Self::ask(
            ui,
            Prompt::input("provider", "Provider").with_default(self.config.provider.clone()),
        )?;
        let model = Self::ask(
            ui,
            Prompt::input("model", "Model")
                .with_default(self.config.model.clone().unwrap_or_else(|| "default".to_string())),
        )?;
        let content = self.content(ui)?;

        let resolved = store.resolve_content(&content)?;
        let input_variables = Self::declare_variables(ui, variable_names(&resolved))?;

        let template = TemplateDefinition {
            name: name.clone(),
            version,
            description,
            author,
            provider,
            model,
            content,
            resolved_content: Some(resolved),
            input_variables,
            ..Default::default()
        };

        if let Err(e) = validate(&template) {
            ui.error(&e.to_string());
            return Ok(CommandResult::failure(1));
        }

        store.save_template(&template)?;
        ui.success(&format!(
            "Created template '{}' in {}",
            name,
            store.dir().display()
        ));
        ui.show_hint(&hints::after_save(&name));

        Ok(CommandResult::success())
    }
}
