//! Show command implementation.
//!
//! `promptkit show <name>` prints the stored definition as YAML (or JSON).
//! With `--resolved`, the content has its file inclusions expanded.

use std::path::{Path, PathBuf};

use crate::cli::args::ShowArgs;
use crate::error::Result;
use crate::template::TemplateStore;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};
use super::require_template;

/// The show command implementation.
pub struct ShowCommand {
    template_dir: PathBuf,
    args: ShowArgs,
}

impl ShowCommand {
    pub fn new(template_dir: &Path, args: ShowArgs) -> Self {
        Self {
            template_dir: template_dir.to_path_buf(),
            args,
        }
    }
}

impl Command for ShowCommand {
    fn execute(&mut self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let mut store = TemplateStore::new(&self.template_dir);
        let mut template = require_template(&mut store, &self.args.name)?;

        if self.args.resolved {
            template.content = template.effective_content().to_string();
        }

        let text = if self.args.json {
            serde_json::to_string_pretty(&template).map_err(anyhow::Error::from)?
        } else {
            serde_yaml::to_string(&template).map_err(anyhow::Error::from)?
        };
        ui.output(&text);

        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands::test_support::{greeting, save};
    use crate::error::PromptkitError;
    use crate::template::TemplateDefinition;
    use crate::ui::MockUI;
    use std::fs;
    use tempfile::TempDir;

    fn args(name: &str, resolved: bool, json: bool) -> ShowArgs {
        ShowArgs {
            name: name.to_string(),
            resolved,
            json,
        }
    }

    #[test]
    fn shows_yaml_definition() {
        let temp = TempDir::new().unwrap();
        save(temp.path(), &greeting("greet"));

        let mut ui = MockUI::new();
        ShowCommand::new(temp.path(), args("greet", false, false))
            .execute(&mut ui)
            .unwrap();

        let shown: TemplateDefinition = serde_yaml::from_str(&ui.output_text()).unwrap();
        assert_eq!(shown, greeting("greet"));
    }

    #[test]
    fn resolved_expands_inclusions() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("part.md"), "included text").unwrap();
        let mut template = greeting("greet");
        template.content = "{{name}}: {{file: part.md}}".to_string();
        save(temp.path(), &template);

        let mut ui = MockUI::new();
        ShowCommand::new(temp.path(), args("greet", true, true))
            .execute(&mut ui)
            .unwrap();

        let json: serde_json::Value = serde_json::from_str(&ui.output_text()).unwrap();
        assert_eq!(json["content"], "{{name}}: included text");
        assert!(json.get("resolved_content").is_none());
    }

    #[test]
    fn missing_template_is_an_error() {
        let temp = TempDir::new().unwrap();
        let mut ui = MockUI::new();
        let result = ShowCommand::new(temp.path(), args("nope", false, false)).execute(&mut ui);
        assert!(matches!(result, Err(PromptkitError::UnknownTemplate { .. })));
    }
}
