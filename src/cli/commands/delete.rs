//! Delete command implementation.

use std::path::{Path, PathBuf};

use crate::cli::args::DeleteArgs;
use crate::error::{PromptkitError, Result};
use crate::template::TemplateStore;
use crate::ui::{Prompt, UserInterface};

use super::dispatcher::{Command, CommandResult};

/// The delete command implementation.
pub struct DeleteCommand {
    template_dir: PathBuf,
    args: DeleteArgs,
}

impl DeleteCommand {
    pub fn new(template_dir: &Path, args: DeleteArgs) -> Self {
        Self {
            template_dir: template_dir.to_path_buf(),
            args,
        }
    }
}

impl Command for DeleteCommand {
    fn execute(&mut self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let store = TemplateStore::new(&self.template_dir);
        let name = &self.args.name;

        if !store.template_exists(name) {
            return Err(PromptkitError::UnknownTemplate { name: name.clone() });
        }

        if !self.args.yes {
            let prompt = Prompt::confirm("confirm_delete", format!("Delete template '{}'?", name))
                .with_default("false");
            let confirmed = ui.prompt(&prompt)?.as_bool().unwrap_or(false);
            if !confirmed {
                ui.message("Cancelled");
                return Ok(CommandResult::success());
            }
        }

        store.delete_template(name)?;
        ui.success(&format!("Deleted template '{}'", name));
        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands::test_support::{greeting, save};
    use crate::ui::MockUI;
    use tempfile::TempDir;

    fn args(name: &str, yes: bool) -> DeleteArgs {
        DeleteArgs {
            name: name.to_string(),
            yes,
        }
    }

    #[test]
    fn yes_skips_confirmation() {
        let temp = TempDir::new().unwrap();
        save(temp.path(), &greeting("greet"));

        let mut ui = MockUI::new();
        DeleteCommand::new(temp.path(), args("greet", true))
            .execute(&mut ui)
            .unwrap();

        assert!(ui.prompts_shown().is_empty());
        assert!(!TemplateStore::new(temp.path()).template_exists("greet"));
    }

    #[test]
    fn confirmed_prompt_deletes() {
        let temp = TempDir::new().unwrap();
        save(temp.path(), &greeting("greet"));

        let mut ui = MockUI::new();
        ui.set_prompt_response("confirm_delete", "yes");
        DeleteCommand::new(temp.path(), args("greet", false))
            .execute(&mut ui)
            .unwrap();

        assert!(ui.has_success("Deleted"));
        assert!(!TemplateStore::new(temp.path()).template_exists("greet"));
    }

    #[test]
    fn declined_prompt_keeps_template() {
        let temp = TempDir::new().unwrap();
        save(temp.path(), &greeting("greet"));

        let mut ui = MockUI::new();
        let result = DeleteCommand::new(temp.path(), args("greet", false))
            .execute(&mut ui)
            .unwrap();

        assert!(result.success);
        assert!(ui.has_message("Cancelled"));
        assert!(TemplateStore::new(temp.path()).template_exists("greet"));
    }

    #[test]
    fn missing_template_is_an_error() {
        let temp = TempDir::new().unwrap();
        let mut ui = MockUI::new();
        let result = DeleteCommand::new(temp.path(), args("nope", true)).execute(&mut ui);
        assert!(matches!(result, Err(PromptkitError::UnknownTemplate { .. })));
    }
}
