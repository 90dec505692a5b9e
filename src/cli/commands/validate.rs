//! Validate command implementation.

use std::path::{Path, PathBuf};

use crate::cli::args::ValidateArgs;
use crate::error::Result;
use crate::template::{validate, TemplateStore};
use crate::ui::{hints, UserInterface};

use super::dispatcher::{Command, CommandResult};
use super::require_template;

/// The validate command implementation.
pub struct ValidateCommand {
    template_dir: PathBuf,
    args: ValidateArgs,
}

impl ValidateCommand {
    pub fn new(template_dir: &Path, args: ValidateArgs) -> Self {
        Self {
            template_dir: template_dir.to_path_buf(),
            args,
        }
    }
}

impl Command for ValidateCommand {
    fn execute(&mut self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let mut store = TemplateStore::new(&self.template_dir);
        let template = require_template(&mut store, &self.args.name)?;

        match validate(&template) {
            Ok(()) => {
                ui.success(&format!("Template '{}' is valid", template.name));
                Ok(CommandResult::success())
            }
            Err(e) => {
                ui.error(&e.to_string());
                ui.show_hint(&hints::after_invalid(&self.args.name));
                Ok(CommandResult::failure(1))
            }
        }
    }
}
