//! Edit command implementation.
//!
//! `promptkit edit <name>` applies a partial update from flags. Fields
//! that are not given keep their stored values.

use std::path::{Path, PathBuf};

use crate::cli::args::EditArgs;
use crate::error::Result;
use crate::template::{validate, TemplatePatch, TemplateStore};
use crate::ui::{hints, UserInterface};

use super::dispatcher::{Command, CommandResult};

/// The edit command implementation.
pub struct EditCommand {
    template_dir: PathBuf,
    args: EditArgs,
}

impl EditCommand {
    pub fn new(template_dir: &Path, args: EditArgs) -> Self {
        Self {
            template_dir: template_dir.to_path_buf(),
            args,
        }
    }

    fn patch(&self) -> TemplatePatch {
        TemplatePatch {
            version: self.args.version.clone(),
            description: self.args.description.clone(),
            author: self.args.author.clone(),
            provider: self.args.provider.clone(),
            model: self.args.model.clone(),
            content: self.args.content.clone(),
            ..Default::default()
        }
    }
}

impl Command for EditCommand {
    fn execute(&mut self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let patch = self.patch();
        if patch.is_empty() {
            ui.warning("Nothing to change");
            ui.show_hint("Pass at least one of --description, --template-version, --author, --set-provider, --set-model, --content.");
            return Ok(CommandResult::failure(2));
        }

        let mut store = TemplateStore::new(&self.template_dir);
        let mut updated = store.update_template(&self.args.name, patch)?;
        ui.success(&format!("Updated template '{}'", updated.name));

        // The update is saved either way; report if it left the template invalid.
        let checked = store
            .resolve_content(&updated.content)
            .and_then(|resolved| {
                updated.resolved_content = Some(resolved);
                validate(&updated)
            });
        if let Err(e) = checked {
            ui.warning(&format!("Template is no longer valid: {}", e));
            ui.show_hint(&hints::after_invalid(&self.args.name));
        }

        Ok(CommandResult::success())
    }
}
